//! Tests for identifier validation, filters and the wire envelope.

use rstest::rstest;
use serde_json::json;

use super::*;

#[rstest]
#[case(Identifier::id("abc"))]
#[case(Identifier::name("Acme"))]
#[case(Identifier::username("sam"))]
#[case(Identifier::email_address("sam@example.com"))]
#[case(Identifier::admin_email_address("admin@example.com"))]
#[case(Identifier::device_imei("356173065678901"))]
#[case(Identifier::party(PartyType::Client, "client-1"))]
fn unwrap_restores_wrapped_identifier(#[case] identifier: Identifier) {
    let wrapped = WrappedIdentifier::wrap(&identifier);
    assert_eq!(wrapped.identifier_type, identifier.identifier_type().as_str());
    assert_eq!(wrapped.unwrap().expect("unwrap succeeds"), identifier);
}

#[rstest]
fn wrap_uses_camel_case_payloads() {
    let wrapped = WrappedIdentifier::wrap(&Identifier::admin_email_address("a@b.c"));
    assert_eq!(
        serde_json::to_value(&wrapped).expect("wrapped serialises"),
        json!({ "type": "AdminEmailAddress", "value": { "adminEmailAddress": "a@b.c" } })
    );
}

#[rstest]
#[case("id")]
#[case("DeviceImei")]
#[case("Sku")]
#[case("")]
fn unwrap_rejects_unknown_tags(#[case] tag: &str) {
    let wrapped = WrappedIdentifier {
        identifier_type: tag.to_owned(),
        value: json!({ "id": "abc" }),
    };

    assert_eq!(
        wrapped.unwrap(),
        Err(IdentifierError::InvalidType {
            tag: tag.to_owned()
        })
    );
}

#[rstest]
#[case(json!({ "name": "Acme" }))]
#[case(json!({ "id": 42 }))]
#[case(json!({ "id": "abc", "extra": true }))]
#[case(json!("abc"))]
fn unwrap_reports_unmarshalling_failures(#[case] value: serde_json::Value) {
    let wrapped = WrappedIdentifier {
        identifier_type: "Id".to_owned(),
        value,
    };

    assert!(matches!(
        wrapped.unwrap(),
        Err(IdentifierError::Unmarshalling {
            identifier_type: IdentifierType::Id,
            ..
        })
    ));
}

#[rstest]
fn unwrap_revalidates_decoded_identifier() {
    let wrapped = WrappedIdentifier {
        identifier_type: "Username".to_owned(),
        value: json!({ "username": "  " }),
    };

    assert_eq!(
        wrapped.unwrap(),
        Err(IdentifierError::Blank {
            identifier_type: IdentifierType::Username,
            field: "username",
        })
    );
}

#[rstest]
fn identifier_deserialises_from_envelope() {
    let identifier: Identifier = serde_json::from_value(json!({
        "type": "DeviceIMEI",
        "value": { "imei": "356173065678901" },
    }))
    .expect("identifier decodes");

    assert_eq!(identifier, Identifier::device_imei("356173065678901"));
}

#[rstest]
fn identifier_rejects_bad_envelope_during_deserialisation() {
    let result = serde_json::from_value::<Identifier>(json!({
        "type": "Nickname",
        "value": { "nickname": "sam" },
    }));

    let err = result.expect_err("unknown tag fails");
    assert!(err.to_string().contains("invalid type: Nickname"));
}

#[rstest]
#[case(Identifier::id("abc"), Filter::eq("id", "abc"))]
#[case(Identifier::email_address("a@b.c"), Filter::eq("emailAddress", "a@b.c"))]
#[case(Identifier::device_imei("123"), Filter::eq("imei", "123"))]
#[case(
    Identifier::party(PartyType::Company, "company-1"),
    Filter::And(vec![
        Filter::eq("partyType", "Company"),
        Filter::eq("partyId", "company-1"),
    ])
)]
fn to_filter_targets_the_matching_field(#[case] identifier: Identifier, #[case] expected: Filter) {
    assert_eq!(identifier.to_filter(), expected);
}

#[rstest]
fn tags_parse_back_to_their_type() {
    for identifier_type in IdentifierType::ALL {
        assert_eq!(
            IdentifierType::parse(identifier_type.as_str()),
            Some(identifier_type)
        );
    }
}
