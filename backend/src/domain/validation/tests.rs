//! Tests for reason filtering.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn ignored() -> IgnoredReasons {
    IgnoredReasons::default()
        .ignore(Action::Create, "id", [ReasonKind::Blank])
        .ignore(
            Action::UpdateAllowedFields,
            "loggedIn",
            [ReasonKind::MustNotBeSet, ReasonKind::Invalid],
        )
}

#[rstest]
fn blank_id_is_tolerated_only_on_create(ignored: IgnoredReasons) {
    let reason = ReasonInvalid::blank("id", "");

    assert!(ignored.can_ignore(Action::Create, &reason));
    assert!(!ignored.can_ignore(Action::Update, &reason));
    assert!(!ignored.can_ignore(Action::UpdateAllowedFields, &reason));
}

#[rstest]
fn other_kinds_on_listed_field_survive(ignored: IgnoredReasons) {
    let reason = ReasonInvalid::new("id", ReasonKind::Invalid, "not a uuid", "x");
    assert!(!ignored.can_ignore(Action::Create, &reason));
}

#[rstest]
fn filter_is_a_set_difference_preserving_order(ignored: IgnoredReasons) {
    let reasons = vec![
        ReasonInvalid::blank("id", ""),
        ReasonInvalid::blank("name", ""),
        ReasonInvalid::new("loggedIn", ReasonKind::MustNotBeSet, "must be false", true),
        ReasonInvalid::blank("imei", ""),
    ];

    let kept = ignored.filter(Action::Create, reasons.clone());
    assert_eq!(kept, reasons[1..].to_vec());

    let kept = ignored.filter(Action::UpdateAllowedFields, reasons.clone());
    let fields: Vec<_> = kept.iter().map(|reason| reason.field.as_str()).collect();
    assert_eq!(fields, ["id", "name", "imei"]);
}

#[rstest]
fn empty_table_is_strict() {
    let reasons = vec![ReasonInvalid::blank("id", "")];
    assert_eq!(
        IgnoredReasons::default().filter(Action::Create, reasons.clone()),
        reasons
    );
}

#[rstest]
fn reason_serialises_with_wire_names() {
    let reason = ReasonInvalid::new("ownerId", ReasonKind::MustExist, "owner party must exist", "c-9");

    assert_eq!(
        serde_json::to_value(&reason).expect("reason serialises"),
        json!({
            "field": "ownerId",
            "type": "MustExist",
            "help": "owner party must exist",
            "data": "c-9",
        })
    );
    assert_eq!(reason.to_string(), "ownerId is must exist: owner party must exist");
}

#[rstest]
#[case::missing(Err("missing"), None)]
#[case::same_record(Ok("c-1"), None)]
#[case::other_record(Ok("c-2"), Some(ReasonKind::Duplicate))]
#[case::lookup_failure(Err("socket closed"), Some(ReasonKind::Unknown))]
fn duplicate_reason_classifies_lookups(
    #[case] lookup: Result<&str, &str>,
    #[case] expected: Option<ReasonKind>,
) {
    let reason = duplicate_reason(
        "name",
        "Acme",
        lookup,
        |err| *err == "missing",
        |id| *id == "c-1",
    );

    assert_eq!(reason.as_ref().map(|reason| reason.kind), expected);
    if let Some(reason) = reason {
        assert_eq!(reason.field, "name");
        assert_eq!(reason.data, json!("Acme"));
    }
}

#[rstest]
fn existence_reason_reports_missing_parties() {
    let missing = Err(PartyAdministratorError::not_found(
        crate::domain::PartyType::Company,
        "c-9",
    ));

    let reason = existence_reason("ownerId", "owner", "c-9", missing).expect("reason");

    assert_eq!(reason.kind, ReasonKind::MustExist);
    assert_eq!(reason.help, "owner party must exist");
}

#[rstest]
fn existence_reason_reports_failed_lookups_as_unknown() {
    let failed = Err(PartyAdministratorError::lookup("pool exhausted"));

    let reason = existence_reason("assignedId", "assigned", "c-9", failed).expect("reason");

    assert_eq!(reason.kind, ReasonKind::Unknown);
    assert_eq!(
        reason.help,
        "error retrieving assigned party: party lookup failed: pool exhausted"
    );
}

#[rstest]
fn existence_reason_accepts_found_parties() {
    let found = Ok(crate::domain::Party::System(crate::domain::System::default()));
    assert!(existence_reason("parentId", "parent", "root", found).is_none());
}
