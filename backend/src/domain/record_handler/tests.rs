//! Tests for the generic record handler.

use std::sync::Mutex;

use async_trait::async_trait;
use pagination::{SortField, SortOrder};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::*;
use crate::domain::claims::{PartyType, contextualise_owned_or_assigned};
use crate::domain::ports::{IdGenerationError, MockDocumentSession, MockIdGenerator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    id: String,
    name: String,
    owner_id: String,
}

impl Entity for Widget {
    const COLLECTION: &'static str = "widget";
    const NAME: &'static str = "widget";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_valid_identifier(identifier: &Identifier) -> bool {
        matches!(identifier, Identifier::Id { .. } | Identifier::Name { .. })
    }
}

fn widget(id: &str) -> Widget {
    Widget {
        id: id.to_owned(),
        name: "Acme".to_owned(),
        owner_id: "company-1".to_owned(),
    }
}

/// Hands out scripted sessions in order and fails once they run out.
struct StubStore {
    sessions: Mutex<Vec<MockDocumentSession>>,
}

impl StubStore {
    fn new(sessions: Vec<MockDocumentSession>) -> Arc<Self> {
        let mut sessions = sessions;
        sessions.reverse();
        Arc::new(Self {
            sessions: Mutex::new(sessions),
        })
    }
}

#[async_trait]
impl DocumentStore for StubStore {
    async fn session<'a>(&'a self) -> Result<Box<dyn DocumentSession + 'a>, CollectionError> {
        let mut sessions = self.sessions.lock().expect("sessions lock");
        match sessions.pop() {
            Some(session) => Ok(Box::new(session)),
            None => Err(CollectionError::connection("no session scripted")),
        }
    }
}

fn fixed_id(id: &'static str) -> Arc<dyn IdGenerator> {
    let mut generator = MockIdGenerator::new();
    generator
        .expect_generate()
        .returning(move || Ok(id.to_owned()));
    Arc::new(generator)
}

async fn handler(sessions: Vec<MockDocumentSession>) -> RecordHandler<Widget> {
    let mut init = MockDocumentSession::new();
    init.expect_ensure_index().returning(|_, _| Ok(()));
    let mut all = vec![init];
    all.extend(sessions);
    RecordHandler::initialise(
        StubStore::new(all),
        contextualise_owned_or_assigned,
        &[IndexSpec::unique(["name"])],
    )
    .await
    .expect("handler initialises")
    .with_id_generator(fixed_id("generated-id"))
}

fn company_claims() -> Claims {
    Claims::new(PartyType::Company, "company-1")
}

fn scoped_id_filter(id: &str) -> Filter {
    Filter::And(vec![
        Filter::eq("id", id),
        Filter::or([
            Filter::eq("ownerId", "company-1"),
            Filter::eq("assignedId", "company-1"),
        ]),
    ])
}

#[tokio::test]
async fn initialise_ensures_every_index() {
    let mut session = MockDocumentSession::new();
    session
        .expect_ensure_index()
        .withf(|collection, index| collection == "widget" && index.fields == ["name"])
        .times(1)
        .return_once(|_, _| Ok(()));
    session
        .expect_ensure_index()
        .withf(|_, index| index.fields == ["ownerId"])
        .times(1)
        .return_once(|_, _| Ok(()));

    let result = RecordHandler::<Widget>::initialise(
        StubStore::new(vec![session]),
        contextualise_owned_or_assigned,
        &[IndexSpec::unique(["name"]), IndexSpec::unique(["ownerId"])],
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn initialise_propagates_index_failures() {
    let mut session = MockDocumentSession::new();
    session
        .expect_ensure_index()
        .return_once(|_, _| Err(CollectionError::index("duplicate keys exist")));

    let result = RecordHandler::<Widget>::initialise(
        StubStore::new(vec![session]),
        contextualise_owned_or_assigned,
        &[IndexSpec::unique(["name"])],
    )
    .await;

    assert_eq!(
        result.err(),
        Some(CollectionError::index("duplicate keys exist"))
    );
}

#[tokio::test]
async fn create_replaces_client_supplied_identity() {
    let mut session = MockDocumentSession::new();
    session
        .expect_insert()
        .withf(|collection, id, document| {
            collection == "widget" && id == "generated-id" && document["id"] == "generated-id"
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let handler = handler(vec![session]).await;

    let created = handler
        .create(widget("client-chosen"))
        .await
        .expect("create succeeds");

    assert_eq!(created.id, "generated-id");
}

#[tokio::test]
async fn create_wraps_insert_failures() {
    let mut session = MockDocumentSession::new();
    session
        .expect_insert()
        .return_once(|_, _, _| Err(CollectionError::duplicate("widget_name_uniq")));
    let handler = handler(vec![session]).await;

    let err = handler
        .create(widget(""))
        .await
        .expect_err("insert fails");

    let RecordHandlerError::Create { reasons } = err else {
        panic!("expected create error, got {err:?}");
    };
    assert_eq!(reasons.as_slice().first().map(String::as_str), Some("inserting record"));
    assert!(reasons.mentions("widget_name_uniq"));
}

#[tokio::test]
async fn create_reports_identity_failure_before_touching_store() {
    let mut generator = MockIdGenerator::new();
    generator
        .expect_generate()
        .return_once(|| Err(IdGenerationError::entropy("no entropy")));
    let handler = handler(vec![])
        .await
        .with_id_generator(Arc::new(generator));

    let err = handler.create(widget("")).await.expect_err("generation fails");

    assert!(matches!(err, RecordHandlerError::UuidGeneration { .. }));
}

#[rstest]
#[case(Claims::new(PartyType::Company, " "), Identifier::id("w-1"), "claims party id is blank")]
#[case(company_claims(), Identifier::id(""), "Id identifier has blank id")]
#[case(
    company_claims(),
    Identifier::username("sam"),
    "identifier of type Username not supported for widget entity"
)]
#[tokio::test]
async fn retrieve_rejects_invalid_requests_without_store_access(
    #[case] claims: Claims,
    #[case] identifier: Identifier,
    #[case] reason: &str,
) {
    let handler = handler(vec![]).await;

    let err = handler
        .retrieve(RetrieveRequest::new(claims, identifier))
        .await
        .expect_err("request is invalid");

    let RecordHandlerError::RequestInvalid { reasons } = err else {
        panic!("expected request invalid, got {err:?}");
    };
    assert!(reasons.mentions(reason), "reasons were {reasons}");
}

#[tokio::test]
async fn retrieve_scopes_filter_to_claims() {
    let expected = scoped_id_filter("w-1");
    let mut session = MockDocumentSession::new();
    session
        .expect_find_one()
        .withf(move |collection, filter| collection == "widget" && filter == &expected)
        .times(1)
        .return_once(|_, _| {
            Ok(json!({ "id": "w-1", "name": "Acme", "ownerId": "company-1" }))
        });
    let handler = handler(vec![session]).await;

    let found = handler
        .retrieve(RetrieveRequest::new(company_claims(), Identifier::id("w-1")))
        .await
        .expect("retrieve succeeds");

    assert_eq!(found, widget("w-1"));
}

#[tokio::test]
async fn retrieve_translates_store_not_found() {
    let mut session = MockDocumentSession::new();
    session
        .expect_find_one()
        .return_once(|_, _| Err(CollectionError::not_found()));
    let handler = handler(vec![session]).await;

    let err = handler
        .retrieve(RetrieveRequest::new(company_claims(), Identifier::id("w-1")))
        .await
        .expect_err("nothing matches");

    assert_eq!(err, RecordHandlerError::NotFound);
}

#[rstest]
#[case(Err(CollectionError::query("connection reset")), "retrieving record")]
#[case(Ok(json!({ "id": 7 })), "decoding record")]
#[tokio::test]
async fn retrieve_reports_other_failures_as_unexpected(
    #[case] outcome: Result<Value, CollectionError>,
    #[case] step: &str,
) {
    let mut session = MockDocumentSession::new();
    session.expect_find_one().return_once(move |_, _| outcome);
    let handler = handler(vec![session]).await;

    let err = handler
        .retrieve(RetrieveRequest::new(company_claims(), Identifier::id("w-1")))
        .await
        .expect_err("store fails");

    let RecordHandlerError::Unexpected { reasons } = err else {
        panic!("expected unexpected error, got {err:?}");
    };
    assert!(reasons.mentions(step));
}

#[tokio::test]
async fn update_replaces_scoped_document() {
    let expected = scoped_id_filter("w-1");
    let mut session = MockDocumentSession::new();
    session
        .expect_replace_one()
        .withf(move |_, filter, document| filter == &expected && document["name"] == "Renamed")
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let handler = handler(vec![session]).await;
    let mut renamed = widget("w-1");
    renamed.name = "Renamed".to_owned();

    let result = handler
        .update(UpdateRequest::new(
            company_claims(),
            Identifier::id("w-1"),
            renamed,
        ))
        .await;

    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn update_without_match_is_an_update_error() {
    let mut session = MockDocumentSession::new();
    session
        .expect_replace_one()
        .return_once(|_, _, _| Err(CollectionError::not_found()));
    let handler = handler(vec![session]).await;

    let err = handler
        .update(UpdateRequest::new(
            company_claims(),
            Identifier::id("w-1"),
            widget("w-1"),
        ))
        .await
        .expect_err("nothing matches");

    assert!(matches!(err, RecordHandlerError::Update { reasons } if reasons.mentions("updating record")));
}

#[tokio::test]
async fn delete_removes_scoped_documents() {
    let expected = scoped_id_filter("w-1");
    let mut session = MockDocumentSession::new();
    session
        .expect_remove()
        .withf(move |_, filter| filter == &expected)
        .times(1)
        .return_once(|_, _| Ok(1));
    let handler = handler(vec![session]).await;

    let result = handler
        .delete(DeleteRequest::new(company_claims(), Identifier::id("w-1")))
        .await;

    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn delete_without_match_is_a_delete_error() {
    let mut session = MockDocumentSession::new();
    session
        .expect_remove()
        .return_once(|_, _| Err(CollectionError::not_found()));
    let handler = handler(vec![session]).await;

    let err = handler
        .delete(DeleteRequest::new(company_claims(), Identifier::id("w-1")))
        .await
        .expect_err("nothing matches");

    assert!(matches!(err, RecordHandlerError::Delete { .. }));
}

#[tokio::test]
async fn collect_counts_before_reading_the_page() {
    let expected_filter = Filter::And(vec![
        Filter::eq("name", "Acme"),
        Filter::or([
            Filter::eq("ownerId", "company-1"),
            Filter::eq("assignedId", "company-1"),
        ]),
    ]);
    let count_filter = expected_filter.clone();
    let mut session = MockDocumentSession::new();
    let mut sequence = mockall::Sequence::new();
    session
        .expect_count()
        .withf(move |_, filter| filter == &count_filter)
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(3));
    session
        .expect_find_many()
        .withf(move |_, filter, options| {
            filter == &expected_filter
                && options.offset == 1
                && options.limit == Some(1)
                && options.sort
                    == [SortField {
                        field: "name".to_owned(),
                        order: SortOrder::Desc,
                    }]
        })
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _, _| {
            Ok(vec![json!({ "id": "w-2", "name": "Acme", "ownerId": "company-1" })])
        });
    let handler = handler(vec![session]).await;

    let page = handler
        .collect(CollectRequest::new(
            company_claims(),
            vec![Criterion::exact_text("name", "Acme")],
            Query::default()
                .with_limit(1)
                .with_offset(1)
                .with_sort("name", SortOrder::Desc),
        ))
        .await
        .expect("collect succeeds");

    assert_eq!(page.total, 3);
    assert_eq!(page.records, vec![widget("w-2")]);
}

#[tokio::test]
async fn collect_ignores_mismatched_sort() {
    let mut session = MockDocumentSession::new();
    session.expect_count().return_once(|_, _| Ok(0));
    session
        .expect_find_many()
        .withf(|_, _, options| options.sort.is_empty() && options.limit.is_none())
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));
    let handler = handler(vec![session]).await;
    let query = Query {
        sort_by: vec!["name".to_owned()],
        ..Query::default()
    };

    let page = handler
        .collect(CollectRequest::new(company_claims(), Vec::new(), query))
        .await
        .expect("collect succeeds");

    assert_eq!(page, Page::new(Vec::new(), 0));
}

#[tokio::test]
async fn collect_rejects_invalid_criteria() {
    let handler = handler(vec![]).await;

    let err = handler
        .collect(CollectRequest::new(
            company_claims(),
            vec![Criterion::exact_text("name", "Acme"), Criterion::or([])],
            Query::default(),
        ))
        .await
        .expect_err("empty or is invalid");

    let RecordHandlerError::RequestInvalid { reasons } = err else {
        panic!("expected request invalid, got {err:?}");
    };
    assert!(reasons.mentions("no criteria given"));
}

#[tokio::test]
async fn collect_wraps_count_failures() {
    let mut session = MockDocumentSession::new();
    session
        .expect_count()
        .return_once(|_, _| Err(CollectionError::query("timeout")));
    let handler = handler(vec![session]).await;

    let err = handler
        .collect(CollectRequest::new(company_claims(), Vec::new(), Query::default()))
        .await
        .expect_err("count fails");

    assert!(matches!(err, RecordHandlerError::Collect { reasons } if reasons.mentions("counting records")));
}
