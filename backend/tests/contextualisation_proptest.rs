//! Property tests for tenancy narrowing and collection paging.

use std::sync::Arc;

use brain::domain::ports::DocumentStore;
use brain::domain::{
    Claims, CollectRequest, ContextualiseFilter, Filter, PartyType, Reading, RecordHandler,
    contextualise_owned_or_assigned, contextualise_party_children, contextualise_party_members,
    contextualise_party_self,
};
use brain::outbound::persistence::InMemoryDocumentStore;
use pagination::{Query, SortOrder};
use proptest::prelude::*;
use serde_json::{Map, Value};
use tokio::runtime::Runtime;

const CONTEXTUALISERS: [ContextualiseFilter; 4] = [
    contextualise_party_self,
    contextualise_party_children,
    contextualise_party_members,
    contextualise_owned_or_assigned,
];

const TENANCY_FIELDS: [&str; 6] = ["id", "name", "parentId", "partyId", "ownerId", "assignedId"];

fn party_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(str::to_owned)
}

fn document() -> impl Strategy<Value = Value> {
    prop::collection::vec(prop::option::of(party_id()), TENANCY_FIELDS.len()).prop_map(|values| {
        let mut object = Map::new();
        for (field, value) in TENANCY_FIELDS.iter().zip(values) {
            if let Some(value) = value {
                object.insert((*field).to_owned(), Value::String(value));
            }
        }
        Value::Object(object)
    })
}

fn base_filter() -> impl Strategy<Value = Filter> {
    let leaf = prop_oneof![
        Just(Filter::All),
        (prop::sample::select(TENANCY_FIELDS.to_vec()), party_id())
            .prop_map(|(field, value)| Filter::eq(field, value)),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(|parts| Filter::and(parts)),
            prop::collection::vec(inner, 1..3).prop_map(|parts| Filter::or(parts)),
        ]
    })
}

fn claims() -> impl Strategy<Value = Claims> {
    let party_type = prop_oneof![
        Just(PartyType::System),
        Just(PartyType::Company),
        Just(PartyType::Client),
    ];
    (party_type, party_id()).prop_map(|(party_type, party_id)| Claims::new(party_type, party_id))
}

proptest! {
    #[test]
    fn narrowing_never_widens_access(
        base in base_filter(),
        claims in claims(),
        documents in prop::collection::vec(document(), 1..8),
    ) {
        for contextualise in CONTEXTUALISERS {
            let narrowed = contextualise(base.clone(), &claims);
            for document in &documents {
                if narrowed.matches(document) {
                    prop_assert!(base.matches(document));
                }
            }
        }
    }

    #[test]
    fn root_claims_leave_filters_unchanged(base in base_filter(), party_id in party_id()) {
        let claims = Claims::system(party_id);
        for contextualise in CONTEXTUALISERS {
            prop_assert_eq!(contextualise(base.clone(), &claims), base.clone());
        }
    }
}

fn collect_readings(count: usize, query: Query) -> (usize, u64) {
    let runtime = Runtime::new().expect("tokio runtime should initialise");
    runtime.block_on(async {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let handler =
            RecordHandler::<Reading>::initialise(store, contextualise_owned_or_assigned, &[])
                .await
                .expect("handler should initialise");
        for timestamp in 0..count {
            let reading = Reading {
                timestamp: i64::try_from(timestamp).expect("small timestamp"),
                ..Reading::default()
            };
            handler.create(reading).await.expect("reading should be stored");
        }
        let page = handler
            .collect(CollectRequest::new(Claims::system("root"), Vec::new(), query))
            .await
            .expect("collect should succeed");
        (page.records.len(), page.total)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn pages_hold_the_expected_number_of_records(
        count in 0usize..12,
        limit in 0u64..5,
        offset in 0u64..15,
    ) {
        let query = Query::default()
            .with_limit(limit)
            .with_offset(offset)
            .with_sort("timestamp", SortOrder::Asc);

        let (len, total) = collect_readings(count, query.clone());

        prop_assert_eq!(total, u64::try_from(count).expect("small count"));
        prop_assert_eq!(u64::try_from(len).expect("small page"), query.expected_len(total));
    }
}
