//! Tests for filter construction and evaluation.

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;

#[fixture]
fn reading() -> Value {
    json!({
        "id": "r-1",
        "type": "ZX303",
        "timestamp": 20,
        "owner": { "id": "company-1" },
        "roles": ["admin", "viewer"],
        "name": "Acme Tracker",
        "assignedId": null,
    })
}

#[rstest]
fn and_flattens_and_drops_all() {
    let filter = Filter::and([
        Filter::All,
        Filter::and([Filter::eq("a", 1), Filter::eq("b", 2)]),
        Filter::eq("c", 3),
    ]);

    assert_eq!(
        filter,
        Filter::And(vec![
            Filter::eq("a", 1),
            Filter::eq("b", 2),
            Filter::eq("c", 3),
        ])
    );
}

#[rstest]
fn and_of_nothing_is_all_and_single_child_is_unwrapped() {
    assert_eq!(Filter::and([]), Filter::All);
    assert_eq!(Filter::and([Filter::eq("a", 1)]), Filter::eq("a", 1));
}

#[rstest]
#[case(Filter::eq("type", "ZX303"), true)]
#[case(Filter::eq("type", "TK102"), false)]
#[case(Filter::eq("timestamp", 20.0), true)]
#[case(Filter::eq("owner.id", "company-1"), true)]
#[case(Filter::eq("roles", "viewer"), true)]
#[case(Filter::eq("missing", "x"), false)]
#[case(Filter::eq("assignedId", Value::Null), false)]
#[case(Filter::contains("name", "acme"), true)]
#[case(Filter::contains("name", "widget"), false)]
#[case(Filter::one_of("type", [json!("TK102"), json!("ZX303")]), true)]
#[case(Filter::one_of("type", []), false)]
#[case(Filter::range("timestamp", Some(Bound::inclusive(20)), None), true)]
#[case(Filter::range("timestamp", Some(Bound::exclusive(20)), None), false)]
#[case(Filter::range("timestamp", None, Some(Bound::inclusive(20))), true)]
#[case(Filter::range("timestamp", None, Some(Bound::exclusive(20))), false)]
#[case(Filter::range("name", None, None), false)]
#[case(Filter::or([]), false)]
#[case(Filter::or([Filter::eq("type", "TK102"), Filter::eq("id", "r-1")]), true)]
#[case(Filter::And(vec![Filter::eq("type", "ZX303"), Filter::eq("id", "r-2")]), false)]
#[case(Filter::All, true)]
fn matches_evaluates_documents(reading: Value, #[case] filter: Filter, #[case] expected: bool) {
    assert_eq!(filter.matches(&reading), expected);
}

#[rstest]
#[case(None, Some(json!(1)), Ordering::Less)]
#[case(Some(json!(2)), Some(json!(10)), Ordering::Less)]
#[case(Some(json!(2.5)), Some(json!(2)), Ordering::Greater)]
#[case(Some(json!("b")), Some(json!("a")), Ordering::Greater)]
#[case(Some(json!(5)), Some(json!("a")), Ordering::Less)]
#[case(None, None, Ordering::Equal)]
fn compare_values_orders_mixed_types(
    #[case] left: Option<Value>,
    #[case] right: Option<Value>,
    #[case] expected: Ordering,
) {
    assert_eq!(compare_values(left.as_ref(), right.as_ref()), expected);
}
