use feedback_lens::{
    category::{self, CategorySelection},
    data::Value,
    rowset::RowSet,
};
use proptest::prelude::*;

fn reasons(values: &[&str]) -> RowSet {
    RowSet::with_rows(
        vec!["reason".to_string(), "comment".to_string()],
        values
            .iter()
            .map(|value| {
                vec![
                    Some(Value::String(value.to_string())),
                    Some(Value::String(format!("about {value}"))),
                ]
            })
            .collect(),
    )
}

#[test]
fn categories_are_ordered_by_frequency() {
    let table = reasons(&["A", "B", "A", "A", "C"]);
    assert_eq!(
        category::list_categories(&table, "reason", None),
        vec!["All", "A", "B", "C"]
    );
}

#[test]
fn category_limit_truncates_after_sentinel() {
    let table = reasons(&["A", "B", "A", "A", "C", "C"]);
    assert_eq!(
        category::list_categories(&table, "reason", Some(2)),
        vec!["All", "A", "C"]
    );
    assert_eq!(
        category::list_categories(&table, "reason", Some(0)),
        vec!["All"]
    );
    assert_eq!(
        category::list_categories(&table, "reason", Some(10)).len(),
        4
    );
}

#[test]
fn missing_reason_column_lists_only_sentinel() {
    let table = reasons(&["A"]);
    assert_eq!(
        category::list_categories(&table, "reason2", Some(5)),
        vec!["All"]
    );
    let filtered = category::apply_filter(
        &table,
        "reason2",
        &CategorySelection::Value("A".to_string()),
    );
    assert!(filtered.is_empty());
}

#[test]
fn filter_is_exact_and_case_sensitive() {
    let table = reasons(&["Price", "price", "Price ", "Speed"]);
    let selection = "Price".parse::<CategorySelection>().expect("selection");
    let filtered = category::apply_filter(&table, "reason", &selection);
    assert_eq!(filtered.len(), 1);
    assert_eq!(
        category::verbatims(&filtered, "comment"),
        vec!["about Price"]
    );
}

#[test]
fn integer_reasons_match_their_rendered_text() {
    let table = RowSet::with_rows(
        vec!["reason".to_string()],
        vec![
            vec![Some(Value::Integer(3))],
            vec![Some(Value::Integer(4))],
            vec![None],
        ],
    );
    let filtered =
        category::apply_filter(&table, "reason", &CategorySelection::Value("3".to_string()));
    assert_eq!(filtered.len(), 1);
    assert_eq!(
        category::list_categories(&table, "reason", None),
        vec!["All", "3", "4"]
    );
}

proptest! {
    #[test]
    fn all_selection_is_identity(values in proptest::collection::vec("[A-C]{1,2}", 0..20)) {
        let refs = values.iter().map(String::as_str).collect::<Vec<_>>();
        let table = reasons(&refs);
        let filtered = category::apply_filter(&table, "reason", &CategorySelection::All);
        prop_assert_eq!(&*filtered, &table);
    }

    #[test]
    fn filtered_rows_all_carry_the_selection(
        values in proptest::collection::vec("[A-C]", 0..20),
        wanted in "[A-C]",
    ) {
        let refs = values.iter().map(String::as_str).collect::<Vec<_>>();
        let table = reasons(&refs);
        let filtered = category::apply_filter(
            &table,
            "reason",
            &CategorySelection::Value(wanted.clone()),
        );
        let expected = values.iter().filter(|value| **value == wanted).count();
        prop_assert_eq!(filtered.len(), expected);
        for row in filtered.rows() {
            prop_assert_eq!(row[0].as_ref().map(Value::as_display), Some(wanted.clone()));
        }
    }
}
