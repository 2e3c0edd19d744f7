mod common;

use common::{NPS_JAN, PLAY_STORE, latin1_bytes};
use feedback_lens::{data::Value, decode, error::FeedbackError};

#[test]
fn identifier_columns_keep_leading_zeros() {
    let set = decode::decode(NPS_JAN.as_bytes()).expect("decode");
    let index = set.column_index("user_id").expect("user_id column");
    assert_eq!(
        set.cell(0, index),
        Some(&Value::String("00123".to_string()))
    );
}

#[test]
fn western_european_fallback_matches_utf8_row_count() {
    let text = "reason,comment\nQualité,Très déçu\nPrix,Trop cher à Noël\nService,Ça va\n";
    let utf8 = decode::decode(text.as_bytes()).expect("utf-8 decode");
    let latin1 = latin1_bytes(text);
    assert!(std::str::from_utf8(&latin1).is_err());

    let fallback = decode::decode(&latin1).expect("fallback decode");
    assert_eq!(fallback.len(), utf8.len());
    assert_eq!(fallback.display_rows(), utf8.display_rows());
}

#[test]
fn bom_prefixed_headers_are_clean() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(NPS_JAN.as_bytes());
    let set = decode::decode(&bytes).expect("decode");
    assert_eq!(set.columns()[0], "source");
    assert_eq!(set.len(), 3);
}

#[test]
fn rating_values_are_nullable_integers() {
    let set = decode::decode(PLAY_STORE.as_bytes()).expect("decode");
    let index = set.column_index("rating").expect("rating column");
    let ratings = set
        .column_values(index)
        .map(|cell| cell.cloned())
        .collect::<Vec<_>>();
    assert_eq!(
        ratings,
        vec![Some(Value::Integer(1)), Some(Value::Integer(5)), None]
    );
}

#[test]
fn header_only_file_decodes_to_empty_set() {
    let set = decode::decode(b"reason,comment\n").expect("decode");
    assert!(set.is_empty());
    assert_eq!(set.columns(), &["reason", "comment"]);
}

#[test]
fn structural_errors_are_not_retried_as_encoding_errors() {
    let err = decode::decode(b"reason\nPrice,extra\n").expect_err("malformed");
    assert!(matches!(err, FeedbackError::Malformed(_)));
}
