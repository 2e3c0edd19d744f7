//! Column resolution across inconsistently named exports.
//!
//! Lookups are an ordered search for the first column whose name contains a
//! needle, compared case-insensitively. This is a heuristic and keeps its
//! known false positives: `unreasonable` matches `reason`, `paid_flag`
//! matches `id`.

use crate::schema::SchemaTag;

pub const REASON: &str = "reason";
pub const SUB_REASON: &str = "reason2";
pub const COMMENT: &str = "comment";
pub const SENTIMENT: &str = "sentiment";

pub fn find_column_containing<'a, S>(columns: &'a [S], needle: &str) -> Option<&'a str>
where
    S: AsRef<str>,
{
    let needle = needle.to_lowercase();
    columns
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|name| name.to_lowercase().contains(&needle))
}

/// Category column for a table: schemas with a two-tier reason hierarchy use
/// the finer `reason2` when present.
pub fn resolve_reason<S>(schema: SchemaTag, columns: &[S]) -> Option<String>
where
    S: AsRef<str>,
{
    let preferred = if schema.prefers_sub_reason() {
        find_column_containing(columns, SUB_REASON)
    } else {
        None
    };
    preferred
        .or_else(|| find_column_containing(columns, REASON))
        .map(str::to_string)
}

pub fn resolve_comment<S>(columns: &[S]) -> Option<String>
where
    S: AsRef<str>,
{
    find_column_containing(columns, COMMENT).map(str::to_string)
}

/// Exact (case-insensitive) match, unlike the substring lookups, so that
/// columns such as `sentiment_score` are not mistaken for the label.
pub fn resolve_sentiment<S>(columns: &[S]) -> Option<String>
where
    S: AsRef<str>,
{
    columns
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|name| name.trim().eq_ignore_ascii_case(SENTIMENT))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_column_returns_first_match_in_order() {
        let columns = ["Comment_Date", "comment", "reason"];
        assert_eq!(find_column_containing(&columns, "comment"), Some("Comment_Date"));
        assert_eq!(find_column_containing(&columns, "missing"), None);
    }

    #[test]
    fn sub_reason_preferred_for_two_tier_schemas() {
        let columns = ["reason", "Reason2", "comment"];
        assert_eq!(
            resolve_reason(SchemaTag::PlayStore, &columns).as_deref(),
            Some("Reason2")
        );
        assert_eq!(
            resolve_reason(SchemaTag::SellerRelevance, &columns).as_deref(),
            Some("Reason2")
        );
        assert_eq!(
            resolve_reason(SchemaTag::NpsAppInternal, &columns).as_deref(),
            Some("reason")
        );
        assert_eq!(
            resolve_reason(SchemaTag::All, &columns).as_deref(),
            Some("reason")
        );
    }

    #[test]
    fn sub_reason_falls_back_to_reason() {
        let columns = ["id", "reason"];
        assert_eq!(
            resolve_reason(SchemaTag::PlayStore, &columns).as_deref(),
            Some("reason")
        );
    }

    #[test]
    fn substring_heuristic_keeps_false_positives() {
        let columns = ["unreasonable", "reason"];
        assert_eq!(
            resolve_reason(SchemaTag::Unknown, &columns).as_deref(),
            Some("unreasonable")
        );
    }

    #[test]
    fn missing_columns_resolve_to_none() {
        let columns = ["id", "rating"];
        assert_eq!(resolve_reason(SchemaTag::Unknown, &columns), None);
        assert_eq!(resolve_comment(&columns), None);
        assert_eq!(resolve_sentiment(&columns), None);
    }

    #[test]
    fn sentiment_requires_exact_name() {
        let columns = ["sentiment_score", "Sentiment"];
        assert_eq!(resolve_sentiment(&columns).as_deref(), Some("Sentiment"));
    }
}
