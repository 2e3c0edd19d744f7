//! Category listing and filtering on the resolved reason column.
//!
//! Listing counts distinct non-null reason values and orders them by
//! descending frequency, ties by first appearance. Filtering compares the
//! rendered cell text byte-for-byte with the selection; unlike column-name
//! matching, no case folding or trimming happens here.

use std::{borrow::Cow, collections::HashMap, fmt, str::FromStr};

use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::{data::Value, rowset::RowSet};

pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    Value(String),
}

impl CategorySelection {
    pub fn as_str(&self) -> &str {
        match self {
            CategorySelection::All => ALL_CATEGORIES,
            CategorySelection::Value(value) => value,
        }
    }
}

impl FromStr for CategorySelection {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(if value == ALL_CATEGORIES {
            CategorySelection::All
        } else {
            CategorySelection::Value(value.to_string())
        })
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategorySelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// `All` followed by the distinct reason values, most frequent first. With
/// `Some(limit)` only the first `limit` values follow the sentinel.
pub fn list_categories(table: &RowSet, reason_column: &str, limit: Option<usize>) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    let Some(index) = table.column_index(reason_column) else {
        return categories;
    };

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, value) in table.column_values(index).flatten().enumerate() {
        counts
            .entry(value.as_display())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let ordered = counts
        .into_iter()
        .sorted_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_b.cmp(count_a).then_with(|| first_a.cmp(first_b))
        })
        .map(|(value, _)| value);
    match limit {
        Some(limit) => categories.extend(ordered.take(limit)),
        None => categories.extend(ordered),
    }
    categories
}

/// Rows whose reason cell equals `selection` exactly. `All` borrows the
/// table unchanged. A missing reason column matches nothing.
pub fn apply_filter<'a>(
    table: &'a RowSet,
    reason_column: &str,
    selection: &CategorySelection,
) -> Cow<'a, RowSet> {
    let wanted = match selection {
        CategorySelection::All => return Cow::Borrowed(table),
        CategorySelection::Value(value) => value.as_str(),
    };
    let Some(index) = table.column_index(reason_column) else {
        return Cow::Owned(table.filter_rows(|_| false));
    };
    Cow::Owned(table.filter_rows(|row| matches_exactly(row[index].as_ref(), wanted)))
}

fn matches_exactly(cell: Option<&Value>, wanted: &str) -> bool {
    match cell {
        Some(Value::String(value)) => value == wanted,
        Some(Value::Integer(value)) => value.to_string() == wanted,
        None => false,
    }
}

/// Distinct non-null comment values in first-seen order.
pub fn verbatims(table: &RowSet, comment_column: &str) -> Vec<String> {
    let Some(index) = table.column_index(comment_column) else {
        return Vec::new();
    };
    table
        .column_values(index)
        .flatten()
        .map(Value::as_display)
        .unique()
        .collect()
}
