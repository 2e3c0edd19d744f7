//! In-memory table of decoded feedback rows.
//!
//! A [`RowSet`] keeps its column names in file order with their original
//! casing; lookups by name are case-insensitive. Every row has exactly one
//! cell per column, which [`RowSet::push_row`] enforces.

use serde::Serialize;

use crate::data::Value;

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut set = Self::new(columns);
        for row in rows {
            set.push_row(row);
        }
        set
    }

    /// Appends a row, padding with nulls or truncating so the width always
    /// matches the column list.
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&Value>> + '_ {
        self.rows.iter().map(move |row| row[column].as_ref())
    }

    pub(crate) fn column_cells_mut(
        &mut self,
        column: usize,
    ) -> impl Iterator<Item = &mut Option<Value>> + '_ {
        self.rows.iter_mut().map(move |row| &mut row[column])
    }

    /// Returns a new set with the same columns and only the rows accepted by
    /// `keep`, in their original order.
    pub fn filter_rows<F>(&self, mut keep: F) -> RowSet
    where
        F: FnMut(&Row) -> bool,
    {
        RowSet {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    pub fn head(&self, count: usize) -> RowSet {
        RowSet {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(count).cloned().collect(),
        }
    }

    /// Concatenates sets in order. The result's columns are the union of all
    /// inputs in first-seen order (matched case-insensitively, first casing
    /// kept); cells for columns a set lacks are null.
    pub fn concat(sets: Vec<RowSet>) -> RowSet {
        let mut columns: Vec<String> = Vec::new();
        let mut layouts: Vec<Vec<usize>> = Vec::with_capacity(sets.len());
        for set in &sets {
            // A position is claimed once per set so that same-named columns
            // inside one file stay distinct.
            let mut positions: Vec<usize> = Vec::with_capacity(set.columns.len());
            for column in &set.columns {
                let existing = columns.iter().enumerate().position(|(idx, name)| {
                    name.eq_ignore_ascii_case(column) && !positions.contains(&idx)
                });
                let position = existing.unwrap_or_else(|| {
                    columns.push(column.clone());
                    columns.len() - 1
                });
                positions.push(position);
            }
            layouts.push(positions);
        }

        let total = sets.iter().map(RowSet::len).sum();
        let mut merged = RowSet {
            columns,
            rows: Vec::with_capacity(total),
        };
        for (set, positions) in sets.into_iter().zip(layouts) {
            for row in set.rows {
                let mut target: Row = vec![None; merged.columns.len()];
                for (cell, &position) in row.into_iter().zip(positions.iter()) {
                    target[position] = cell;
                }
                merged.rows.push(target);
            }
        }
        merged
    }

    /// Renders every cell as text, nulls as empty strings.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| crate::data::display_cell(cell.as_ref()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<Value> {
        Some(Value::String(value.to_string()))
    }

    #[test]
    fn push_row_normalizes_width() {
        let mut set = RowSet::new(vec!["a".into(), "b".into()]);
        set.push_row(vec![text("1")]);
        set.push_row(vec![text("1"), text("2"), text("3")]);
        assert!(set.rows().iter().all(|row| row.len() == 2));
        assert_eq!(set.cell(0, 1), None);
    }

    #[test]
    fn column_index_ignores_case() {
        let set = RowSet::new(vec!["Comment".into(), "Reason".into()]);
        assert_eq!(set.column_index("reason"), Some(1));
        assert_eq!(set.column_index("COMMENT"), Some(0));
        assert_eq!(set.column_index("missing"), None);
    }

    #[test]
    fn concat_fills_missing_columns_with_null() {
        let left = RowSet::with_rows(
            vec!["id".into(), "reason".into()],
            vec![vec![text("1"), text("Price")]],
        );
        let right = RowSet::with_rows(
            vec!["Reason".into(), "channel".into()],
            vec![vec![text("Quality"), text("web")], vec![None, text("app")]],
        );

        let merged = RowSet::concat(vec![left, right]);
        assert_eq!(merged.columns(), &["id", "reason", "channel"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.rows()[0], vec![text("1"), text("Price"), None]);
        assert_eq!(merged.rows()[1], vec![None, text("Quality"), text("web")]);
        assert_eq!(merged.rows()[2], vec![None, None, text("app")]);
    }

    #[test]
    fn filter_rows_keeps_order_and_columns() {
        let set = RowSet::with_rows(
            vec!["n".into()],
            vec![
                vec![Some(Value::Integer(1))],
                vec![Some(Value::Integer(2))],
                vec![Some(Value::Integer(3))],
            ],
        );
        let odd = set.filter_rows(|row| matches!(row[0], Some(Value::Integer(v)) if v % 2 == 1));
        assert_eq!(odd.columns(), set.columns());
        assert_eq!(odd.display_rows(), vec![vec!["1"], vec!["3"]]);
    }
}
