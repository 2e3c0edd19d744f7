//! Assembles what the presentation layer needs from one aggregation.
//!
//! Sections that depend on a missing column (categories, verbatims,
//! sentiment flags) are left empty and logged, never treated as failures.

use std::fmt::Write as _;

use log::warn;
use serde::Serialize;

use crate::{
    aggregate::{Aggregation, QuarterlyLookup, SkippedFile},
    category::{self, CategorySelection},
    columns,
    rowset::RowSet,
    schema::{self, SchemaTag},
    source::LogicalSource,
    table,
};

pub const DEFAULT_SAMPLE_ROWS: usize = 100;
pub const DEFAULT_CATEGORY_LIMIT: usize = 5;
const NEGATIVE_SENTIMENT: &str = "negative";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub selection: CategorySelection,
    /// `None` lists every category.
    pub category_limit: Option<usize>,
    pub sample_rows: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            selection: CategorySelection::All,
            category_limit: Some(DEFAULT_CATEGORY_LIMIT),
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub source: LogicalSource,
    pub schema: SchemaTag,
    pub included_files: Vec<String>,
    pub skipped_files: Vec<SkippedFile>,
    pub reason_column: Option<String>,
    pub comment_column: Option<String>,
    pub categories: Vec<String>,
    pub selection: CategorySelection,
    pub total_records: usize,
    pub matching_records: usize,
    pub sample: RowSet,
    /// Positions within `sample` whose sentiment is negative.
    pub negative_rows: Vec<usize>,
    pub verbatims: Vec<String>,
    pub quarterly: QuarterlyLookup,
}

pub fn build_report(
    aggregation: Aggregation,
    quarterly: QuarterlyLookup,
    options: &ReportOptions,
) -> FeedbackReport {
    let Aggregation {
        source,
        table,
        included,
        skipped,
    } = aggregation;
    let schema = schema::detect_for(source, table.columns());
    let reason_column = columns::resolve_reason(schema, table.columns());
    let comment_column = columns::resolve_comment(table.columns());

    let (categories, filtered) = match reason_column.as_deref() {
        Some(reason) => (
            category::list_categories(&table, reason, options.category_limit),
            category::apply_filter(&table, reason, &options.selection),
        ),
        None => {
            warn!("No reason column found; category filtering unavailable for {source}");
            (Vec::new(), std::borrow::Cow::Borrowed(&table))
        }
    };

    let verbatims = match comment_column.as_deref() {
        Some(comment) => category::verbatims(&filtered, comment),
        None => {
            warn!("No 'comment' column found for {source}");
            Vec::new()
        }
    };

    let sample = filtered.head(options.sample_rows);
    let negative_rows = negative_rows(&sample);
    let selection = if reason_column.is_some() {
        options.selection.clone()
    } else {
        CategorySelection::All
    };

    FeedbackReport {
        source,
        schema,
        included_files: included,
        skipped_files: skipped,
        reason_column,
        comment_column,
        categories,
        selection,
        total_records: table.len(),
        matching_records: filtered.len(),
        sample,
        negative_rows,
        verbatims,
        quarterly,
    }
}

pub fn negative_rows(table: &RowSet) -> Vec<usize> {
    let Some(column) = columns::resolve_sentiment(table.columns()) else {
        return Vec::new();
    };
    let Some(index) = table.column_index(&column) else {
        return Vec::new();
    };
    table
        .column_values(index)
        .enumerate()
        .filter(|(_, cell)| {
            cell.and_then(|value| value.as_str())
                .is_some_and(|text| text.trim().eq_ignore_ascii_case(NEGATIVE_SENTIMENT))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Plain-text rendering of every report section.
pub fn render_text(report: &FeedbackReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Feedback source: {}", report.source);
    let _ = writeln!(out, "Detected schema: {}", report.schema);
    let _ = writeln!(out, "Files: {}", report.included_files.join(", "));
    for skipped in &report.skipped_files {
        let _ = writeln!(out, "Skipped {}: {}", skipped.name, skipped.reason);
    }

    match &report.reason_column {
        Some(reason) => {
            let _ = writeln!(out, "\nCategories ({reason}):");
            let _ = writeln!(out, "{}", report.categories.join(" | "));
            let _ = writeln!(out, "Selected: {}", report.selection);
        }
        None => {
            let _ = writeln!(out, "\nNo reason column found; categories unavailable.");
        }
    }

    let _ = writeln!(out, "\n{} Quarterly Data", report.source);
    match &report.quarterly {
        QuarterlyLookup::Found { file, table: qtr } => {
            let _ = writeln!(out, "({file})");
            out.push_str(&table::render_table(qtr.columns(), &qtr.display_rows()));
        }
        QuarterlyLookup::NotFound { keyword } => {
            let _ = writeln!(out, "Warning: quarterly file matching '{keyword}' not found.");
        }
        QuarterlyLookup::Failed { file, reason } => {
            let _ = writeln!(out, "Warning: quarterly file '{file}' could not be loaded: {reason}");
        }
        QuarterlyLookup::NotApplicable => {
            let _ = writeln!(out, "Not available for this source.");
        }
    }

    let _ = writeln!(
        out,
        "\nFeedback Entries: {} records found (showing {})",
        report.matching_records,
        report.sample.len()
    );
    let mut rows = report.sample.display_rows();
    for &idx in &report.negative_rows {
        if let Some(row) = rows.get_mut(idx) {
            for cell in row.iter_mut() {
                *cell = table::highlight(cell);
            }
        }
    }
    out.push_str(&table::render_table(report.sample.columns(), &rows));

    match &report.comment_column {
        Some(comment) => {
            let _ = writeln!(out, "\nBuyer Verbatims ({comment}):");
            let verbatim_rows = report
                .verbatims
                .iter()
                .map(|value| vec![value.clone()])
                .collect::<Vec<_>>();
            out.push_str(&table::render_table(&[comment.clone()], &verbatim_rows));
        }
        None => {
            let _ = writeln!(out, "\nWarning: no 'comment' column found.");
        }
    }
    out
}
