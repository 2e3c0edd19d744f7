//! Source aggregation: select the files behind a logical source, decode
//! them, and merge the results into one table.
//!
//! A file that cannot be fetched or decoded is skipped with a warning; the
//! request only fails when nothing maps to the selection or nothing loads.
//! Files are processed in listing order and their rows keep that order in
//! the merged table.

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::{
    decode,
    error::FeedbackError,
    rowset::RowSet,
    source::{FileDescriptor, LogicalSource},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub source: LogicalSource,
    pub table: RowSet,
    pub included: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuarterlyLookup {
    Found { file: String, table: RowSet },
    NotFound { keyword: String },
    /// The file exists but could not be loaded.
    Failed { file: String, reason: String },
    /// The selection has no quarterly companion (`All`).
    NotApplicable,
}

pub fn select_files<'a>(
    source: LogicalSource,
    files: &'a [FileDescriptor],
) -> Vec<&'a FileDescriptor> {
    files.iter().filter(|file| source.selects(&file.name)).collect()
}

pub fn aggregate<F>(
    source: LogicalSource,
    files: &[FileDescriptor],
    mut fetch: F,
) -> Result<Aggregation, FeedbackError>
where
    F: FnMut(&str) -> Result<Vec<u8>>,
{
    let selected = select_files(source, files);
    if selected.is_empty() {
        return Err(FeedbackError::NoMatch {
            selection: source.display_name().to_string(),
        });
    }

    let mut tables = Vec::with_capacity(selected.len());
    let mut included = Vec::with_capacity(selected.len());
    let mut skipped = Vec::new();
    for file in selected {
        match load_file(file, &mut fetch) {
            Ok(table) => {
                info!("Loaded {} row(s) from '{}'", table.len(), file.name);
                included.push(file.name.clone());
                tables.push(table);
            }
            Err(err) => {
                warn!("Skipping '{}': {err:#}", file.name);
                skipped.push(SkippedFile {
                    name: file.name.clone(),
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    if tables.is_empty() {
        return Err(FeedbackError::Exhausted {
            selection: source.display_name().to_string(),
            failures: skipped
                .iter()
                .map(|skip| format!("{}: {}", skip.name, skip.reason))
                .collect(),
        });
    }

    let table = if tables.len() == 1 {
        tables.pop().unwrap_or_default()
    } else {
        let mut merged = RowSet::concat(tables);
        decode::coerce_rating(&mut merged);
        merged
    };
    Ok(Aggregation {
        source,
        table,
        included,
        skipped,
    })
}

fn load_file<F>(file: &FileDescriptor, fetch: &mut F) -> Result<RowSet>
where
    F: FnMut(&str) -> Result<Vec<u8>>,
{
    let bytes = fetch(&file.id)?;
    Ok(decode::decode(&bytes)?)
}

/// Finds the first quarterly summary file for `source` and decodes it on its
/// own. Absence is reported as [`QuarterlyLookup::NotFound`] and a load
/// failure as [`QuarterlyLookup::Failed`]; neither aborts the request.
pub fn aggregate_quarterly<F>(
    source: LogicalSource,
    files: &[FileDescriptor],
    mut fetch: F,
) -> QuarterlyLookup
where
    F: FnMut(&str) -> Result<Vec<u8>>,
{
    let Some(keyword) = source.quarterly_keyword() else {
        return QuarterlyLookup::NotApplicable;
    };
    let Some(file) = files.iter().find(|file| source.matches_quarterly(&file.name)) else {
        warn!("{source} quarterly file ('{keyword}') not found");
        return QuarterlyLookup::NotFound {
            keyword: keyword.to_string(),
        };
    };
    match load_file(file, &mut fetch) {
        Ok(table) => {
            info!(
                "Loaded {} quarterly row(s) from '{}'",
                table.len(),
                file.name
            );
            QuarterlyLookup::Found {
                file: file.name.clone(),
                table,
            }
        }
        Err(err) => {
            warn!("Quarterly file '{}' could not be loaded: {err:#}", file.name);
            QuarterlyLookup::Failed {
                file: file.name.clone(),
                reason: format!("{err:#}"),
            }
        }
    }
}
