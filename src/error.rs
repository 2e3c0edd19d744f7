//! Error taxonomy for decoding and aggregation.
//!
//! Per-file conditions (`Decode`, `Malformed`) are caught by the aggregator
//! and turned into skip warnings; `NoMatch` and `Exhausted` end the request.
//! An unknown schema is never an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("no supported text encoding could decode the input (tried {tried})")]
    Decode { tried: String },
    #[error("malformed CSV: {0}")]
    Malformed(String),
    #[error("no CSV files match the selected feedback source: {selection}")]
    NoMatch { selection: String },
    #[error("every file for feedback source '{selection}' failed to load: {}", .failures.join("; "))]
    Exhausted {
        selection: String,
        failures: Vec<String>,
    },
}
