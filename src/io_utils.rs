//! Encoding and CSV reader helpers.
//!
//! Feedback exports arrive as whole byte buffers from a file source, so text
//! is decoded up front (stripping a UTF-8 BOM when present) and the CSV
//! reader then runs over the decoded text.
//!
//! - **Encoding chain**: UTF-8 followed by the Western-European fallback.
//! - **Reader construction**: `open_csv_reader` configures header handling,
//!   quoting, and ragged-row tolerance in one place.

use std::io::Read;

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';

/// UTF-8 first, then windows-1252, which is what `encoding_rs` resolves the
/// `ISO-8859-1` label to.
pub fn default_encoding_chain() -> Vec<&'static Encoding> {
    vec![UTF_8, WINDOWS_1252]
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Decodes a whole buffer, removing a leading BOM that matches `encoding`.
/// Returns an error when the bytes are not valid in that encoding.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn encoding_names(chain: &[&'static Encoding]) -> String {
    chain
        .iter()
        .map(|encoding| encoding.name())
        .collect::<Vec<_>>()
        .join(", ")
}
