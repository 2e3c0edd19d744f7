//! Tabular decoder: raw CSV bytes into a typed [`RowSet`].
//!
//! Decoding runs once per candidate encoding. For each attempt the header and
//! a short preview are read to enumerate columns, identifier-like columns are
//! pinned to strings, and the full buffer is decoded with those types. A text
//! decoding failure moves on to the next encoding; structural CSV problems
//! do not, since another encoding cannot fix them.

use encoding_rs::Encoding;
use log::debug;

use crate::{
    data::{Value, coerce_integer, parse_integer},
    error::FeedbackError,
    io_utils::{self, DEFAULT_CSV_DELIMITER},
    rowset::{Row, RowSet},
};

pub const PREVIEW_ROWS: usize = 5;
pub const RATING_COLUMN: &str = "rating";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Values kept verbatim as strings.
    Text,
    /// Integer when every non-empty value parses, otherwise string.
    Inferred,
}

#[derive(Debug, Clone)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn is_identifier_column(name: &str) -> bool {
    name.to_ascii_lowercase().contains("id")
}

/// Decodes with the default UTF-8 then ISO-8859-1 chain.
pub fn decode(bytes: &[u8]) -> Result<RowSet, FeedbackError> {
    decode_with(bytes, &io_utils::default_encoding_chain())
}

pub fn decode_with(bytes: &[u8], chain: &[&'static Encoding]) -> Result<RowSet, FeedbackError> {
    for &encoding in chain {
        let text = match io_utils::decode_bytes(bytes, encoding) {
            Ok(text) => text,
            Err(err) => {
                debug!("{err}; trying next encoding");
                continue;
            }
        };
        let preview = preview(&text, PREVIEW_ROWS)?;
        let kinds = preview
            .headers
            .iter()
            .map(|name| {
                if is_identifier_column(name) {
                    ColumnKind::Text
                } else {
                    ColumnKind::Inferred
                }
            })
            .collect::<Vec<_>>();
        let mut set = decode_text(&text, &kinds)?;
        coerce_rating(&mut set);
        debug!(
            "Decoded {} row(s) across {} column(s) as {}",
            set.len(),
            set.columns().len(),
            encoding.name()
        );
        return Ok(set);
    }
    Err(FeedbackError::Decode {
        tried: io_utils::encoding_names(chain),
    })
}

/// Reads the header and at most `rows` data records.
pub fn preview(text: &str, rows: usize) -> Result<Preview, FeedbackError> {
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), DEFAULT_CSV_DELIMITER, true);
    let headers = read_headers(&mut reader)?;
    let mut sample = Vec::new();
    for (idx, record) in reader.records().take(rows).enumerate() {
        let record = record.map_err(|err| malformed(idx + 2, err))?;
        sample.push(record.iter().map(str::to_string).collect());
    }
    Ok(Preview {
        headers,
        rows: sample,
    })
}

fn read_headers<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<Vec<String>, FeedbackError> {
    let headers = reader
        .headers()
        .map_err(|err| FeedbackError::Malformed(format!("reading header row: {err}")))?;
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(FeedbackError::Malformed("missing header row".to_string()));
    }
    Ok(headers.iter().map(str::to_string).collect())
}

fn decode_text(text: &str, kinds: &[ColumnKind]) -> Result<RowSet, FeedbackError> {
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), DEFAULT_CSV_DELIMITER, true);
    let headers = read_headers(&mut reader)?;
    let width = headers.len();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| malformed(idx + 2, err))?;
        if record.len() > width {
            return Err(FeedbackError::Malformed(format!(
                "row {}: expected {} field(s), saw {}",
                idx + 2,
                width,
                record.len()
            )));
        }
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    let integer_columns = (0..width)
        .map(|col| {
            kinds.get(col) == Some(&ColumnKind::Inferred) && all_integers(&raw_rows, col)
        })
        .collect::<Vec<_>>();

    let mut set = RowSet::new(headers);
    for raw in raw_rows {
        let row: Row = raw
            .into_iter()
            .enumerate()
            .map(|(col, value)| typed_cell(value, integer_columns[col]))
            .collect();
        set.push_row(row);
    }
    Ok(set)
}

fn all_integers(rows: &[Vec<String>], column: usize) -> bool {
    let mut seen = false;
    for row in rows {
        match row.get(column).map(String::as_str) {
            Some(value) if !value.is_empty() => {
                if parse_integer(value).is_none() {
                    return false;
                }
                seen = true;
            }
            _ => {}
        }
    }
    seen
}

fn typed_cell(value: String, integer: bool) -> Option<Value> {
    if value.is_empty() {
        return None;
    }
    if integer {
        parse_integer(&value).map(Value::Integer)
    } else {
        Some(Value::String(value))
    }
}

/// Turns the `rating` column (any casing, matching how merged columns are
/// unified) into nullable integers; values that do not coerce become null.
/// Idempotent.
pub fn coerce_rating(set: &mut RowSet) {
    let Some(index) = set.column_index(RATING_COLUMN) else {
        return;
    };
    for cell in set.column_cells_mut(index) {
        *cell = match cell.take() {
            Some(Value::Integer(i)) => Some(Value::Integer(i)),
            Some(Value::String(s)) => coerce_integer(&s).map(Value::Integer),
            None => None,
        };
    }
}

fn malformed(row: usize, err: csv::Error) -> FeedbackError {
    FeedbackError::Malformed(format!("row {row}: {err}"))
}
