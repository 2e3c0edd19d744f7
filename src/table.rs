//! Plain-text table rendering for terminal output.
//!
//! Column widths ignore ANSI escape sequences so highlighted rows line up
//! with plain ones. Long free-text cells (verbatims) are clipped.

use std::borrow::Cow;
use std::fmt::Write as _;

pub const MAX_CELL_WIDTH: usize = 60;
const COLUMN_GAP: &str = "  ";
const HIGHLIGHT_START: &str = "\u{1b}[41m";
const HIGHLIGHT_END: &str = "\u{1b}[0m";

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers = headers.iter().map(|h| prepare_cell(h)).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| prepare_cell(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Wraps a cell in a red-background escape sequence.
pub fn highlight(value: &str) -> String {
    format!("{HIGHLIGHT_START}{value}{HIGHLIGHT_END}")
}

fn prepare_cell(value: &str) -> String {
    let sanitized = sanitize_cell(value);
    if display_width(&sanitized) <= MAX_CELL_WIDTH {
        return sanitized.into_owned();
    }
    clip_visible(&sanitized, MAX_CELL_WIDTH.saturating_sub(3))
}

/// Keeps the first `keep` visible characters followed by `...`. Escape
/// sequences pass through uncounted; styling is reset at the end.
fn clip_visible(value: &str, keep: usize) -> String {
    let mut clipped = String::with_capacity(value.len().min(keep * 4 + 16));
    let mut visible = 0usize;
    let mut styled = false;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            styled = true;
            clipped.push(ch);
            for next in chars.by_ref() {
                clipped.push(next);
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        if visible == keep {
            break;
        }
        clipped.push(ch);
        visible += 1;
    }
    clipped.push_str("...");
    if styled {
        clipped.push_str(HIGHLIGHT_END);
    }
    clipped
}

fn format_row<S: AsRef<str>>(values: &[S], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let value = value.as_ref();
            let padding = width.saturating_sub(display_width(value));
            format!("{value}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    let trimmed = line.trim_end().len();
    line.truncate(trimmed);
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
