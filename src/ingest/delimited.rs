//! Delimited text (CSV, TSV, pipe- or semicolon-separated).

use std::collections::HashMap;

use csv::ReaderBuilder;

use super::grid::from_string_grid;
use super::IngestError;
use crate::sql::types::SqlType;
use crate::table::ColumnarTable;

/// Candidate separators, in tie-break order.
const SEPARATORS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Parse delimited text into a typed table.
///
/// The separator is whichever candidate occurs most often in the text. A
/// header row is assumed unless the first two lines look alike.
pub fn from_delimited(text: &str, overrides: &HashMap<String, SqlType>) -> Result<ColumnarTable, IngestError> {
    let first_break = text.find('\n').filter(|&p| p > 0).ok_or(IngestError::NoNewline)?;
    let separator = most_frequent_separator(text);

    let header = match text[first_break + 1..].find('\n') {
        Some(len) => {
            let first = &text[..first_break];
            let second = &text[first_break..first_break + 1 + len];
            !lines_look_alike(first, second)
        }
        None => true,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| Some(field.to_string())).collect());
    }

    Ok(from_string_grid(rows, overrides, header)?)
}

fn most_frequent_separator(text: &str) -> u8 {
    let mut counts = [0usize; SEPARATORS.len()];
    for b in text.bytes() {
        if let Some(i) = SEPARATORS.iter().position(|&s| s == b) {
            counts[i] += 1;
        }
    }
    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    SEPARATORS[best]
}

/// Two lines with near-identical letter density and digit count are both
/// data rows.
fn lines_look_alike(a: &str, b: &str) -> bool {
    let ratio = |s: &str| {
        let alpha = s.chars().filter(|c| c.is_alphabetic()).count() as f64;
        let dots = s.chars().filter(|&c| c == '.').count() as f64;
        alpha / (1.0 + dots)
    };
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).count() as i64;

    (ratio(a) - ratio(b)).abs() < 0.05 && (digits(a) - digits(b)).abs() < 10
}
