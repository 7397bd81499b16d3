//! Turning untyped payloads into typed tables.
//!
//! [`from_text`] sniffs the payload format and hands it to one of the
//! readers:
//!
//! | Format    | Reader                         |
//! |-----------|--------------------------------|
//! | JSON      | [`json::from_json`]            |
//! | HTML      | [`html::from_html`]            |
//! | Delimited | [`delimited::from_delimited`]  |
//!
//! All three infer column types through [`crate::infer`] and finish with
//! the same override and upgrade pass.

pub mod delimited;
pub mod grid;
pub mod html;
pub mod json;
pub mod json_path;
pub mod overrides;

use thiserror::Error;
use tracing::debug;

use crate::table::{ColumnarTable, TableError};

pub use overrides::parse_overrides;

/// Errors raised while ingesting a payload.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid delimited text: {0}")]
    Delimited(#[from] csv::Error),

    #[error("path {0} selected null")]
    NullPath(String),

    #[error("invalid path {path}: {reason}")]
    Path { path: String, reason: String },

    #[error("no newline found")]
    NoNewline,

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Payload formats recognized by [`detect_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Html,
    Delimited,
}

/// Guess the payload format.
///
/// Text starting with `{` or `[` is JSON. A page with more than three `<tr`
/// and a `<table` is HTML. Forced delimited parsing, more commas than twice
/// the `}` count, or no `}` at all mean delimited. Anything else is JSON.
pub fn detect_format(text: &str, force_delimited: bool) -> Format {
    let curlies = text.matches('}').count();
    let many_commas = text.matches(',').count() > 2 * curlies;
    let tr_count = text.matches("<tr").count();

    if text.starts_with('{') || text.starts_with('[') {
        Format::Json
    } else if tr_count > 3 && text.contains("<table") {
        Format::Html
    } else if force_delimited || many_commas || curlies == 0 {
        Format::Delimited
    } else {
        Format::Json
    }
}

/// Ingest a payload.
///
/// `path` narrows JSON documents and `overrides` is a column-type map as
/// accepted by [`parse_overrides`]. Blank strings mean "none".
pub fn from_text(
    text: &str,
    path: Option<&str>,
    overrides: Option<&str>,
    force_delimited: bool,
) -> Result<ColumnarTable, IngestError> {
    let text = format!("{}\r\n", text.trim());
    let overrides = overrides.map(parse_overrides).unwrap_or_default();
    let format = detect_format(&text, force_delimited);
    debug!(?format, bytes = text.len(), "ingesting payload");

    let table = match format {
        Format::Json => json::from_json(&text, path, &overrides)?,
        Format::Html => html::from_html(&text, &overrides)?,
        Format::Delimited => delimited::from_delimited(&text, &overrides)?,
    };
    Ok(table.cast_types(&overrides, true))
}
