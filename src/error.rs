//! Crate-wide error type.

use thiserror::Error;

use crate::backend::BackendError;
use crate::ingest::IngestError;
use crate::table::TableError;
use crate::translate::args::ArgParseError;

/// Result type for query execution.
pub type BabelResult<T> = Result<T, BabelError>;

/// Errors that abort a query.
#[derive(Error, Debug)]
pub enum BabelError {
    /// A pseudo-function argument list does not start with `(` or never closes.
    #[error("malformed argument list: {0}")]
    MalformedArgumentList(String),

    /// A quoted or bracketed argument has no closing terminator.
    #[error("ending {terminator} not found in: {fragment}")]
    UnterminatedSpan { terminator: char, fragment: String },

    /// Unknown command, wrong argument count, or missing collaborator.
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// A `sym` argument that resolves to no database.
    #[error("couldn't find symbol = {0}")]
    UnknownSymbol(String),

    /// A `db` command naming a destination that does not exist.
    #[error("database {0} doesn't exist")]
    UnknownDatabase(String),

    /// The fetcher returned nothing, or the payload could not be ingested.
    #[error("fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<IngestError>,
    },

    /// The backing engine rejected a statement.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A table could not be assembled.
    #[error(transparent)]
    InvalidTable(#[from] TableError),
}

impl BabelError {
    /// Fetch error without an underlying cause.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }

    /// True when the error lies in the query text rather than in the
    /// environment (network, backing engine).
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedArgumentList(_)
                | Self::UnterminatedSpan { .. }
                | Self::UnsupportedCommand(_)
                | Self::UnknownSymbol(_)
                | Self::UnknownDatabase(_)
        )
    }

    /// The part of the query the error refers to, when there is one.
    pub fn offending_fragment(&self) -> Option<&str> {
        match self {
            Self::MalformedArgumentList(s)
            | Self::UnsupportedCommand(s)
            | Self::UnknownSymbol(s)
            | Self::UnknownDatabase(s) => Some(s),
            Self::UnterminatedSpan { fragment, .. } => Some(fragment),
            _ => None,
        }
    }
}

impl From<ArgParseError> for BabelError {
    fn from(err: ArgParseError) -> Self {
        match err {
            ArgParseError::Malformed(fragment) => Self::MalformedArgumentList(fragment),
            ArgParseError::Unterminated {
                terminator,
                fragment,
            } => Self::UnterminatedSpan {
                terminator,
                fragment,
            },
        }
    }
}

impl From<IngestError> for BabelError {
    fn from(err: IngestError) -> Self {
        Self::Fetch {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
