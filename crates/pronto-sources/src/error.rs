use std::path::PathBuf;

use thiserror::Error;

/// Errors from the external collaborators: files, HTTP services and the database.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure, or a non-2xx status surfaced by `error_for_status`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but lacked a field the caller needs.
    #[error("response from {context} is missing '{field}'")]
    MissingField {
        context: String,
        field: &'static str,
    },

    #[error("sheet '{0}' returned no rows")]
    EmptySheet(String),

    #[error(transparent)]
    Db(#[from] pronto_db::DbError),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
