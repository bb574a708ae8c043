use reqwest::StatusCode;
use thiserror::Error;

use sentrag_core::types::SearchMode;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed store response: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The store answered but refused the operation. `message` is the store's
    /// own text, unmodified.
    #[error("store rejected {operation} (code {code}): {message}")]
    Rejected { operation: &'static str, code: i64, message: String },

    #[error("search row {row}: {problem}")]
    InvalidRow { row: usize, problem: String },

    #[error("{mode:?} search needs a query {input}")]
    MissingQueryInput { mode: SearchMode, input: &'static str },

    #[error("unknown metric type '{0}'")]
    UnknownMetric(String),
}
