//! Error types for Redbridge
//!
//! One taxonomy for the whole gateway. `Display` strings double as the
//! user-visible `error` field of JSON responses, so the wording here is
//! part of the HTTP contract.

use thiserror::Error;

/// Result type alias using Redbridge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Redbridge
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid startup configuration. Aborts the process before it serves
    /// traffic; never surfaced over HTTP.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or incorrect bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Request body present but not valid JSON
    #[error("unable to parse body as JSON")]
    BodyNotJson,

    /// Neither body nor path yielded a command
    #[error("no command provided")]
    NoCommand,

    /// Command name missing or not a string
    #[error("command name must be a non-empty string")]
    InvalidCommandName,

    /// An array of command arrays was sent to the single-command path
    #[error("nested command arrays are only accepted on /pipeline and /multi-exec")]
    BatchNotAllowed,

    /// Batch body is not an array of non-empty command arrays
    #[error("Expected a JSON array of command arrays")]
    MalformedBatch,

    /// Pipeline execution produced no result
    #[error("pipeline failed")]
    PipelineFailed,

    /// Transaction execution produced no result
    #[error("transaction failed")]
    TransactionFailed,

    /// Error propagated from the backing store client
    #[error("{0}")]
    Store(String),
}

impl Error {
    /// HTTP status code for this error type
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Unauthorized => 401,
            Error::Config(_) => 500,
            _ => 400,
        }
    }
}
