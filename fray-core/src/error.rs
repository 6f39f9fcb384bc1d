use thiserror::Error;

use crate::types::AccountId;

/// Errors that escape an agent task.
///
/// Transient conflicts (version mismatches, WAIT verdicts) and fatal aborts
/// (DIE verdicts, lock timeouts, exhausted retries) are benchmark outcomes,
/// recorded as metrics; they never surface here. `BenchError` is reserved
/// for the unexpected: transport failures, malformed authority responses,
/// records that should exist but don't.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("account {0} does not exist")]
    AccountMissing(AccountId),

    #[error("lease authority rejected the request: {0}")]
    Authority(String),

    #[error("malformed authority response: {0}")]
    MalformedResponse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
