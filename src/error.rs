use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned while searching for downstream repositories.
///
/// Every variant is terminal for the call that produced it; nothing is retried.
#[derive(Error, Debug)]
pub enum DependentsError {
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,
    #[error("create request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("github request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("github API returned {status}")]
    Api { status: StatusCode },
    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
