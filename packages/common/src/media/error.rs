use thiserror::Error;

/// Errors raised while talking to the remote media store.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media store is misconfigured: {0}")]
    Config(String),

    #[error("media store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("media store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected media store response: {0}")]
    InvalidResponse(String),

    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: usize, limit: usize },
}
