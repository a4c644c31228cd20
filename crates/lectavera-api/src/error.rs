use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was rejected with 401 and could not be recovered by a
    /// token refresh. The credential store has been cleared.
    #[error("unauthorized")]
    Unauthorized,

    /// Non-success response other than a recoverable 401. `detail` is the
    /// backend's `detail` field when the body carried one, else the raw body.
    #[error("request failed with status {code}: {detail}")]
    Status { code: u16, detail: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
