use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemotingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Adapter is not connected; call connect() with a server URL first")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Form encoding error: {0}")]
    UrlEncoding(#[from] serde_urlencoded::ser::Error),

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, RemotingError>;

impl RemotingError {
    /// True when the server answered but with a non-success status code.
    pub fn is_status(&self) -> bool {
        matches!(self, RemotingError::Status { .. })
    }

    /// The HTTP status code for `Status` errors, `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RemotingError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
