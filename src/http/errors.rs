use thiserror::Error;

/// Broad failure classes surfaced to the widget chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input, caught before any network call.
    Input,
    /// Network failure, timeout, or non-2xx status.
    Transport,
    /// Body was not valid JSON.
    Parse,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Please enter an API URL")]
    EmptyUrl,
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("request timed out after {0}ms")]
    Timeout(u64),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {0}: {1}")]
    Status(u16, String),
    #[error("response is not valid JSON: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::EmptyUrl | FetchError::InvalidUrl(_) => ErrorKind::Input,
            FetchError::Timeout(_) | FetchError::Transport(_) | FetchError::Status(..) => {
                ErrorKind::Transport
            }
            FetchError::Parse(_) => ErrorKind::Parse,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
