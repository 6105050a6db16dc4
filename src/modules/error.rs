use thiserror::Error;

/// Error type for every editor operation.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// The backend answered with an `error` field
    #[error("{0}")]
    Backend(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid toml: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("cannot write toml: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
