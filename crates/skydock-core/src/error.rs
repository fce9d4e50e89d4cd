use thiserror::Error;

/// A convenience `Result` alias using [`SkydockError`].
pub type SkydockResult<T> = Result<T, SkydockError>;

/// Top-level error type for the Skydock client.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Error, Debug)]
pub enum SkydockError {
    /// An error originating from the chat streaming pipeline.
    #[error("Chat error: {0}")]
    Chat(String),

    /// An error related to session loading or caching.
    #[error("Session error: {0}")]
    Session(String),

    /// An error from an outbound HTTP request to the backend.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
