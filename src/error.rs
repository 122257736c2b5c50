//! Error taxonomy shared by the credential, session and catalog layers.

use thiserror::Error;

pub type StreamingResult<T> = std::result::Result<T, StreamingError>;

#[derive(Error, Debug)]
pub enum StreamingError {
    /// A required field is missing or malformed, the message is user-facing.
    #[error("{0}")]
    Validation(String),

    #[error("Artist is already registered.")]
    AlreadyExists,

    /// Deliberately the same for unknown names and wrong passwords.
    #[error("Incorrect artist name or password.")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl StreamingError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        StreamingError::Validation(message.into())
    }
}
