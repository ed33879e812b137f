use thiserror::Error;

/// Callback engine errors
#[derive(Error, Debug)]
pub enum CallbackError {
    /// Datastore errors
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),

    /// Missing or malformed identifiers on an event or command
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Origination errors
    #[error("Origination error: {0}")]
    Originate(String),

    /// Call-scripting session errors
    #[error("Session error: {0}")]
    Session(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CallbackError {
    /// Create a new InvalidArgument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new NotFound error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Originate error
    pub fn originate<S: Into<String>>(msg: S) -> Self {
        Self::Originate(msg.into())
    }

    /// Create a new Session error
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Self::Session(msg.into())
    }

    /// Create a new Internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for callback engine operations
pub type Result<T> = std::result::Result<T, CallbackError>;
