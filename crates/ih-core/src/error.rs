//! Unified error type for the image handler.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for the HTTP boundary to derive a status code via [`Error::http_status`].
//! Asking the edge to serve an object straight from origin is *not* an error;
//! stores report it through `FetchOutcome::DirectAccessRequested` instead.

/// Unified error type covering all failure modes of a transform request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request path or chain could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// A directive names an action that is not registered.
    #[error("Unknown action: \"{0}\"")]
    UnknownAction(String),

    /// A directive's parameters failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The object store has nothing under the requested key.
    #[error("object not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// The object store failed (network error, bad status, ...).
    #[error("Store error: {message}")]
    Store {
        /// Human-readable error description.
        message: String,
    },

    /// The image engine failed (corrupt bytes, unsupported codec, ...).
    #[error("Engine error: {message}")]
    Engine {
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The request was cancelled before the chain finished.
    #[error("request cancelled")]
    Cancelled,

    /// The request exceeded its processing deadline.
    #[error("request timed out")]
    Timeout,

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::MalformedRequest(_) => 400,
            Error::UnknownAction(_) => 400,
            Error::InvalidArgument(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Store { .. } => 502,
            Error::Engine { .. } => 500,
            Error::Io { .. } => 500,
            Error::Cancelled => 503,
            Error::Timeout => 504,
            Error::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedRequest(_) => "malformed_request",
            Error::UnknownAction(_) => "unknown_action",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::NotFound { .. } => "not_found",
            Error::Store { .. } => "upstream_store",
            Error::Engine { .. } => "upstream_engine",
            Error::Io { .. } => "io_error",
            Error::Cancelled => "cancelled",
            Error::Timeout => "timeout",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure was caused by the client's request.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status())
    }

    /// Convenience constructor for [`Error::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(key: impl Into<String>) -> Self {
        Error::NotFound { key: key.into() }
    }

    /// Convenience constructor for [`Error::Store`].
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::engine(e.to_string())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
