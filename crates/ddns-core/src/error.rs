//! Error types for the DDNS updater
//!
//! Every failure a run can hit maps onto one of these variants. The four
//! run-level kinds (`Resolution`, `List`, `Snapshot`, `Update`) are the ones
//! the engine turns into an [`Outcome::Error`](crate::Outcome::Error); the
//! rest describe lower-level causes and usually end up wrapped in one of them.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// The public IP could not be determined (primary and alternate failed)
    #[error("IP resolution error: {0}")]
    Resolution(String),

    /// Reading the current zone records failed
    #[error("Record listing error: {0}")]
    List(String),

    /// Creating the safety snapshot failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Writing a record failed
    #[error("Record update error: {0}")]
    Update(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors (IP output file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP errors (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found (domain, record, snapshot)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message, including the response body when there is one
        message: String,
    },
}

impl Error {
    /// Create an IP resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a record listing error
    pub fn list(msg: impl Into<String>) -> Self {
        Self::List(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a record update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status to an error
    ///
    /// `context` names the operation ("list records", "create snapshot", ...)
    /// and `body` is the provider's response body, kept for diagnostics.
    pub fn from_status(provider: &str, context: &str, status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::auth(format!(
                "{}: invalid API key or insufficient permissions (HTTP {}) - {}",
                context, status, body
            )),
            404 => Self::not_found(format!("{}: {}", context, body)),
            429 => Self::rate_limited(format!(
                "{}: retry later (HTTP {}) - {}",
                context, status, body
            )),
            500..=599 => Self::provider(
                provider,
                format!("{}: server error (transient) HTTP {} - {}", context, status, body),
            ),
            _ => Self::provider(
                provider,
                format!("{} failed: HTTP {} - {}", context, status, body),
            ),
        }
    }
}
