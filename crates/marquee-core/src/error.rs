// ── Core error types ──
//
// User-facing errors from marquee-core. Front ends print these as-is, so
// every variant carries a sentence a user can act on. Transport details go
// to the log, not the message.

use thiserror::Error;

/// Shown when a request fails without any response from the backend.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Local validation failed before any request was sent.
    #[error("{message}")]
    Validation { message: String },

    /// A backend request failed. `message` is ready for display.
    #[error("{message}")]
    RequestFailed {
        message: String,
        status: Option<u16>,
    },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Session storage error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Map an API error to a display message.
    ///
    /// The server's `message` wins when it sent one; a response without one
    /// gets `fallback`; a failure with no response at all gets
    /// [`UNEXPECTED_ERROR`].
    pub fn request_failed(err: marquee_api::Error, fallback: &str) -> Self {
        let status = err.status();
        let message = match (&err, err.server_message()) {
            (_, Some(msg)) => msg.to_owned(),
            (marquee_api::Error::Transport(_) | marquee_api::Error::Tls(_), None) => {
                tracing::warn!(error = %err, "request failed without a response");
                UNEXPECTED_ERROR.to_owned()
            }
            (_, None) => {
                tracing::debug!(error = %err, "request failed");
                fallback.to_owned()
            }
        };
        Self::RequestFailed { message, status }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
            || matches!(self, Self::RequestFailed { status: Some(401), .. })
    }
}

impl From<marquee_api::Error> for CoreError {
    fn from(err: marquee_api::Error) -> Self {
        Self::request_failed(err, UNEXPECTED_ERROR)
    }
}
