//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use marquee_config::ConfigError;
use marquee_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Requests ─────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(marquee::request_failed))]
    RequestFailed {
        message: String,
        status: Option<u16>,
    },

    #[error("Could not reach the backend: {message}")]
    #[diagnostic(
        code(marquee::connection_failed),
        help(
            "Check that the backend is running and the URLs are right.\n\
             Current profile: marquee config show"
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(
        code(marquee::not_authenticated),
        help("Run: marquee auth signin --email <email>")
    )]
    NotAuthenticated,

    #[error("Verification code required for {email}")]
    #[diagnostic(
        code(marquee::otp_required),
        help(
            "Check your email for the code, then run:\n\
             marquee auth verify --email {email} --otp <code>"
        )
    )]
    OtpRequired { email: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(marquee::missing_input))]
    MissingInput { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(marquee::validation))]
    Validation { field: String, reason: String },

    #[error("{what} must be given as a flag when stdin is not a terminal")]
    #[diagnostic(code(marquee::non_interactive))]
    NonInteractive { what: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(marquee::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: marquee config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(marquee::config))]
    Config(ConfigError),

    #[error("Session store error: {message}")]
    #[diagnostic(
        code(marquee::session),
        help("Sign out and back in with: marquee auth logout && marquee auth signin")
    )]
    Session { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(marquee::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(marquee::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotAuthenticated | Self::OtpRequired { .. } => exit_code::AUTH,
            Self::RequestFailed {
                status: Some(401 | 403),
                ..
            } => exit_code::AUTH,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::RequestFailed {
                status: Some(409), ..
            } => exit_code::CONFLICT,
            Self::MissingInput { .. } | Self::Validation { .. } | Self::NonInteractive { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => Self::MissingInput { message },
            // Transport failures carry no status and the generic message.
            CoreError::RequestFailed {
                message,
                status: None,
            } if message == marquee_core::error::UNEXPECTED_ERROR => {
                Self::ConnectionFailed { message }
            }
            CoreError::RequestFailed { message, status } => Self::RequestFailed { message, status },
            CoreError::NotAuthenticated => Self::NotAuthenticated,
            CoreError::Session { message } => Self::Session { message },
            CoreError::Config { message } => Self::Validation {
                field: "backend".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile(name) => {
                let available = marquee_config::load_config_or_default()
                    .profiles
                    .into_keys()
                    .collect::<Vec<_>>();
                Self::ProfileNotFound {
                    name,
                    available: join_or_none(available),
                }
            }
            other => Self::Config(other),
        }
    }
}

/// Sorted, comma-joined names, or "(none)".
pub fn join_or_none(mut names: Vec<String>) -> String {
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
