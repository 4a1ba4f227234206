// ── Auth mode state machine ──
//
// Sign In, Register and Verify OTP as one flow. The flow owns the form
// buffers and the error line; it validates locally, builds a request, and
// folds the backend's answer into the next mode. Network I/O lives behind
// `AuthBackend` so the flow can be driven from a TUI task, a CLI command or
// a test double alike.

use std::fmt;
use std::future::Future;

use secrecy::SecretString;
use strum::Display;

use crate::error::CoreError;

pub const MSG_ALL_FIELDS_REQUIRED: &str = "All fields are required.";
pub const MSG_EMAIL_PASSWORD_REQUIRED: &str = "Email and password are required.";
pub const MSG_CODE_REQUIRED: &str = "Verification code is required.";

pub const NOTICE_REGISTERED: &str = "User registered successfully!";
pub const NOTICE_CHECK_EMAIL: &str = "Please check your email for the verification code.";

/// Which form the auth screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum AuthMode {
    #[default]
    #[strum(to_string = "Sign In")]
    SignIn,
    #[strum(to_string = "Register")]
    Register,
    #[strum(to_string = "Verify OTP")]
    VerifyOtp,
}

/// A validated request ready to send.
#[derive(Debug, Clone)]
pub enum AuthRequest {
    SignUp {
        username: String,
        email: String,
        password: SecretString,
    },
    SignIn {
        email: String,
        password: SecretString,
    },
    VerifyOtp {
        email: String,
        otp: String,
    },
}

impl AuthRequest {
    pub fn email(&self) -> &str {
        match self {
            Self::SignUp { email, .. } | Self::SignIn { email, .. } | Self::VerifyOtp { email, .. } => {
                email
            }
        }
    }

    /// Message shown when the backend fails without saying why.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            Self::SignUp { .. } => "Failed to register.",
            Self::SignIn { .. } => "Failed to sign in.",
            Self::VerifyOtp { .. } => "Failed to verify OTP.",
        }
    }
}

/// What the backend said about a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthReply {
    Registered,
    OtpRequired,
    /// Sign-in finished; the session has already been stored.
    Authenticated { username: Option<String> },
}

/// Outcome of one submit, for the front end to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStep {
    AwaitingOtp,
    Registered,
    Authenticated { username: String },
    Failed { message: String },
}

impl AuthStep {
    /// One-line notice matching the step, if it warrants one.
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::AwaitingOtp => Some(NOTICE_CHECK_EMAIL.to_owned()),
            Self::Registered => Some(NOTICE_REGISTERED.to_owned()),
            Self::Authenticated { username } => Some(format!("Welcome back, {username}!")),
            Self::Failed { .. } => None,
        }
    }
}

/// Sends auth requests. Implemented by [`crate::Backend`].
pub trait AuthBackend {
    fn authenticate(
        &self,
        request: &AuthRequest,
    ) -> impl Future<Output = Result<AuthReply, CoreError>> + Send;
}

/// Form state for the auth screen.
#[derive(Default)]
pub struct AuthFlow {
    mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub otp: String,
    error: Option<String>,
}

impl fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthFlow")
            .field("mode", &self.mode)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("otp", &"[REDACTED]")
            .field("error", &self.error)
            .finish()
    }
}

impl AuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flow already in the OTP step for `email`, for finishing a sign-in
    /// that started elsewhere (another process, an earlier run).
    pub fn awaiting_otp(email: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::VerifyOtp,
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Switch between Sign In and Register. Clears the error and the OTP
    /// buffer. Returns `false` (and does nothing) while verifying an OTP.
    pub fn toggle(&mut self) -> bool {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::Register,
            AuthMode::Register => AuthMode::SignIn,
            AuthMode::VerifyOtp => return false,
        };
        self.error = None;
        self.otp.clear();
        true
    }

    /// Validate the buffers for the current mode.
    ///
    /// On failure the error line is set and `None` is returned; nothing
    /// should be sent.
    pub fn prepare(&mut self) -> Option<AuthRequest> {
        let request = match self.mode {
            AuthMode::Register => {
                if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
                    return self.reject(MSG_ALL_FIELDS_REQUIRED);
                }
                AuthRequest::SignUp {
                    username: self.username.clone(),
                    email: self.email.clone(),
                    password: SecretString::from(self.password.clone()),
                }
            }
            AuthMode::SignIn => {
                if self.email.is_empty() || self.password.is_empty() {
                    return self.reject(MSG_EMAIL_PASSWORD_REQUIRED);
                }
                AuthRequest::SignIn {
                    email: self.email.clone(),
                    password: SecretString::from(self.password.clone()),
                }
            }
            AuthMode::VerifyOtp => {
                if self.otp.is_empty() {
                    return self.reject(MSG_CODE_REQUIRED);
                }
                AuthRequest::VerifyOtp {
                    email: self.email.clone(),
                    otp: self.otp.clone(),
                }
            }
        };
        Some(request)
    }

    fn reject(&mut self, message: &str) -> Option<AuthRequest> {
        self.error = Some(message.to_owned());
        None
    }

    /// Fold a backend result into the flow.
    pub fn complete(
        &mut self,
        request: &AuthRequest,
        result: Result<AuthReply, CoreError>,
    ) -> AuthStep {
        match result {
            Err(err) => {
                let message = err.to_string();
                self.error = Some(message.clone());
                AuthStep::Failed { message }
            }
            Ok(AuthReply::Registered) => {
                self.error = None;
                self.mode = AuthMode::SignIn;
                AuthStep::Registered
            }
            Ok(AuthReply::OtpRequired) => {
                self.error = None;
                self.mode = AuthMode::VerifyOtp;
                AuthStep::AwaitingOtp
            }
            Ok(AuthReply::Authenticated { username }) => {
                self.error = None;
                self.password.clear();
                self.otp.clear();
                AuthStep::Authenticated {
                    username: username.unwrap_or_else(|| request.email().to_owned()),
                }
            }
        }
    }

    /// Validate, send through `backend`, and apply the result.
    ///
    /// Returns `None` when validation failed and nothing was sent.
    pub async fn submit(&mut self, backend: &(impl AuthBackend + Sync)) -> Option<AuthStep> {
        let request = self.prepare()?;
        let result = backend.authenticate(&request).await;
        Some(self.complete(&request, result))
    }
}
