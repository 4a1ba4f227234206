// ── Backend facade ──
//
// The single entry point both front ends use. Wraps the raw client with
// the session context so a successful sign-in is persisted in one place,
// and turns API errors into display-ready `CoreError`s with the right
// fallback message for each call.

use std::sync::Arc;

use marquee_api::ShowtimeClient;
use secrecy::SecretString;
use tracing::{debug, info};

use crate::auth::{AuthBackend, AuthReply, AuthRequest};
use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::model::Theater;
use crate::session::{Session, SessionContext};

pub const MSG_THEATERS_FAILED: &str = "Failed to load theater data.";
pub const MSG_PHOTO_FAILED: &str = "Failed to fetch photo";

#[derive(Clone)]
pub struct Backend {
    client: Arc<ShowtimeClient>,
    session: SessionContext,
}

impl Backend {
    pub fn new(config: &BackendConfig, session: SessionContext) -> Result<Self, CoreError> {
        let client = ShowtimeClient::new(
            config.api_url.clone(),
            config.theaters_url.clone(),
            &config.transport(),
        )
        .map_err(|e| CoreError::Config {
            message: e.to_string(),
        })?;
        Ok(Self::from_client(client, session))
    }

    pub fn from_client(client: ShowtimeClient, session: SessionContext) -> Self {
        Self {
            client: Arc::new(client),
            session,
        }
    }

    pub fn client(&self) -> &ShowtimeClient {
        &self.client
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ── Account ──────────────────────────────────────────────────────

    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(), CoreError> {
        self.client
            .sign_up(username, email, password)
            .await
            .map_err(|e| CoreError::request_failed(e, "Failed to register."))?;
        info!(username, "account registered");
        Ok(())
    }

    /// Password sign-in. Stores the session unless an OTP is required.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthReply, CoreError> {
        const FALLBACK: &str = "Failed to sign in.";

        let reply = self
            .client
            .sign_in(email, password)
            .await
            .map_err(|e| CoreError::request_failed(e, FALLBACK))?;

        if reply.requires_otp {
            debug!("verification code required");
            return Ok(AuthReply::OtpRequired);
        }
        self.establish(reply.token, reply.username)
    }

    /// Finish an OTP sign-in and store the session.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthReply, CoreError> {
        const FALLBACK: &str = "Failed to verify OTP.";

        let reply = self
            .client
            .verify_otp(email, otp)
            .await
            .map_err(|e| CoreError::request_failed(e, FALLBACK))?;
        self.establish(reply.token, reply.username)
    }

    /// Record the session for an accepted sign-in. A reply without a token
    /// still signs the user in; token-gated calls just stay unavailable.
    fn establish(
        &self,
        token: Option<String>,
        username: Option<String>,
    ) -> Result<AuthReply, CoreError> {
        let session = match token.filter(|t| !t.is_empty()) {
            Some(token) => Session::new(token, username.clone()),
            None => {
                debug!("sign-in accepted without a session token");
                Session::without_token(username.clone())
            }
        };
        self.session.begin(session)?;
        info!(username = username.as_deref().unwrap_or("-"), "signed in");
        Ok(AuthReply::Authenticated { username })
    }

    /// Forget the stored session. The backend keeps no server-side state
    /// to revoke.
    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.session.end()?;
        info!("signed out");
        Ok(())
    }

    // ── Browse ───────────────────────────────────────────────────────

    pub async fn theaters(&self) -> Result<Vec<Theater>, CoreError> {
        let raw = self
            .client
            .list_theaters()
            .await
            .map_err(|e| CoreError::request_failed(e, MSG_THEATERS_FAILED))?;
        debug!(count = raw.len(), "theaters fetched");
        Ok(raw.into_iter().map(Theater::from).collect())
    }

    /// Profile picture URL of the signed-in user, if they have one.
    pub async fn profile_picture(&self) -> Result<Option<String>, CoreError> {
        let token = self.session.require_token()?;
        let reply = self
            .client
            .profile_photo(&token)
            .await
            .map_err(|e| CoreError::request_failed(e, MSG_PHOTO_FAILED))?;
        Ok(reply.profile_picture.filter(|url| !url.trim().is_empty()))
    }
}

impl AuthBackend for Backend {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthReply, CoreError> {
        match request {
            AuthRequest::SignUp {
                username,
                email,
                password,
            } => {
                self.sign_up(username, email, password).await?;
                Ok(AuthReply::Registered)
            }
            AuthRequest::SignIn { email, password } => self.sign_in(email, password).await,
            AuthRequest::VerifyOtp { email, otp } => self.verify_otp(email, otp).await,
        }
    }
}
