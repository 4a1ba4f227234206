// Account authentication endpoints
//
// Registration, password sign-in and one-time-passcode verification.
// The backend may return the session token in the JSON body (`token`)
// or set it as the `authToken` cookie; both are surfaced through the
// reply's `token` field.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{AUTH_COOKIE, ShowtimeClient};
use crate::error::Error;
use crate::models::{SignInReply, SignUpReply, VerifyOtpReply};

impl ShowtimeClient {
    /// Register a new account: `POST /api/signup`.
    ///
    /// Registration never authenticates; the caller still has to sign in.
    /// The success payload is opaque, so a body that is empty or not JSON
    /// is accepted.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SignUpReply, Error> {
        let url = self.endpoint("/api/signup")?;
        let body = json!({
            "username": username,
            "email": email,
            "password": password.expose_secret(),
        });

        let raw = self.post_raw(url, &body).await?;
        debug!("registration accepted");
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    /// Sign in with email and password: `POST /api/signin`.
    ///
    /// When `requires_otp` is set the caller must follow up with
    /// [`verify_otp`](Self::verify_otp); no session exists yet.
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<SignInReply, Error> {
        let url = self.endpoint("/api/signin")?;
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let mut reply: SignInReply = self.post(url, &body).await?;
        if !reply.requires_otp && reply.token.is_none() {
            reply.token = self.cookie_value(AUTH_COOKIE);
        }

        debug!(requires_otp = reply.requires_otp, "sign-in accepted");
        Ok(reply)
    }

    /// Submit the emailed verification code: `POST /api/verify-otp`.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<VerifyOtpReply, Error> {
        let url = self.endpoint("/api/verify-otp")?;
        let body = json!({
            "email": email,
            "otp": otp,
        });

        let mut reply: VerifyOtpReply = self.post(url, &body).await?;
        if reply.token.is_none() {
            reply.token = self.cookie_value(AUTH_COOKIE);
        }

        debug!("verification code accepted");
        Ok(reply)
    }
}
