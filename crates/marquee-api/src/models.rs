// Wire types for the showtime backend.
//
// These mirror the JSON exactly as the backend sends it, sentinel strings
// included. `marquee-core` converts them into domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A theater as returned by the theaters endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTheater {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub movies: Vec<RawMovie>,
}

/// A movie listing nested inside a [`RawTheater`].
///
/// `rating` may be `"N/A"`; `showtimes` may be `"N/A"` or
/// `"No showtimes available on IMDb."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMovie {
    pub title: String,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub showtimes: Option<String>,
    pub imdb_id: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// `GET /api/theaters` response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct TheatersEnvelope {
    #[serde(default)]
    pub theaters: Vec<RawTheater>,
}

/// `POST /api/signup` success body. The backend's success payload is
/// opaque; only an optional message is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/signin` success body.
#[derive(Clone, Default, Deserialize)]
pub struct SignInReply {
    #[serde(rename = "requiresOTP", default)]
    pub requires_otp: bool,
    #[serde(default)]
    pub username: Option<String>,
    /// Session token, either from the body or from the `authToken` cookie.
    #[serde(default)]
    pub token: Option<String>,
}

/// `POST /api/verify-otp` success body.
#[derive(Clone, Default, Deserialize)]
pub struct VerifyOtpReply {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /api/photo` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoReply {
    #[serde(rename = "profilePicture", default)]
    pub profile_picture: Option<String>,
}

/// Error body shape shared by every endpoint: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

fn redact(token: Option<&String>) -> &'static str {
    if token.is_some() { "Some(****)" } else { "None" }
}

impl fmt::Debug for SignInReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInReply")
            .field("requires_otp", &self.requires_otp)
            .field("username", &self.username)
            .field("token", &redact(self.token.as_ref()))
            .finish()
    }
}

impl fmt::Debug for VerifyOtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOtpReply")
            .field("username", &self.username)
            .field("token", &redact(self.token.as_ref()))
            .finish()
    }
}
