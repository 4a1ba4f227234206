// Showtime API HTTP client
//
// Wraps `reqwest::Client` with URL construction, status handling and
// `{ message }` error-body extraction. Endpoint groups (auth, theaters,
// profile) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Cookie name the backend uses when it hands the session token back
/// as a cookie instead of in the response body.
pub const AUTH_COOKIE: &str = "authToken";

/// Raw HTTP client for the showtime backend.
///
/// Account endpoints (`/api/signup`, `/api/signin`, `/api/verify-otp`,
/// `/api/photo`) are resolved against `api_url`; the theater listing lives
/// at its own absolute `theaters_url`, which is typically a different
/// service.
pub struct ShowtimeClient {
    http: reqwest::Client,
    api_url: Url,
    theaters_url: Url,
    /// Cookie jar reference for extracting a cookie-borne session token.
    cookie_jar: Option<Arc<Jar>>,
}

impl ShowtimeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// A cookie jar is always attached so a token delivered via
    /// `Set-Cookie` can be recovered after sign-in.
    pub fn new(api_url: Url, theaters_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            api_url,
            theaters_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, api_url: Url, theaters_url: Url) -> Self {
        Self {
            http,
            api_url,
            theaters_url,
            cookie_jar: None,
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Base URL for account endpoints.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Absolute URL of the theater listing.
    pub fn theaters_url(&self) -> &Url {
        &self.theaters_url
    }

    /// Read a cookie the backend set for `api_url`, if any.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let header = jar.cookies(&self.api_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_owned())
        })
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an account endpoint: `{api_url}/{path}`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request, optionally with a bearer token, and decode the
    /// JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: Option<&str>,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let mut request = self.http.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await.map_err(Error::Transport)?;
        let body = Self::read_body(resp).await?;
        Self::decode(&body)
    }

    /// Send a POST request with a JSON body and return the raw success body.
    pub(crate) async fn post_raw(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::read_body(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON reply.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let body = self.post_raw(url, body).await?;
        Self::decode(&body)
    }

    /// Check the status and return the body text.
    ///
    /// Non-success statuses become `Error::Api` (or `Error::Unauthorized`
    /// for 401), carrying the body's `message` field when present.
    async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(%status, len = body.len(), "response received");

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized { message });
        }

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.to_owned(),
            }
        })
    }
}
