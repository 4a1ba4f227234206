// ── Runtime backend configuration ──
//
// Describes *where* the backend lives and how to reach it. Never touches
// disk: the CLI/TUI build a `BackendConfig` from their profile and hand it
// to `Backend::new`.

use std::time::Duration;

use marquee_api::{TlsMode, TransportConfig};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_THEATERS_URL: &str = "http://127.0.0.1:5000/api/theaters";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL for the account endpoints (`/api/signin`, `/api/photo`, ...).
    pub api_url: Url,
    /// Absolute URL of the theater listing.
    pub theaters_url: Url,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Config with system TLS and a 30 second timeout.
    pub fn new(api_url: Url, theaters_url: Url) -> Self {
        Self {
            api_url,
            theaters_url,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar()
    }
}
