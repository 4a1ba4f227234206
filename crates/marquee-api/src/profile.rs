// Profile endpoints

use secrecy::{ExposeSecret, SecretString};

use crate::client::ShowtimeClient;
use crate::error::Error;
use crate::models::PhotoReply;

impl ShowtimeClient {
    /// Fetch the signed-in user's profile picture URL: `GET /api/photo`.
    ///
    /// Requires the session token as a bearer header.
    pub async fn profile_photo(&self, token: &SecretString) -> Result<PhotoReply, Error> {
        let url = self.endpoint("/api/photo")?;
        self.get(url, Some(token.expose_secret())).await
    }
}
