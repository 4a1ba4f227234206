// Theater listing endpoint

use crate::client::ShowtimeClient;
use crate::error::Error;
use crate::models::{RawTheater, TheatersEnvelope};

impl ShowtimeClient {
    /// Fetch every theater with its nested movie listing.
    ///
    /// Unauthenticated. A missing `theaters` key decodes as an empty list.
    pub async fn list_theaters(&self) -> Result<Vec<RawTheater>, Error> {
        let envelope: TheatersEnvelope = self.get(self.theaters_url().clone(), None).await?;
        Ok(envelope.theaters)
    }
}
