// ── API-to-domain type conversions ──
//
// Bridges raw `marquee_api` records into `marquee_core::model` types.
// Placeholder strings become explicit variants; blank optional strings
// become `None`.

use marquee_api::{RawMovie, RawTheater};

use crate::model::{Movie, Rating, Showtimes, Theater};

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

impl From<RawMovie> for Movie {
    fn from(raw: RawMovie) -> Self {
        Self {
            title: raw.title,
            rating: Rating::from_wire(raw.rating.as_deref()),
            showtimes: Showtimes::from_wire(raw.showtimes.as_deref()),
            imdb_id: raw.imdb_id,
            image: non_blank(raw.image),
        }
    }
}

impl From<RawTheater> for Theater {
    fn from(raw: RawTheater) -> Self {
        Self {
            name: raw.name,
            address: raw.address,
            movies: raw.movies.into_iter().map(Movie::from).collect(),
        }
    }
}
