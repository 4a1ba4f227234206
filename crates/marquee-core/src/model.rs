// ── Domain model ──
//
// Flat display records for theaters and the movies they show. The wire
// format encodes "no value" with placeholder strings; those are decoded
// into explicit variants at the conversion boundary (see `convert`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire placeholder for a missing rating or showtime listing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Wire placeholder the scraper emits when IMDb lists no showtimes.
pub const NO_SHOWTIMES_ON_IMDB: &str = "No showtimes available on IMDb.";

/// A venue and the movies it is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theater {
    /// Display name. Unique within a single fetch.
    pub name: String,
    pub address: String,
    pub movies: Vec<Movie>,
}

impl Theater {
    pub fn has_movies(&self) -> bool {
        !self.movies.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub rating: Rating,
    pub showtimes: Showtimes,
    /// IMDb title identifier (e.g. `tt15239678`).
    pub imdb_id: String,
    /// Poster image URL.
    pub image: Option<String>,
}

// ── Rating ──────────────────────────────────────────────────────────

/// Audience rating as reported by the listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Rating {
    Unrated,
    Rated(String),
}

impl Rating {
    /// Decode a wire value. Missing, blank and `"N/A"` are all unrated.
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | NOT_AVAILABLE) => Self::Unrated,
            Some(value) => Self::Rated(value.to_owned()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Unrated => None,
            Self::Rated(value) => Some(value),
        }
    }

    pub fn label(&self) -> &str {
        self.as_str().unwrap_or("Not Rated")
    }
}

impl From<Option<String>> for Rating {
    fn from(raw: Option<String>) -> Self {
        Self::from_wire(raw.as_deref())
    }
}

impl From<Rating> for Option<String> {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Unrated => None,
            Rating::Rated(value) => Some(value),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Showtimes ───────────────────────────────────────────────────────

/// Free-form showtime listing for one movie at one theater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Showtimes {
    Unlisted,
    Listed(String),
}

impl Showtimes {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | NOT_AVAILABLE | NO_SHOWTIMES_ON_IMDB) => Self::Unlisted,
            Some(value) => Self::Listed(value.to_owned()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Unlisted => None,
            Self::Listed(value) => Some(value),
        }
    }

    pub fn label(&self) -> &str {
        self.as_str().unwrap_or("No showtimes listed")
    }

    /// Individual times, split on commas. Empty when unlisted.
    pub fn times(&self) -> Vec<&str> {
        self.as_str()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Option<String>> for Showtimes {
    fn from(raw: Option<String>) -> Self {
        Self::from_wire(raw.as_deref())
    }
}

impl From<Showtimes> for Option<String> {
    fn from(showtimes: Showtimes) -> Self {
        match showtimes {
            Showtimes::Unlisted => None,
            Showtimes::Listed(value) => Some(value),
        }
    }
}

impl fmt::Display for Showtimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rating_sentinels_decode_to_unrated() {
        assert_eq!(Rating::from_wire(None), Rating::Unrated);
        assert_eq!(Rating::from_wire(Some("")), Rating::Unrated);
        assert_eq!(Rating::from_wire(Some("N/A")), Rating::Unrated);
        assert_eq!(Rating::from_wire(Some("7.9")), Rating::Rated("7.9".into()));
    }

    #[test]
    fn showtimes_sentinels_decode_to_unlisted() {
        assert_eq!(Showtimes::from_wire(Some("N/A")), Showtimes::Unlisted);
        assert_eq!(
            Showtimes::from_wire(Some("No showtimes available on IMDb.")),
            Showtimes::Unlisted
        );
        assert_eq!(Showtimes::from_wire(Some("   ")), Showtimes::Unlisted);
    }

    #[test]
    fn labels_fall_back_to_display_text() {
        assert_eq!(Rating::Unrated.label(), "Not Rated");
        assert_eq!(Showtimes::Unlisted.label(), "No showtimes listed");
        assert_eq!(Rating::Rated("PG-13".into()).to_string(), "PG-13");
    }

    #[test]
    fn showtimes_split_into_times() {
        let s = Showtimes::Listed("7:00 PM, 9:30 PM,".into());
        assert_eq!(s.times(), vec!["7:00 PM", "9:30 PM"]);
        assert!(Showtimes::Unlisted.times().is_empty());
    }

    #[test]
    fn serde_uses_plain_optional_strings() {
        let movie = Movie {
            title: "Anora".into(),
            rating: Rating::Unrated,
            showtimes: Showtimes::Listed("8:15 PM".into()),
            imdb_id: "tt28607951".into(),
            image: None,
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert!(json["rating"].is_null());
        assert_eq!(json["showtimes"], "8:15 PM");

        let back: Movie = serde_json::from_value(json).unwrap();
        assert_eq!(back, movie);
    }
}
