// ── Movie detail route ──

use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

use crate::model::{Movie, Showtimes};

const IMDB_TITLE_BASE: &str = "https://www.imdb.com/title";

/// Navigation parameters for a movie detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRoute {
    pub imdb_id: String,
    pub showtimes: Showtimes,
}

impl MovieRoute {
    pub fn for_movie(movie: &Movie) -> Self {
        Self {
            imdb_id: movie.imdb_id.clone(),
            showtimes: movie.showtimes.clone(),
        }
    }

    /// `/{imdb_id}?showtimes=...`. The query is omitted when no showtimes
    /// are listed.
    pub fn path(&self) -> String {
        match self.showtimes.as_str() {
            Some(times) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("showtimes", times)
                    .finish();
                format!("/{}?{query}", self.imdb_id)
            }
            None => format!("/{}", self.imdb_id),
        }
    }

    pub fn imdb_url(&self) -> String {
        format!("{IMDB_TITLE_BASE}/{}/", self.imdb_id)
    }
}

impl fmt::Display for MovieRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rating;

    fn movie(showtimes: Showtimes) -> Movie {
        Movie {
            title: "Conclave".into(),
            rating: Rating::Rated("7.4".into()),
            showtimes,
            imdb_id: "tt20215234".into(),
            image: None,
        }
    }

    #[test]
    fn path_encodes_showtimes() {
        let route = MovieRoute::for_movie(&movie(Showtimes::Listed("7:00 PM, 9:30 PM".into())));
        assert_eq!(
            route.path(),
            "/tt20215234?showtimes=7%3A00+PM%2C+9%3A30+PM"
        );
    }

    #[test]
    fn path_without_showtimes() {
        let route = MovieRoute::for_movie(&movie(Showtimes::Unlisted));
        assert_eq!(route.to_string(), "/tt20215234");
    }

    #[test]
    fn imdb_url() {
        let route = MovieRoute::for_movie(&movie(Showtimes::Unlisted));
        assert_eq!(route.imdb_url(), "https://www.imdb.com/title/tt20215234/");
    }
}
