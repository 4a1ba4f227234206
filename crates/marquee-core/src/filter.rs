// ── Theater/movie filter ──
//
// Pure functions over a fetched theater list. The browse screens keep the
// full list and re-derive the visible subset on every input change, so
// nothing here mutates its input.

use std::fmt;

use crate::model::{Movie, Theater};

/// Label shown for [`TheaterSelection::All`] in selectors.
pub const ALL_THEATERS: &str = "All Theaters";

/// Which theater the browse view is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TheaterSelection {
    #[default]
    All,
    /// Exact (case-sensitive) theater name.
    Named(String),
}

impl TheaterSelection {
    pub fn matches(&self, theater: &Theater) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => theater.name == *name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_THEATERS,
            Self::Named(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Next option in `[All, names...]`, wrapping around.
    ///
    /// A named selection that is no longer in `names` is treated as `All`.
    pub fn cycle_next(&self, names: &[String]) -> Self {
        let len = names.len() + 1;
        Self::option_at(names, (self.position(names) + 1) % len)
    }

    /// Previous option in `[All, names...]`, wrapping around.
    pub fn cycle_prev(&self, names: &[String]) -> Self {
        let len = names.len() + 1;
        Self::option_at(names, (self.position(names) + len - 1) % len)
    }

    fn position(&self, names: &[String]) -> usize {
        match self {
            Self::All => 0,
            Self::Named(name) => names
                .iter()
                .position(|n| n == name)
                .map_or(0, |idx| idx + 1),
        }
    }

    fn option_at(names: &[String], index: usize) -> Self {
        match index.checked_sub(1).and_then(|i| names.get(i)) {
            Some(name) => Self::Named(name.clone()),
            None => Self::All,
        }
    }
}

impl fmt::Display for TheaterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Option<String>> for TheaterSelection {
    fn from(name: Option<String>) -> Self {
        name.map_or(Self::All, Self::Named)
    }
}

/// Theater names for a selector, in input order, without duplicates.
pub fn theater_names(theaters: &[Theater]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(theaters.len());
    for theater in theaters {
        if !names.contains(&theater.name) {
            names.push(theater.name.clone());
        }
    }
    names
}

fn title_matches(movie: &Movie, needle: &str) -> bool {
    movie.title.to_lowercase().contains(needle)
}

/// Derive the visible theaters for a search query and theater selection.
///
/// Movies are kept when their title contains `search_query`
/// case-insensitively. Theaters left without movies are dropped, as are
/// theaters not matching `selection`. Input order is preserved.
///
/// With an empty query and [`TheaterSelection::All`] the input comes back
/// unchanged, including theaters that list no movies.
pub fn filter_theaters(
    theaters: &[Theater],
    search_query: &str,
    selection: &TheaterSelection,
) -> Vec<Theater> {
    if search_query.is_empty() && selection.is_all() {
        return theaters.to_vec();
    }

    let needle = search_query.to_lowercase();
    theaters
        .iter()
        .filter(|theater| selection.matches(theater))
        .filter_map(|theater| {
            let movies: Vec<Movie> = theater
                .movies
                .iter()
                .filter(|movie| title_matches(movie, &needle))
                .cloned()
                .collect();
            (!movies.is_empty()).then(|| Theater {
                name: theater.name.clone(),
                address: theater.address.clone(),
                movies,
            })
        })
        .collect()
}

// ── View state ──────────────────────────────────────────────────────

/// Search text plus theater selection owned by a browse view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseFilter {
    pub search_query: String,
    pub selection: TheaterSelection,
}

impl BrowseFilter {
    pub fn new(search_query: impl Into<String>, selection: TheaterSelection) -> Self {
        Self {
            search_query: search_query.into(),
            selection,
        }
    }

    /// Whether applying this filter can change the list.
    pub fn is_active(&self) -> bool {
        !self.search_query.is_empty() || !self.selection.is_all()
    }

    pub fn apply(&self, theaters: &[Theater]) -> Vec<Theater> {
        filter_theaters(theaters, &self.search_query, &self.selection)
    }

    pub fn clear(&mut self) {
        self.search_query.clear();
        self.selection = TheaterSelection::All;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rating, Showtimes};
    use pretty_assertions::assert_eq;

    fn movie(title: &str) -> Movie {
        Movie {
            title: title.into(),
            rating: Rating::Unrated,
            showtimes: Showtimes::Unlisted,
            imdb_id: format!("tt-{}", title.to_lowercase().replace(' ', "-")),
            image: None,
        }
    }

    fn theater(name: &str, titles: &[&str]) -> Theater {
        Theater {
            name: name.into(),
            address: format!("{name} address"),
            movies: titles.iter().copied().map(movie).collect(),
        }
    }

    fn fixture() -> Vec<Theater> {
        vec![
            theater("Regal", &["Dune", "Wicked"]),
            theater("AMC", &["Dune: Part Two", "Moana 2"]),
            theater("Bruin", &[]),
        ]
    }

    fn names(theaters: &[Theater]) -> Vec<&str> {
        theaters.iter().map(|t| t.name.as_str()).collect()
    }

    fn titles(theater: &Theater) -> Vec<&str> {
        theater.movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn short_circuit_returns_input_including_empty_theaters() {
        let input = fixture();
        let out = filter_theaters(&input, "", &TheaterSelection::All);
        assert_eq!(out, input);
    }

    #[test]
    fn search_is_case_insensitive_and_drops_empty_theaters() {
        let out = filter_theaters(&fixture(), "dUnE", &TheaterSelection::All);
        assert_eq!(names(&out), vec!["Regal", "AMC"]);
        assert_eq!(titles(&out[0]), vec!["Dune"]);
        assert_eq!(titles(&out[1]), vec!["Dune: Part Two"]);
    }

    #[test]
    fn named_selection_restricts_to_exact_name() {
        let selection = TheaterSelection::Named("AMC".into());
        let out = filter_theaters(&fixture(), "", &selection);
        assert_eq!(names(&out), vec!["AMC"]);
        assert_eq!(titles(&out[0]), vec!["Dune: Part Two", "Moana 2"]);
    }

    #[test]
    fn named_selection_with_no_matching_movies_is_empty() {
        let selection = TheaterSelection::Named("Regal".into());
        assert!(filter_theaters(&fixture(), "moana", &selection).is_empty());
    }

    #[test]
    fn named_selection_is_case_sensitive() {
        let selection = TheaterSelection::Named("amc".into());
        assert!(filter_theaters(&fixture(), "", &selection).is_empty());
    }

    #[test]
    fn named_selection_drops_zero_movie_theater() {
        let selection = TheaterSelection::Named("Bruin".into());
        assert!(filter_theaters(&fixture(), "", &selection).is_empty());
    }

    #[test]
    fn unmatched_query_yields_empty() {
        assert!(filter_theaters(&fixture(), "zzz", &TheaterSelection::All).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_theaters(&[], "dune", &TheaterSelection::All).is_empty());
        assert!(filter_theaters(&[], "", &TheaterSelection::All).is_empty());
    }

    #[test]
    fn whitespace_query_is_not_short_circuited() {
        let out = filter_theaters(&fixture(), " ", &TheaterSelection::All);
        // "Dune: Part Two" and "Moana 2" contain a space; "Dune" and "Wicked" do not.
        assert_eq!(names(&out), vec!["AMC"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let input = fixture();
        let before = input.clone();
        let _ = filter_theaters(&input, "wick", &TheaterSelection::Named("Regal".into()));
        assert_eq!(input, before);
    }

    #[test]
    fn filtering_is_idempotent() {
        let input = fixture();
        let cases = [
            ("", TheaterSelection::All),
            ("dune", TheaterSelection::All),
            ("", TheaterSelection::Named("Regal".into())),
            ("a", TheaterSelection::Named("AMC".into())),
            ("nothing", TheaterSelection::Named("Nowhere".into())),
        ];
        for (query, selection) in cases {
            let once = filter_theaters(&input, query, &selection);
            let twice = filter_theaters(&once, query, &selection);
            assert_eq!(once, twice, "query={query:?} selection={selection:?}");
        }
    }

    #[test]
    fn output_movies_are_subsequences_of_input() {
        let input = fixture();
        for query in ["", "d", "o", "wicked", "2"] {
            let out = filter_theaters(&input, query, &TheaterSelection::All);
            for theater in &out {
                let source = input
                    .iter()
                    .find(|t| t.name == theater.name)
                    .map(titles)
                    .unwrap_or_default();
                let mut remaining = source.iter();
                for title in titles(theater) {
                    assert!(
                        remaining.any(|t| *t == title),
                        "{title} out of order for query {query:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn theater_names_in_order_without_duplicates() {
        let mut input = fixture();
        input.push(theater("Regal", &["Other"]));
        assert_eq!(theater_names(&input), vec!["Regal", "AMC", "Bruin"]);
    }

    #[test]
    fn selection_cycles_through_all_first() {
        let names = vec!["Regal".to_string(), "AMC".to_string()];
        let mut sel = TheaterSelection::All;
        sel = sel.cycle_next(&names);
        assert_eq!(sel, TheaterSelection::Named("Regal".into()));
        sel = sel.cycle_next(&names);
        assert_eq!(sel, TheaterSelection::Named("AMC".into()));
        sel = sel.cycle_next(&names);
        assert_eq!(sel, TheaterSelection::All);
        sel = sel.cycle_prev(&names);
        assert_eq!(sel, TheaterSelection::Named("AMC".into()));
    }

    #[test]
    fn stale_selection_cycles_from_all() {
        let names = vec!["Regal".to_string()];
        let sel = TheaterSelection::Named("Gone".into());
        assert_eq!(sel.cycle_next(&names), TheaterSelection::Named("Regal".into()));
        assert_eq!(TheaterSelection::All.cycle_next(&[]), TheaterSelection::All);
    }

    #[test]
    fn browse_filter_activity_and_clear() {
        let mut filter = BrowseFilter::default();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&fixture()).len(), 3);

        filter.search_query = "moana".into();
        assert!(filter.is_active());
        assert_eq!(names(&filter.apply(&fixture())), vec!["AMC"]);

        filter.clear();
        assert_eq!(filter, BrowseFilter::default());
    }

    #[test]
    fn selection_label() {
        assert_eq!(TheaterSelection::All.to_string(), "All Theaters");
        assert_eq!(TheaterSelection::from(Some("AMC".to_string())).label(), "AMC");
    }
}
