//! Theater listing handler.

use serde::Serialize;
use tabled::Tabled;

use marquee_core::{
    Backend, BrowseFilter, MovieRoute, Rating, Showtimes, Theater, TheaterSelection, theater_names,
};

use crate::cli::{GlobalOpts, OutputFormat, TheatersArgs};
use crate::error::{CliError, join_or_none};
use crate::output;

use super::util;

// ── Row types ────────────────────────────────────────────────────────

/// One movie at one theater, flattened for display and structured output.
#[derive(Debug, Serialize)]
struct Listing {
    theater: String,
    address: String,
    title: String,
    rating: Rating,
    showtimes: Showtimes,
    imdb_id: String,
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<String>,
}

#[derive(Tabled)]
struct ListingRow {
    #[tabled(rename = "Theater")]
    theater: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Showtimes")]
    showtimes: String,
}

#[derive(Tabled)]
struct RoutedRow {
    #[tabled(rename = "Theater")]
    theater: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Route")]
    route: String,
}

#[derive(Debug, Serialize)]
struct TheaterName {
    name: String,
    address: String,
    movies: usize,
}

#[derive(Tabled)]
struct TheaterNameRow {
    #[tabled(rename = "Theater")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Movies")]
    movies: usize,
}

// ── Flattening ───────────────────────────────────────────────────────

/// Flatten filtered theaters into listings. Theaters with no movies are
/// left out here even when the filter kept them.
fn listings(theaters: &[Theater], with_routes: bool) -> Vec<Listing> {
    theaters
        .iter()
        .filter(|t| t.has_movies())
        .flat_map(|theater| {
            theater.movies.iter().map(move |movie| Listing {
                theater: theater.name.clone(),
                address: theater.address.clone(),
                title: movie.title.clone(),
                rating: movie.rating.clone(),
                showtimes: movie.showtimes.clone(),
                imdb_id: movie.imdb_id.clone(),
                image: movie.image.clone(),
                route: with_routes.then(|| MovieRoute::for_movie(movie).path()),
            })
        })
        .collect()
}

fn listing_row(l: &Listing) -> ListingRow {
    ListingRow {
        theater: l.theater.clone(),
        title: l.title.clone(),
        rating: l.rating.label().to_owned(),
        showtimes: l.showtimes.label().to_owned(),
    }
}

fn routed_row(l: &Listing) -> RoutedRow {
    RoutedRow {
        theater: l.theater.clone(),
        title: l.title.clone(),
        route: l.route.clone().unwrap_or_default(),
    }
}

/// The `--theater` name when it matches nothing in the listing.
///
/// Such a selection is not an error; it simply filters everything out.
fn unknown_theater<'a>(selection: &'a TheaterSelection, names: &[String]) -> Option<&'a str> {
    match selection {
        TheaterSelection::Named(name) if !names.contains(name) => Some(name),
        _ => None,
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    args: TheatersArgs,
    backend: &Backend,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let theaters =
        util::with_spinner("Loading theaters…", global.quiet, backend.theaters()).await?;

    if args.names {
        let names: Vec<TheaterName> = theaters
            .iter()
            .filter(|t| t.has_movies())
            .map(|t| TheaterName {
                name: t.name.clone(),
                address: t.address.clone(),
                movies: t.movies.len(),
            })
            .collect();
        let out = output::render_list(
            &global.output,
            &names,
            |t| TheaterNameRow {
                name: t.name.clone(),
                address: t.address.clone(),
                movies: t.movies,
            },
            |t| t.name.clone(),
        )?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let names = theater_names(&theaters);
    let filter = BrowseFilter::new(
        args.search.unwrap_or_default(),
        TheaterSelection::from(args.theater),
    );
    let visible = filter.apply(&theaters);
    tracing::debug!(
        total = theaters.len(),
        visible = visible.len(),
        filtered = filter.is_active(),
        "theaters filtered"
    );

    let data = listings(&visible, args.routes);
    if data.is_empty() {
        if !global.quiet {
            let color = output::should_color(&global.color);
            output::hint("No movies found.", color);
            if let Some(name) = unknown_theater(&filter.selection, &names) {
                output::hint(
                    &format!(
                        "No theater named '{name}'. Available theaters: {}",
                        join_or_none(names.clone())
                    ),
                    color,
                );
            }
        }
        // Scripts reading structured output still get an (empty) listing.
        if matches!(global.output, OutputFormat::Table | OutputFormat::Plain) {
            return Ok(());
        }
    }

    let out = if args.routes {
        output::render_list(&global.output, &data, routed_row, |l| {
            l.route.clone().unwrap_or_default()
        })?
    } else {
        output::render_list(&global.output, &data, listing_row, |l| l.title.clone())?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
