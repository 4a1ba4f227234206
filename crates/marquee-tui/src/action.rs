//! Everything that can happen in the UI. Screens and background tasks
//! never mutate app state directly; they send one of these.

use marquee_core::{AuthReply, AuthRequest, BrowseEvent, CoreError, Generation, Movie, MovieRoute};

use crate::screen::ScreenId;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ────────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ───────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Search bar ───────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    SearchInput(String),

    // ── Auth ─────────────────────────────────────────────────────────
    /// An auth request came back from the backend.
    AuthResponse(Box<AuthResponse>),
    /// A session now exists; leave the auth screen.
    SignedIn { username: String },
    SignOut,

    // ── Browse ───────────────────────────────────────────────────────
    /// Ask the browse screen to start a fresh bootstrap.
    Reload,
    /// Spawn the bootstrap fetches for a generation the browse screen began.
    FetchBrowse(Generation),
    /// One bootstrap fetch finished.
    Browse(BrowseEvent),
    OpenMovie(Box<MovieDetail>),

    // ── Notifications ────────────────────────────────────────────────
    Notify(Notification),
}

impl From<BrowseEvent> for Action {
    fn from(event: BrowseEvent) -> Self {
        Self::Browse(event)
    }
}

/// The request that was sent and what came back, so the auth screen can
/// fold the result into its flow.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub request: AuthRequest,
    pub result: Result<AuthReply, CoreError>,
}

/// What the movie screen shows: the movie, where it plays, and its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetail {
    pub theater: String,
    pub address: String,
    pub movie: Movie,
    pub route: MovieRoute,
}

impl MovieDetail {
    pub fn new(theater: &marquee_core::Theater, movie: &Movie) -> Self {
        Self {
            theater: theater.name.clone(),
            address: theater.address.clone(),
            movie: movie.clone(),
            route: MovieRoute::for_movie(movie),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}
