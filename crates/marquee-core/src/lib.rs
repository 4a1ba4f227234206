//! Business logic shared by the marquee CLI and TUI.
//!
//! - **[`Backend`]**: facade over [`marquee_api::ShowtimeClient`] plus the
//!   current [`SessionContext`]. Converts wire records into the domain
//!   model and persists the session token on a successful sign-in.
//!
//! - **[`filter`]**: the theater/movie filter driven by the browse view
//!   state (search text and theater selection).
//!
//! - **[`auth`]**: the Sign In / Register / Verify OTP state machine with
//!   local validation, independent of any particular front end.
//!
//! - **[`browse`]**: browse-screen bootstrap. Two independent fetches
//!   (theaters and profile picture) tagged with a generation so stale
//!   results are dropped.
//!
//! - **[`session`]**: injectable session context with memory, file and
//!   keyring-backed stores.

pub mod auth;
pub mod backend;
pub mod browse;
pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod route;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthBackend, AuthFlow, AuthMode, AuthReply, AuthRequest, AuthStep};
pub use backend::Backend;
pub use browse::{BrowseEvent, BrowseState, Generation, Loadable, spawn_bootstrap};
pub use config::BackendConfig;
pub use error::CoreError;
pub use filter::{BrowseFilter, TheaterSelection, filter_theaters, theater_names};
pub use model::{Movie, Rating, Showtimes, Theater};
pub use route::MovieRoute;
pub use session::{
    FileSessionStore, KeyringSessionStore, MemorySessionStore, Session, SessionContext,
    SessionStore,
};
