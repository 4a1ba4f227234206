// marquee-api: Async Rust client for the Bruin Movies showtime and account API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod profile;
pub mod theaters;
pub mod transport;

pub use client::ShowtimeClient;
pub use error::Error;
pub use models::{PhotoReply, RawMovie, RawTheater, SignInReply, SignUpReply, VerifyOtpReply};
pub use transport::{TlsMode, TransportConfig};
