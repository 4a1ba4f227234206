//! `marquee-tui`: terminal front end for browsing showtimes.
//!
//! Opens on the sign-in form unless the active profile already holds a
//! session, in which case it goes straight to the theater grid. Theater
//! and profile-picture fetches run in background tasks and report back
//! through the app's action channel.
//!
//! Logs go to a file (default `/tmp/marquee-tui.log`) so they never land
//! on the terminal the UI is drawing to.

mod action;
mod app;
mod component;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{Backend, SessionContext};

use crate::app::App;

/// Browse what's playing at nearby theaters.
#[derive(Parser, Debug)]
#[command(name = "marquee-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "MARQUEE_PROFILE")]
    profile: Option<String>,

    /// Account API base URL (overrides the profile)
    #[arg(long, env = "MARQUEE_API_URL")]
    api_url: Option<String>,

    /// Theater listing URL (overrides the profile)
    #[arg(long, env = "MARQUEE_THEATERS_URL")]
    theaters_url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/marquee-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. Anything written to stdout or stderr would tear the
/// UI, so the subscriber gets a non-blocking file writer. Hold the guard
/// until exit or buffered lines are lost.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "marquee_tui={log_level},marquee_core={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("marquee-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the profile, apply flag overrides, and restore its session.
fn build_backend(cli: &Cli) -> Result<(String, Backend)> {
    let config = marquee_config::load_config_or_default();
    let (name, mut profile) = config.resolve_profile(cli.profile.as_deref())?;

    if let Some(ref url) = cli.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(ref url) = cli.theaters_url {
        profile.theaters_url = Some(url.clone());
    }

    let backend_config = marquee_config::profile_to_backend_config(&profile, &config.defaults)?;
    let session = SessionContext::load(marquee_config::open_session_store(&profile, &name))?;
    info!(
        profile = %name,
        api_url = %backend_config.api_url,
        theaters_url = %backend_config.theaters_url,
        session = %session.store_description(),
        "resolved backend"
    );

    Ok((name, Backend::new(&backend_config, session)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (profile_name, backend) = build_backend(&cli)?;
    info!(
        signed_in = backend.session().is_authenticated(),
        "starting marquee-tui"
    );

    let mut app = App::new(backend, profile_name);
    app.run().await?;

    Ok(())
}
