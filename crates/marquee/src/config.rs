//! CLI configuration: thin wrapper around `marquee_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --timeout, etc.).

pub use marquee_config::{Config, Defaults, Profile, config_path, load_config, save_config};

use marquee_core::{Backend, BackendConfig, SessionContext};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile name and profile selected by `--profile` or the config default.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    Ok(config.resolve_profile(global.profile.as_deref())?)
}

/// Apply CLI flag overrides on top of a profile.
///
/// Flags take priority over profile values, profile values over defaults.
pub fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(ref url) = global.theaters_url {
        profile.theaters_url = Some(url.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

/// Resolve the effective `BackendConfig` for this invocation.
pub fn backend_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, Profile, BackendConfig), CliError> {
    let (name, mut profile) = active_profile(global, config)?;
    apply_overrides(&mut profile, global);
    let backend = marquee_config::profile_to_backend_config(&profile, &config.defaults)?;
    Ok((name, profile, backend))
}

/// Build the backend facade with the profile's session store loaded.
pub fn build_backend(global: &GlobalOpts) -> Result<Backend, CliError> {
    let config = load_config()?;
    let (name, profile, backend_config) = backend_config(global, &config)?;
    let store = marquee_config::open_session_store(&profile, &name);
    let session = SessionContext::load(store)?;
    tracing::debug!(
        profile = %name,
        api_url = %backend_config.api_url,
        theaters_url = %backend_config.theaters_url,
        session = %session.store_description(),
        "resolved backend"
    );
    Ok(Backend::new(&backend_config, session)?)
}
