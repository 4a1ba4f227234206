//! Screen implementations. Each screen is a top-level Component.

pub mod auth;
pub mod browse;
pub mod movie;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_backend() -> marquee_core::Backend {
    let config = marquee_config::profile_to_backend_config(
        &marquee_config::Profile::default(),
        &marquee_config::Defaults::default(),
    )
    .unwrap();
    marquee_core::Backend::new(&config, marquee_core::SessionContext::in_memory()).unwrap()
}
