//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use marquee_config::SessionStoreKind;
use marquee_core::config::{DEFAULT_API_URL, DEFAULT_THEATERS_URL};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::{CliError, join_or_none};
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-like text for display.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref url) = p.theaters_url {
            let _ = writeln!(out, "theaters_url = \"{url}\"");
        }
        let _ = writeln!(out, "session_store = \"{}\"", p.session_store);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

fn prompt_session_store() -> Result<SessionStoreKind, CliError> {
    let choices = &[
        "File in the data directory (default)",
        "System keyring",
        "Memory only (sign in every run)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the session be kept?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(match selection {
        1 => SessionStoreKind::Keyring,
        2 => SessionStoreKind::Memory,
        _ => SessionStoreKind::File,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("🎬 marquee configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Account API URL")
                .default(DEFAULT_API_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let theaters_url: String = Input::new()
                .with_prompt("Theater listing URL")
                .default(DEFAULT_THEATERS_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let session_store = prompt_session_store()?;

            let profile = Profile {
                api_url,
                theaters_url: (theaters_url != DEFAULT_THEATERS_URL).then_some(theaters_url),
                session_store,
                ..Profile::default()
            };

            // Keep other profiles if a config already exists.
            let mut cfg = config::load_config().unwrap_or_else(|_| Config {
                default_profile: None,
                defaults: Defaults::default(),
                profiles: HashMap::new(),
            });
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Try it: marquee theaters");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out =
                output::render_single(&global.output, &cfg, format_config, |_| "config".into())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: marquee config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: join_or_none(cfg.profiles.keys().cloned().collect()),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_lists_profiles_sorted() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "zeta".into(),
            Profile {
                session_store: SessionStoreKind::Keyring,
                ..Profile::default()
            },
        );
        cfg.profiles.insert(
            "alpha".into(),
            Profile {
                theaters_url: Some("http://scraper.test/api/theaters".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );

        let text = format_config(&cfg);
        let alpha = text.find("[profiles.alpha]").unwrap_or(usize::MAX);
        let zeta = text.find("[profiles.zeta]").unwrap_or(0);
        assert!(alpha < zeta);
        assert!(text.contains("session_store = \"keyring\""));
        assert!(text.contains("theaters_url = \"http://scraper.test/api/theaters\""));
        assert!(text.contains("timeout = 5"));
        assert!(text.starts_with("default_profile = \"default\""));
    }
}
