//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Use `given`, or read a password from the terminal without echo.
pub fn password_or_prompt(given: Option<String>) -> Result<String, CliError> {
    if let Some(password) = given {
        return Ok(password);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractive {
            what: "--password".into(),
        });
    }
    rpassword::prompt_password("Password: ").map_err(prompt_err)
}

/// Ask for the emailed verification code. `None` off a terminal.
pub fn prompt_otp() -> Result<Option<String>, CliError> {
    if !io::stdin().is_terminal() {
        return Ok(None);
    }
    let code: String = dialoguer::Input::new()
        .with_prompt("Verification code")
        .interact_text()
        .map_err(prompt_err)?;
    Ok(Some(code.trim().to_owned()))
}

/// Await `fut` behind a stderr spinner. The spinner is hidden when quiet or
/// when stderr is not a terminal.
pub async fn with_spinner<F: Future>(message: &str, quiet: bool, fut: F) -> F::Output {
    let bar = if quiet || !io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_owned());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    };
    let out = fut.await;
    bar.finish_and_clear();
    out
}
