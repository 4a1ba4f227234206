//! Auth command handlers: signup, signin, verify, status, logout.

use chrono::{DateTime, Utc};
use serde::Serialize;

use marquee_core::auth::NOTICE_CHECK_EMAIL;
use marquee_core::{AuthBackend, AuthFlow, AuthMode, AuthReply, AuthStep, Backend};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Status view ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct SessionStatus {
    signed_in: bool,
    username: Option<String>,
    since: Option<DateTime<Utc>>,
    store: String,
}

fn status_detail(s: &SessionStatus) -> String {
    if !s.signed_in {
        return format!("Not signed in\nStore:     {}", s.store);
    }
    [
        format!("Signed in: {}", s.username.as_deref().unwrap_or("(unknown user)")),
        format!(
            "Since:     {}",
            s.since
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        ),
        format!("Store:     {}", s.store),
    ]
    .join("\n")
}

// ── Flow helpers ─────────────────────────────────────────────────────

/// Validate the flow's buffers, send the request, and advance the flow.
///
/// Failures come back as errors with their status intact so the exit code
/// can reflect them.
async fn send(
    flow: &mut AuthFlow,
    backend: &Backend,
    global: &GlobalOpts,
) -> Result<AuthReply, CliError> {
    let Some(request) = flow.prepare() else {
        return Err(CliError::MissingInput {
            message: flow.error().unwrap_or_default().to_owned(),
        });
    };
    let message = match flow.mode() {
        AuthMode::Register => "Registering…",
        AuthMode::SignIn => "Signing in…",
        AuthMode::VerifyOtp => "Verifying code…",
    };
    let reply = util::with_spinner(message, global.quiet, backend.authenticate(&request)).await?;
    flow.complete(&request, Ok(reply.clone()));
    Ok(reply)
}

fn welcome(username: Option<String>, flow: &AuthFlow, color: bool) {
    let step = AuthStep::Authenticated {
        username: username.unwrap_or_else(|| flow.email.clone()),
    };
    if let Some(notice) = step.notice() {
        output::notice(&notice, color);
    }
}

/// Enter the OTP step and finish it, prompting when possible.
async fn finish_with_otp(
    flow: &mut AuthFlow,
    backend: &Backend,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    output::hint(NOTICE_CHECK_EMAIL, color);
    let Some(code) = util::prompt_otp()? else {
        return Err(CliError::OtpRequired {
            email: flow.email.clone(),
        });
    };
    flow.otp = code;
    match send(flow, backend, global).await? {
        AuthReply::Authenticated { username } => {
            welcome(username, flow, color);
            Ok(())
        }
        AuthReply::OtpRequired | AuthReply::Registered => Err(CliError::OtpRequired {
            email: flow.email.clone(),
        }),
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(args: AuthArgs, backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut flow = AuthFlow::new();

    match args.command {
        AuthCommand::Signup {
            username,
            email,
            password,
        } => {
            flow.toggle();
            flow.username = username;
            flow.email = email;
            flow.password = util::password_or_prompt(password)?;
            send(&mut flow, backend, global).await?;
            if let Some(notice) = AuthStep::Registered.notice() {
                output::notice(&notice, color);
            }
            output::hint(
                &format!("Sign in with: marquee auth signin --email {}", flow.email),
                color,
            );
            Ok(())
        }

        AuthCommand::Signin { email, password } => {
            flow.email = email;
            flow.password = util::password_or_prompt(password)?;
            match send(&mut flow, backend, global).await? {
                AuthReply::Authenticated { username } => {
                    welcome(username, &flow, color);
                    Ok(())
                }
                AuthReply::OtpRequired => finish_with_otp(&mut flow, backend, global, color).await,
                AuthReply::Registered => Ok(()),
            }
        }

        AuthCommand::Verify { email, otp } => {
            let mut flow = AuthFlow::awaiting_otp(email);
            flow.otp = otp;
            match send(&mut flow, backend, global).await? {
                AuthReply::Authenticated { username } => {
                    welcome(username, &flow, color);
                    Ok(())
                }
                AuthReply::OtpRequired | AuthReply::Registered => Err(CliError::OtpRequired {
                    email: flow.email.clone(),
                }),
            }
        }

        AuthCommand::Status => {
            let session = backend.session();
            let current = session.current();
            let status = SessionStatus {
                signed_in: current.is_some(),
                username: current.as_ref().and_then(|s| s.username.clone()),
                since: current.as_ref().map(|s| s.created_at),
                store: session.store_description(),
            };
            let out = output::render_single(&global.output, &status, status_detail, |s| {
                s.username.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AuthCommand::Logout => {
            let was_signed_in = backend.session().is_authenticated();
            backend.sign_out()?;
            if !global.quiet {
                let message = if was_signed_in {
                    "Signed out"
                } else {
                    "No session was stored"
                };
                output::notice(message, color);
            }
            Ok(())
        }
    }
}
