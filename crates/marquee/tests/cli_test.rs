//! Integration tests for the `marquee` CLI binary.
//!
//! Argument parsing, help output, shell completions and error exit codes,
//! plus end-to-end runs against a wiremock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `marquee` binary with env isolation.
///
/// Clears all `MARQUEE_*` env vars and points config/data directories at
/// `home` so tests never touch the user's real configuration or session.
fn marquee_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("marquee");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MARQUEE_PROFILE")
        .env_remove("MARQUEE_API_URL")
        .env_remove("MARQUEE_THEATERS_URL")
        .env_remove("MARQUEE_OUTPUT")
        .env_remove("MARQUEE_INSECURE")
        .env_remove("MARQUEE_TIMEOUT")
        .env_remove("MARQUEE_PASSWORD");
    cmd
}

/// Same, wired to a mock backend for both the account API and listings.
fn backed_cmd(home: &TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = marquee_cmd(home);
    cmd.env("MARQUEE_API_URL", server.uri())
        .env("MARQUEE_THEATERS_URL", format!("{}/api/theaters", server.uri()));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn theaters_body() -> serde_json::Value {
    json!({
        "theaters": [
            {
                "name": "Regal Village",
                "address": "961 Broxton Ave",
                "movies": [
                    {
                        "title": "Dune: Part Two",
                        "rating": "PG-13",
                        "showtimes": "7:00pm, 9:30pm",
                        "imdbId": "tt15239678",
                        "image": "https://img.example/dune.jpg"
                    },
                    {
                        "title": "Nosferatu",
                        "rating": "N/A",
                        "showtimes": "No showtimes available on IMDb.",
                        "imdbId": "tt5040012",
                        "image": ""
                    }
                ]
            },
            {
                "name": "Bruin Theater",
                "address": "948 Broxton Ave",
                "movies": [{
                    "title": "The Brutalist",
                    "rating": "R",
                    "showtimes": "6:15pm",
                    "imdbId": "tt8999762",
                    "image": ""
                }]
            },
            { "name": "Closed Hall", "address": "", "movies": [] }
        ]
    })
}

async fn listing_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/theaters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(theaters_body()))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = marquee_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("showtimes")
            .and(predicate::str::contains("auth"))
            .and(predicate::str::contains("theaters"))
            .and(predicate::str::contains("photo")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("marquee"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home).arg("popcorn").assert().code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marquee"));
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    let home = TempDir::new().unwrap();
    let output = marquee_cmd(&home).args(["config", "path"]).output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.trim().ends_with("config.toml"), "got: {text}");
}

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]").and(predicate::str::contains("timeout = 30")));
}

#[test]
fn test_unknown_profile() {
    let home = TempDir::new().unwrap();
    let output = marquee_cmd(&home)
        .args(["--profile", "campus", "theaters"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Profile 'campus' not found"));
}

// ── Theaters ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_table() {
    let server = listing_server().await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server).arg("theaters").output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Dune: Part Two"));
    assert!(text.contains("Not Rated"));
    assert!(text.contains("No showtimes listed"));
    assert!(!text.contains("Closed Hall"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_search_is_case_insensitive() {
    let server = listing_server().await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["theaters", "--search", "BRUT", "--output", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "The Brutalist");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_json_by_theater() {
    let server = listing_server().await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["theaters", "--theater", "Regal Village", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["theater"], "Regal Village");
    assert_eq!(rows[1]["rating"], serde_json::Value::Null);
    assert_eq!(rows[1]["image"], serde_json::Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_routes() {
    let server = listing_server().await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["theaters", "--routes", "--output", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect();
    assert_eq!(
        lines,
        vec![
            "/tt15239678?showtimes=7%3A00pm%2C+9%3A30pm",
            "/tt5040012",
            "/tt8999762?showtimes=6%3A15pm",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_names() {
    let server = listing_server().await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["theaters", "--names", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Regal Village\nBruin Theater"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_unknown_theater_is_an_empty_listing() {
    let server = listing_server().await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["theaters", "--theater", "AMC Century"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).trim().is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No movies found."));
    assert!(stderr.contains("No theater named 'AMC Century'"));
    assert!(stderr.contains("Regal Village"));

    let output = backed_cmd(&home, &server)
        .args(["theaters", "--theater", "AMC Century", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows, serde_json::json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_theaters_backend_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/theaters"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server).arg("theaters").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Failed to load theater data."));
}

#[test]
fn test_theaters_unreachable_backend() {
    let home = TempDir::new().unwrap();
    let output = marquee_cmd(&home)
        .args([
            "--theaters-url",
            "http://127.0.0.1:1/api/theaters",
            "--timeout",
            "5",
            "theaters",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("An unexpected error occurred."));
}

// ── Auth ────────────────────────────────────────────────────────────

#[test]
fn test_auth_status_signed_out() {
    let home = TempDir::new().unwrap();
    marquee_cmd(&home)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_photo_requires_session() {
    let home = TempDir::new().unwrap();
    let output = marquee_cmd(&home).arg("photo").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Not signed in"));
}

#[test]
fn test_signin_empty_password_is_rejected_locally() {
    let home = TempDir::new().unwrap();
    let output = marquee_cmd(&home)
        .args(["auth", "signin", "--email", "joe@ucla.edu", "--password", ""])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Email and password are required."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signin_then_photo_and_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .and(body_json(json!({ "email": "joe@ucla.edu", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requiresOTP": false,
            "username": "joebruin",
            "token": "tok-cli"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/photo"))
        .and(wiremock::matchers::header("authorization", "Bearer tok-cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profilePicture": "https://img.example/joe.png"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["auth", "signin", "--email", "joe@ucla.edu", "--password", "hunter2"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Welcome back, joebruin!"));

    backed_cmd(&home, &server)
        .args(["auth", "status", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("joebruin"));

    backed_cmd(&home, &server)
        .args(["photo", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://img.example/joe.png"));

    backed_cmd(&home, &server)
        .args(["auth", "logout"])
        .assert()
        .success();
    backed_cmd(&home, &server)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signin_needing_otp_off_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requiresOTP": true })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args(["auth", "signin", "--email", "joe@ucla.edu", "--password", "hunter2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Please check your email for the verification code."));
    assert!(text.contains("Verification code required for joe@ucla.edu"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_verify_otp_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify-otp"))
        .and(body_json(json!({ "email": "joe@ucla.edu", "otp": "424242" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "joebruin",
            "token": "tok-otp"
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    backed_cmd(&home, &server)
        .args(["auth", "verify", "--email", "joe@ucla.edu", "--otp", "424242"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Welcome back, joebruin!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signup_conflict_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "User already exists" })),
        )
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = backed_cmd(&home, &server)
        .args([
            "auth",
            "signup",
            "--username",
            "joebruin",
            "--email",
            "joe@ucla.edu",
            "--password",
            "hunter2",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("User already exists"));
}
