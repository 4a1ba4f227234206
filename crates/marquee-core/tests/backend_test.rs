#![allow(clippy::unwrap_used)]
// Backend facade tests: session persistence, fallback messages and the
// browse bootstrap, against a wiremock backend.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marquee_api::{ShowtimeClient, TransportConfig};
use marquee_core::{
    AuthFlow, AuthMode, AuthReply, AuthStep, Backend, BrowseEvent, BrowseState, CoreError,
    MemorySessionStore, Rating, Session, SessionContext, Showtimes, spawn_bootstrap,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Backend) {
    let server = MockServer::start().await;
    let api_url = Url::parse(&server.uri()).unwrap();
    let theaters_url = api_url.join("/api/theaters").unwrap();
    let client = ShowtimeClient::new(api_url, theaters_url, &TransportConfig::default()).unwrap();
    let session = SessionContext::load(Arc::new(MemorySessionStore::default())).unwrap();
    (server, Backend::from_client(client, session))
}

fn theaters_body() -> serde_json::Value {
    json!({
        "theaters": [
            {
                "name": "Regal Westwood",
                "address": "1045 Broxton Ave",
                "movies": [{
                    "title": "Nosferatu",
                    "rating": "N/A",
                    "showtimes": "No showtimes available on IMDb.",
                    "imdbId": "tt5040012",
                    "image": ""
                }]
            },
            { "name": "Empty Hall", "address": "", "movies": [] }
        ]
    })
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn direct_sign_in_persists_session() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requiresOTP": false,
            "username": "joebruin",
            "token": "tok-1"
        })))
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new();
    flow.email = "joe@ucla.edu".into();
    flow.password = "hunter2".into();
    let step = flow.submit(&backend).await.unwrap();

    assert_eq!(
        step,
        AuthStep::Authenticated {
            username: "joebruin".into()
        }
    );
    let session = backend.session();
    assert!(session.is_authenticated());
    assert_eq!(session.require_token().unwrap().expose_secret(), "tok-1");
}

#[tokio::test]
async fn otp_sign_in_stores_nothing_until_verified() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requiresOTP": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/verify-otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "joebruin",
            "token": "tok-otp"
        })))
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new();
    flow.email = "joe@ucla.edu".into();
    flow.password = "hunter2".into();

    assert_eq!(flow.submit(&backend).await, Some(AuthStep::AwaitingOtp));
    assert_eq!(flow.mode(), AuthMode::VerifyOtp);
    assert!(!backend.session().is_authenticated());

    flow.otp = "123456".into();
    let step = flow.submit(&backend).await.unwrap();
    assert!(matches!(step, AuthStep::Authenticated { .. }));
    assert_eq!(
        backend.session().token().unwrap().expose_secret(),
        "tok-otp"
    );
}

#[tokio::test]
async fn sign_in_failure_uses_fallback_message() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({})))
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new();
    flow.email = "joe@ucla.edu".into();
    flow.password = "wrong".into();
    let step = flow.submit(&backend).await.unwrap();

    assert_eq!(
        step,
        AuthStep::Failed {
            message: "Failed to sign in.".into()
        }
    );
    assert_eq!(flow.mode(), AuthMode::SignIn);
}

#[tokio::test]
async fn register_failure_surfaces_server_message() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "User already exists" })),
        )
        .mount(&server)
        .await;

    let err = backend
        .sign_up("joe", "joe@ucla.edu", &SecretString::from("pw".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User already exists");
}

#[tokio::test]
async fn sign_in_without_token_still_authenticates() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "joe" })))
        .mount(&server)
        .await;

    let reply = backend
        .sign_in("joe@ucla.edu", &SecretString::from("pw".to_string()))
        .await
        .unwrap();
    assert!(matches!(
        reply,
        AuthReply::Authenticated { username: Some(ref u) } if u == "joe"
    ));
    assert!(backend.session().is_authenticated());
    assert!(backend.session().token().is_none());
}

#[tokio::test]
async fn otp_reply_with_only_a_username_finishes_sign_in() {
    let (server, backend) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requiresOTP": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/verify-otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "joebruin" })))
        .mount(&server)
        .await;
    // Reached only with a token; must not be hit.
    Mock::given(method("GET"))
        .and(path("/api/photo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new();
    flow.email = "joe@ucla.edu".into();
    flow.password = "pw".into();
    let step = flow.submit(&backend).await.unwrap();
    assert_eq!(step, AuthStep::AwaitingOtp);

    flow.otp = "123456".into();
    let step = flow.submit(&backend).await.unwrap();
    assert_eq!(
        step,
        AuthStep::Authenticated {
            username: "joebruin".into()
        }
    );
    assert_eq!(flow.error(), None);
    assert_eq!(backend.session().username().as_deref(), Some("joebruin"));

    // No token: the picture degrades, the session stays.
    let err = backend.profile_picture().await.unwrap_err();
    assert!(matches!(err, CoreError::NotAuthenticated));
    assert!(backend.session().is_authenticated());
}

#[tokio::test]
async fn sign_out_clears_session() {
    let (_server, backend) = setup().await;
    backend
        .session()
        .begin(Session::new("tok", Some("joe".into())))
        .unwrap();

    backend.sign_out().unwrap();
    assert!(!backend.session().is_authenticated());
}

// ── Browse ──────────────────────────────────────────────────────────

#[tokio::test]
async fn theaters_convert_placeholders() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/theaters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(theaters_body()))
        .mount(&server)
        .await;

    let theaters = backend.theaters().await.unwrap();
    assert_eq!(theaters.len(), 2);
    let movie = &theaters[0].movies[0];
    assert_eq!(movie.rating, Rating::Unrated);
    assert_eq!(movie.showtimes, Showtimes::Unlisted);
    assert_eq!(movie.image, None);
}

#[tokio::test]
async fn theaters_failure_message() {
    let (server, backend) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/theaters"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend.theaters().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load theater data.");
}

#[tokio::test]
async fn profile_picture_requires_session() {
    let (_server, backend) = setup().await;
    let err = backend.profile_picture().await.unwrap_err();
    assert!(matches!(err, CoreError::NotAuthenticated));
}

#[tokio::test]
async fn bootstrap_delivers_both_events() {
    let (server, backend) = setup().await;
    backend
        .session()
        .begin(Session::new("tok-b", None))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/theaters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(theaters_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/photo"))
        .and(header("authorization", "Bearer tok-b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut state = BrowseState::new();
    let generation = state.begin();
    let (tx, mut rx) = mpsc::unbounded_channel::<BrowseEvent>();
    let cancel = CancellationToken::new();
    let handles = spawn_bootstrap(&backend, generation, &tx, &cancel);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(tx);

    while let Some(event) = rx.recv().await {
        assert!(state.apply(event));
    }

    assert_eq!(state.theaters.ready().map(Vec::len), Some(2));
    assert_eq!(state.profile_picture.error(), Some("Failed to fetch photo"));
    assert!(state.blocking_error().is_none());
}

#[tokio::test]
async fn cancelled_bootstrap_sends_nothing() {
    let (_server, backend) = setup().await;
    let (tx, mut rx) = mpsc::unbounded_channel::<BrowseEvent>();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let handles = spawn_bootstrap(&backend, BrowseState::new().begin(), &tx, &cancel);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(tx);

    assert!(rx.recv().await.is_none());
}
