//! API client tests against an in-process axum backend, covering the bearer
//! attach and the 401 refresh-and-retry-once flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use lectavera_api::{ApiClient, ApiError, LoginRequest};
use lectavera_auth::{AuthStore, TokenPair};
use serde_json::{Value, json};

const FRESH_ACCESS: &str = "fresh-access";
const STALE_ACCESS: &str = "stale-access";
const GOOD_REFRESH: &str = "good-refresh";
const ROTATED_REFRESH: &str = "rotated-refresh";

#[derive(Default)]
struct Backend {
    refresh_calls: AtomicUsize,
    me_calls: AtomicUsize,
}

fn user_json() -> Value {
    json!({
        "id": "u1",
        "email": "ada@example.org",
        "username": "ada",
        "full_name": "Ada Lovelace",
        "is_active": true,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
    })
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "invalid token"}))).into_response()
}

async fn me(State(state): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer == format!("Bearer {FRESH_ACCESS}") {
        Json(user_json()).into_response()
    } else {
        unauthorized()
    }
}

async fn refresh(State(state): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if body["refresh_token"] == GOOD_REFRESH {
        Json(json!({
            "access_token": FRESH_ACCESS,
            "refresh_token": ROTATED_REFRESH,
        }))
        .into_response()
    } else {
        unauthorized()
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    assert_eq!(body["email"], "ada@example.org");
    Json(json!({
        "user": user_json(),
        "tokens": {
            "access_token": FRESH_ACCESS,
            "refresh_token": GOOD_REFRESH,
            "token_type": "bearer",
        },
    }))
    .into_response()
}

async fn missing_document() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "document not found"})),
    )
        .into_response()
}

/// Serves the mock backend on an ephemeral port; returns the versioned base
/// URL.
async fn serve(state: Arc<Backend>) -> String {
    let app = axum::Router::new()
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/documents/{id}", get(missing_document))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

fn stale_auth() -> Arc<AuthStore> {
    Arc::new(AuthStore::with_tokens(TokenPair {
        access_token: STALE_ACCESS.into(),
        refresh_token: GOOD_REFRESH.into(),
    }))
}

#[tokio::test]
async fn refresh_and_retry_once_on_401() {
    let backend = Arc::new(Backend::default());
    let base = serve(backend.clone()).await;
    let auth = stale_auth();
    let client = ApiClient::new(base, auth.clone()).unwrap();

    let user = client.me().await.unwrap();
    assert_eq!(user.username, "ada");

    // One rejected call, one refresh, one retried call.
    assert_eq!(backend.me_calls.load(Ordering::SeqCst), 2);
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(auth.access_token().as_deref(), Some(FRESH_ACCESS));
    assert_eq!(auth.refresh_token().as_deref(), Some(ROTATED_REFRESH));
}

#[tokio::test]
async fn failed_refresh_clears_the_store() {
    let backend = Arc::new(Backend::default());
    let base = serve(backend.clone()).await;
    let auth = Arc::new(AuthStore::with_tokens(TokenPair {
        access_token: STALE_ACCESS.into(),
        refresh_token: "revoked-refresh".into(),
    }));
    let client = ApiClient::new(base, auth.clone()).unwrap();

    assert!(matches!(client.me().await, Err(ApiError::Unauthorized)));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(!auth.is_authenticated());

    // A later call does not loop: no refresh token left, immediate error.
    assert!(matches!(client.me().await, Err(ApiError::Unauthorized)));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn login_stores_the_issued_tokens() {
    let base = serve(Arc::new(Backend::default())).await;
    let auth = Arc::new(AuthStore::new());
    let client = ApiClient::new(base, auth.clone()).unwrap();

    let response = client
        .login(&LoginRequest {
            email: "ada@example.org".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.email, "ada@example.org");
    assert!(auth.is_authenticated());
    assert_eq!(auth.access_token().as_deref(), Some(FRESH_ACCESS));
}

#[tokio::test]
async fn error_detail_is_decoded_from_the_body() {
    let base = serve(Arc::new(Backend::default())).await;
    let auth = Arc::new(AuthStore::with_tokens(TokenPair {
        access_token: FRESH_ACCESS.into(),
        refresh_token: GOOD_REFRESH.into(),
    }));
    let client = ApiClient::new(base, auth).unwrap();

    match client.get_document("missing").await {
        Err(ApiError::Status { code, detail }) => {
            assert_eq!(code, 404);
            assert_eq!(detail, "document not found");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
