//! Integration tests for the TeaMall storefront client.
//!
//! [`MockBackend`] serves a small slice of the `/api` surface from an `axum`
//! router on an ephemeral localhost port and records every request it sees.
//! Tests drive a real [`Storefront`] (and its `reqwest` gateway) against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p teamall-integration-tests
//! ```
//!
//! # Mock endpoints
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `POST /api/users/login` | token + profile when password is [`PASSWORD`], business error otherwise |
//! | `GET /api/users/info` | profile for a known token, HTTP 401 otherwise |
//! | `POST /api/users/logout` | success |
//! | `GET /api/products`, `/api/products/search` | success with an empty page |
//! | `POST /api/orders/{id}/pay`, `PUT /api/users/password` | success |
//! | `GET /api/rotate` | success carrying [`ROTATED_TOKEN`] |
//! | `GET /api/business` | HTTP 200 with a non-success code |
//! | `GET /api/status/{code}` | that HTTP status |
//! | `GET /api/echo` | success |

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use teamall_client::notify::RecordingNotifier;
use teamall_client::storage::MemoryStore;
use teamall_client::{ClientConfig, ClientError, Storefront};

/// Password the mock accepts for any email.
pub const PASSWORD: &str = "correct-horse";
/// Token issued by a successful login.
pub const LOGIN_TOKEN: &str = "jwt-login";
/// Token handed out by `GET /api/rotate`.
pub const ROTATED_TOKEN: &str = "jwt-rotated";
/// Message of the business error served by `GET /api/business`.
pub const BUSINESS_MESSAGE: &str = "Insufficient stock";

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<SeenRequest>>>);

impl Recorder {
    fn push(&self, seen: SeenRequest) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(seen);
    }

    fn all(&self) -> Vec<SeenRequest> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A running mock backend.
pub struct MockBackend {
    addr: SocketAddr,
    recorder: Recorder,
}

impl MockBackend {
    /// Bind to `127.0.0.1:0` and serve in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let recorder = Recorder::default();

        let api = Router::new()
            .route("/users/login", post(login))
            .route("/users/info", get(user_info))
            .route("/users/logout", post(success))
            .route("/users/password", put(success))
            .route("/products", get(empty_page))
            .route("/products/search", get(empty_page))
            .route("/orders/{id}/pay", post(success))
            .route("/rotate", get(rotate))
            .route("/business", get(business))
            .route("/status/{code}", get(status))
            .route("/echo", get(success));

        let app = Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(recorder.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                report_serve_error(&e);
            }
        });

        Ok(Self { addr, recorder })
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.recorder.all()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<SeenRequest> {
        self.recorder.all().pop()
    }

    /// A storefront pointed at this backend, hydrated from `entries`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be configured.
    pub fn shop(&self, entries: &[(&str, &str)]) -> Result<TestShop, ClientError> {
        TestShop::new(&self.base_url(), entries)
    }
}

/// A storefront plus handles on its store and notices.
pub struct TestShop {
    pub shop: Storefront,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestShop {
    /// Build a storefront for `base_url` over a memory store seeded with
    /// `entries`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be configured.
    pub fn new(base_url: &str, entries: &[(&str, &str)]) -> Result<Self, ClientError> {
        let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        Self::with_store(base_url, store)
    }

    /// Build a storefront over an existing store, as after a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be configured.
    pub fn with_store(base_url: &str, store: Arc<MemoryStore>) -> Result<Self, ClientError> {
        let config = ClientConfig::new(base_url)?;
        let notifier = Arc::new(RecordingNotifier::new());
        let shop = Storefront::new(config, store.clone(), notifier.clone())?;
        Ok(Self {
            shop,
            store,
            notifier,
        })
    }
}

/// Base URL of a port nothing listens on.
///
/// # Errors
///
/// Returns an error if no port can be reserved.
pub async fn unreachable_base_url() -> std::io::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/api"))
}

// =============================================================================
// Handlers
// =============================================================================

async fn record(State(recorder): State<Recorder>, request: Request, next: Next) -> Response {
    recorder.push(SeenRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_owned(),
        query: request.uri().query().map(str::to_owned),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });
    next.run(request).await
}

fn profile(token: &str) -> Value {
    let role = if token == ROTATED_TOKEN {
        "ROLE_ADMIN"
    } else {
        "ROLE_USER"
    };
    json!({
        "id": 1,
        "username": "oolong",
        "email": "buyer@example.com",
        "role": role,
    })
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    if body.get("password").and_then(Value::as_str) == Some(PASSWORD) {
        Json(json!({
            "code": 200,
            "message": "success",
            "data": { "token": LOGIN_TOKEN, "user": profile(LOGIN_TOKEN) },
        }))
    } else {
        Json(json!({ "code": 400, "message": "Invalid email or password" }))
    }
}

async fn user_info(headers: HeaderMap) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if token == LOGIN_TOKEN || token == ROTATED_TOKEN => {
            Json(json!({ "code": 200, "data": profile(token) })).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token expired" })),
        )
            .into_response(),
    }
}

async fn success() -> Json<Value> {
    Json(json!({ "code": 200, "message": "success", "data": null }))
}

async fn empty_page() -> Json<Value> {
    Json(json!({ "code": 200, "data": { "records": [], "total": 0 } }))
}

async fn rotate() -> Json<Value> {
    Json(json!({ "code": 200, "data": { "token": ROTATED_TOKEN } }))
}

async fn business() -> Json<Value> {
    Json(json!({ "code": 500, "message": BUSINESS_MESSAGE, "data": null }))
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": format!("mock status {code}") }))).into_response()
}

#[allow(clippy::print_stderr)]
fn report_serve_error(err: &std::io::Error) {
    eprintln!("mock backend stopped: {err}");
}
