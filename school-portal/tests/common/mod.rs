#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::redirect::Policy;
use school_portal::config::{BackendSettings, SessionSettings};
use school_portal::policy::AccessPolicy;
use school_portal::services::BackendClient;
use school_portal::session::TokenDecoder;
use school_portal::startup::build_router;
use school_portal::AppState;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const STUB_PASSWORD: &str = "correct-horse";

pub fn mint_token(role: &str, expires_in_seconds: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": format!("{}@school.test", role.to_lowercase()),
        "userId": 21,
        "role": role,
        "name": "Priya Sharma",
        "schoolId": 4,
        "classroomId": if role == "STUDENT" { json!(12) } else { Value::Null },
        "schoolName": "Lakeview Public School",
        "iat": now,
        "exp": now + expires_in_seconds
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to mint token")
}

/// Mirrors `POST /api/users/login`: the local part of the email picks the
/// role of the issued token.
async fn stub_login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if password != STUB_PASSWORD {
        return (StatusCode::UNAUTHORIZED, "Invalid email or password").into_response();
    }

    let token = match email.split('@').next() {
        Some("admin") => mint_token("ADMIN", 3600),
        Some("schooladmin") => mint_token("SCHOOLADMIN", 3600),
        Some("teacher") => mint_token("TEACHER", 3600),
        Some("student") => mint_token("STUDENT", 3600),
        Some("expired") => mint_token("TEACHER", -3600),
        _ => mint_token("PRINCIPAL", 3600),
    };
    token.into_response()
}

/// Mirrors `POST /api/users/register`. Answers 400 when the forwarded body
/// lacks a field the backend requires.
async fn stub_register(Json(body): Json<Value>) -> Response {
    let complete = ["name", "email", "password", "role"]
        .iter()
        .all(|field| body[*field].as_str().is_some_and(|value| !value.is_empty()))
        && body["schoolId"].is_i64();
    if !complete {
        return (StatusCode::BAD_REQUEST, "Missing registration field").into_response();
    }

    let email = body["email"].as_str().unwrap_or_default();
    if email.starts_with("taken@") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Email already registered").into_response();
    }

    Json(json!({
        "userId": 99,
        "name": body["name"],
        "email": email,
        "role": body["role"],
        "schoolId": body["schoolId"],
        "approved": false
    }))
    .into_response()
}

async fn stub_schools() -> Json<Value> {
    Json(json!([
        { "schoolId": 4, "name": "Lakeview Public School" },
        { "schoolId": 9, "name": "Hillside High" }
    ]))
}

pub async fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Failed to read stub address")
    );

    let app = Router::new()
        .route("/api/users/login", post(stub_login))
        .route("/api/users/register", post(stub_register))
        .route("/api/schools", get(stub_schools));
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    address
}

/// Address nothing listens on.
pub async fn unreachable_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind placeholder listener");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Failed to read placeholder address")
    );
    drop(listener);
    address
}

pub fn test_state(backend_url: &str) -> AppState {
    let backend = BackendClient::new(BackendSettings {
        url: backend_url.to_string(),
        timeout_seconds: 5,
    })
    .expect("Failed to build backend client");

    AppState::new(
        Arc::new(backend),
        Arc::new(TokenDecoder::verified(&Secret::new(TEST_SECRET.to_string()))),
        Arc::new(AccessPolicy::portal().expect("Portal policy is valid")),
        SessionSettings::default(),
    )
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend_url = spawn_backend().await;
        Self::spawn_with_backend(&backend_url).await
    }

    pub async fn spawn_with_backend(backend_url: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind portal");
        let address = format!(
            "http://{}",
            listener.local_addr().expect("Failed to read portal address")
        );

        let app = build_router(test_state(backend_url));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Redirects are asserted, not followed; the jar carries the session.
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .cookie_store(true)
            .build()
            .expect("Failed to build test client");

        TestApp { address, client }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/login", self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn register(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/register", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn logout(&self) -> reqwest::Response {
        self.client
            .post(format!("{}/logout", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
