use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

use taday::configuration::JwtSettings;
use taday::session::{InMemorySessionStore, SessionStore};
use taday::startup::{run, AppStores};
use taday::todos::InMemoryTodoStore;
use taday::users::InMemoryUserStore;

pub struct TestApp {
    pub address: String,
    pub sessions: Arc<InMemorySessionStore>,
}

fn test_jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 5_184_000,
        issuer: "taday".to_string(),
    }
}

/// Spin up the real server on an ephemeral port, backed by the in-memory
/// stores so the suite needs no database.
fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let sessions = Arc::new(InMemorySessionStore::new());
    let stores = AppStores {
        users: Arc::new(InMemoryUserStore::new()),
        sessions: sessions.clone(),
        todos: Arc::new(InMemoryTodoStore::new()),
    };

    let server = run(listener, stores, test_jwt_settings()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address, sessions }
}

/// Pull a cookie value out of the Set-Cookie response headers.
/// The auth cookies are marked Secure, so a client-side jar would refuse to
/// replay them over plain HTTP; tests carry them by hand instead.
fn extract_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    for value in response.headers().get_all(reqwest::header::SET_COOKIE) {
        let raw = match value.to_str() {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        if let Some(rest) = raw.strip_prefix(&format!("{}=", name)) {
            return Some(rest.split(';').next().unwrap_or("").to_string());
        }
    }
    None
}

async fn register_user(app: &TestApp, email: &str, password: &str) {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/users", &app.address))
        .json(&json!({
            "username": "tester",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
}

async fn login(app: &TestApp, email: &str, password: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/api/login", &app.address))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request.")
}

// --- Registration and login ---

#[tokio::test]
async fn login_sets_both_cookies_and_persists_a_sixty_day_refresh_record() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;

    let response = login(&app, "john@example.com", "SecurePass123").await;
    assert_eq!(200, response.status().as_u16());

    let access = extract_cookie(&response, "access_token").expect("access cookie missing");
    let refresh = extract_cookie(&response, "refresh_token").expect("refresh cookie missing");
    assert!(!access.is_empty());
    assert_eq!(refresh.len(), 64);

    let record = app
        .sessions
        .lookup(&refresh)
        .await
        .expect("store lookup failed")
        .expect("refresh record should exist");
    assert!(record.revoked_at.is_none());
    assert_eq!((record.expires_at - record.issued_at).num_days(), 60);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "john@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_invalid_email_and_duplicate_email() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    for invalid_email in ["notanemail", "user@", "@example.com", "user@@example.com"] {
        let response = client
            .post(format!("{}/api/users", &app.address))
            .json(&json!({
                "username": "tester",
                "email": invalid_email,
                "password": "SecurePass123",
            }))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            400,
            response.status().as_u16(),
            "Should reject invalid email: {}",
            invalid_email
        );
    }

    register_user(&app, "john@example.com", "SecurePass123").await;
    let response = client
        .post(format!("{}/api/users", &app.address))
        .json(&json!({
            "username": "tester",
            "email": "john@example.com",
            "password": "SecurePass123",
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;

    let wrong_password = login(&app, "john@example.com", "WrongPass123").await;
    let unknown_email = login(&app, "nobody@example.com", "SecurePass123").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    assert!(extract_cookie(&wrong_password, "access_token").is_none());
    assert!(extract_cookie(&unknown_email, "access_token").is_none());

    let body_a: Value = wrong_password.json().await.expect("Failed to parse");
    let body_b: Value = unknown_email.json().await.expect("Failed to parse");
    assert_eq!(body_a["code"], body_b["code"]);
    assert_eq!(body_a["message"], body_b["message"]);
    assert_eq!(body_a["status"], body_b["status"]);
}

// --- Refresh ---

#[tokio::test]
async fn refresh_rotates_only_the_access_cookie() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;
    let response = login(&app, "john@example.com", "SecurePass123").await;
    let refresh = extract_cookie(&response, "refresh_token").unwrap();

    let response = reqwest::Client::new()
        .post(format!("{}/api/refresh", &app.address))
        .header("Cookie", format!("refresh_token={}", refresh))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert!(extract_cookie(&response, "access_token").is_some());
    // The refresh token is not rotated; no new refresh cookie is issued.
    assert!(extract_cookie(&response, "refresh_token").is_none());
}

#[tokio::test]
async fn refresh_with_unknown_token_is_rejected_without_an_access_cookie() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .post(format!("{}/api/refresh", &app.address))
        .header("Cookie", format!("refresh_token={}", "f".repeat(64)))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert!(extract_cookie(&response, "access_token").is_none());
}

#[tokio::test]
async fn refresh_without_a_cookie_is_rejected() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .post(format!("{}/api/refresh", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Revoke and logout ---

#[tokio::test]
async fn login_logout_then_refresh_is_rejected() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;
    let response = login(&app, "john@example.com", "SecurePass123").await;
    let refresh = extract_cookie(&response, "refresh_token").unwrap();

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/logout", &app.address))
        .header("Cookie", format!("refresh_token={}", refresh))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    // Logout expires both cookies.
    assert_eq!(extract_cookie(&response, "access_token").as_deref(), Some(""));
    assert_eq!(extract_cookie(&response, "refresh_token").as_deref(), Some(""));

    let response = client
        .post(format!("{}/api/refresh", &app.address))
        .header("Cookie", format!("refresh_token={}", refresh))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn revoke_returns_204_and_kills_the_session() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;
    let response = login(&app, "john@example.com", "SecurePass123").await;
    let refresh = extract_cookie(&response, "refresh_token").unwrap();

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/revoke", &app.address))
        .header("Cookie", format!("refresh_token={}", refresh))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let record = app.sessions.lookup(&refresh).await.unwrap().unwrap();
    assert!(record.revoked_at.is_some());
}

#[tokio::test]
async fn logout_always_returns_200_even_without_a_session() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .post(format!("{}/api/logout", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

// --- The authentication gate ---

#[tokio::test]
async fn protected_endpoint_rejects_missing_and_garbage_tokens() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/me", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = client
        .get(format!("{}/api/me", &app.address))
        .header("Cookie", "access_token=garbage")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn protected_endpoint_serves_the_authenticated_user() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;
    let response = login(&app, "john@example.com", "SecurePass123").await;
    let access = extract_cookie(&response, "access_token").unwrap();

    let response = reqwest::Client::new()
        .get(format!("{}/api/me", &app.address))
        .header("Cookie", format!("access_token={}", access))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "john@example.com");
}

#[tokio::test]
async fn todos_work_through_the_gate_and_not_around_it() {
    let app = spawn_app();
    register_user(&app, "john@example.com", "SecurePass123").await;
    let response = login(&app, "john@example.com", "SecurePass123").await;
    let access = extract_cookie(&response, "access_token").unwrap();
    let cookie = format!("access_token={}", access);

    let client = reqwest::Client::new();

    // No cookie: the gate rejects before any todo logic runs.
    let response = client
        .post(format!("{}/api/todos", &app.address))
        .json(&json!({ "date": "2026-09-01T09:00:00Z", "title": "file taxes" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = client
        .post(format!("{}/api/todos", &app.address))
        .header("Cookie", &cookie)
        .json(&json!({ "date": "2026-09-01T09:00:00Z", "title": "file taxes" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .get(format!("{}/api/todos", &app.address))
        .header("Cookie", &cookie)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let todos: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(todos.as_array().unwrap().len(), 1);
    assert_eq!(todos[0]["title"], "file taxes");

    let response = client
        .delete(format!(
            "{}/api/todos/{}",
            &app.address,
            created["id"].as_str().unwrap()
        ))
        .header("Cookie", &cookie)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());
}
