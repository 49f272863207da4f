mod common;

use common::init_tracing;
use invoice_reconciliation::config::AuthConfig;
use invoice_reconciliation::models::Role;
use invoice_reconciliation::services::{AuthClient, AuthOutcome, LoginRequest, RegisterRequest};
use secrecy::ExposeSecret;
use serde_json::json;
use service_core::error::AppError;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AuthClient {
    AuthClient::new(&AuthConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn test_admin_login_lands_on_admin() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "root", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1", "role": "admin" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .login(&LoginRequest::new("root", "pw"))
        .await
        .unwrap();

    match outcome {
        AuthOutcome::Authenticated(session) => {
            assert_eq!(session.token.expose_secret(), "tok-1");
            assert_eq!(session.role, Role::Admin);
            assert_eq!(session.landing_route(), "/admin");
        }
        other => panic!("expected a session, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_login_lands_on_dashboard() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-2", "role": "user" })),
        )
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .login(&LoginRequest::new("jdoe", "pw"))
        .await
        .unwrap();

    assert_eq!(outcome.message(), "Login successful. Role: user");
    let AuthOutcome::Authenticated(session) = outcome else {
        panic!("expected a session");
    };
    assert_eq!(session.landing_route(), "/dashboard");
}

#[tokio::test]
async fn test_rejected_login_carries_backend_message() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .login(&LoginRequest::new("jdoe", "wrong"))
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert!(matches!(outcome, AuthOutcome::Rejected { status: 401, .. }));
    assert_eq!(outcome.message(), "Invalid credentials");
}

#[tokio::test]
async fn test_rejection_without_message_uses_fallback() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let login = client.login(&LoginRequest::new("a", "b")).await.unwrap();
    assert_eq!(login.message(), "Error logging in");

    let register = client.register(&RegisterRequest::new("a", "b")).await.unwrap();
    assert!(matches!(register, AuthOutcome::Rejected { status: 409, .. }));
    assert_eq!(register.message(), "Error registering user");
}

#[tokio::test]
async fn test_login_without_token_is_bad_gateway() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "role": "user" })))
        .mount(&server)
        .await;

    let result = client_for(&server).login(&LoginRequest::new("a", "b")).await;
    assert!(matches!(result, Err(AppError::BadGateway(_))));
}

#[tokio::test]
async fn test_register_posts_role() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({ "username": "new", "password": "pw", "role": "user" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "message": "User registered" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .register(&RegisterRequest::new("new", "pw").with_role(Role::User))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.message(), "User registered");
}

#[tokio::test]
async fn test_empty_credentials_never_reach_backend() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).login(&LoginRequest::new("", "pw")).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "t", "role": "user" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = AuthClient::new(&AuthConfig {
        base_url: server.uri(),
        timeout: Duration::from_millis(100),
    })
    .unwrap();
    let result = client.login(&LoginRequest::new("a", "b")).await;
    assert!(matches!(result, Err(AppError::GatewayTimeout(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    init_tracing();
    let client = AuthClient::new(&AuthConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let result = client.login(&LoginRequest::new("a", "b")).await;
    assert!(matches!(result, Err(AppError::BadGateway(_))));
}

#[tokio::test]
async fn test_unreachable_backend_renders_generic_messages() {
    init_tracing();
    let client = AuthClient::new(&AuthConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let login = client.login_outcome(&LoginRequest::new("a", "b")).await;
    assert!(matches!(login, AuthOutcome::Rejected { status: 0, .. }));
    assert_eq!(login.message(), "Error logging in");

    let register = client.register_outcome(&RegisterRequest::new("a", "b")).await;
    assert_eq!(register.message(), "Error registering user");
}

#[tokio::test]
async fn test_outcome_helpers_pass_success_through() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok", "role": "admin" })),
        )
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .login_outcome(&LoginRequest::new("root", "pw"))
        .await;
    assert_eq!(outcome.message(), "Login successful. Role: admin");
}
