//! Client for the external login/register backend.

use crate::config::AuthConfig;
use crate::models::Role;
use crate::services::metrics::{record_auth_request, record_error};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::{debug, error, info, instrument, warn};
use validator::{Validate, ValidationError, ValidationErrors};

const LOGIN_FALLBACK: &str = "Error logging in";
const REGISTER_FALLBACK: &str = "Error registering user";

fn required(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("length");
    err.message = Some(message.into());
    err
}

/// Both credentials must be non-empty. The password is only looked at
/// through `expose_secret`, never copied.
fn validate_credentials(username: &str, password: &Secret<String>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if username.is_empty() {
        errors.add("username", required("Username is required"));
    }
    if password.expose_secret().is_empty() {
        errors.add("password", required("Password is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: Secret<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_credentials(&self.username, &self.password)
    }
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    fn wire(&self) -> Credentials<'_> {
        Credentials {
            username: &self.username,
            password: self.password.expose_secret(),
            role: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: Secret<String>,
    pub role: Option<Role>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_credentials(&self.username, &self.password)
    }
}

impl RegisterRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    fn wire(&self) -> Credentials<'_> {
        Credentials {
            username: &self.username,
            password: self.password.expose_secret(),
            role: self.role.as_ref(),
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a Role>,
}

/// Whatever the backend put in its JSON body. Missing or non-JSON bodies
/// read as all-`None`.
#[derive(Debug, Default, Deserialize)]
struct AuthBody {
    token: Option<String>,
    role: Option<Role>,
    message: Option<String>,
}

/// A logged-in user. The caller keeps the token for later requests.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: Secret<String>,
    pub role: Role,
}

impl AuthSession {
    pub fn landing_route(&self) -> &'static str {
        self.role.landing_route()
    }
}

#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated(AuthSession),
    Registered { message: Option<String> },
    /// The backend answered with a non-success status.
    Rejected { status: u16, message: String },
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    /// Text for the login/register form's status line.
    pub fn message(&self) -> String {
        match self {
            Self::Authenticated(session) => {
                format!("Login successful. Role: {}", session.role.as_str())
            }
            Self::Registered { message } => message
                .clone()
                .unwrap_or_else(|| "Registration successful".to_string()),
            Self::Rejected { message, .. } => message.clone(),
        }
    }
}

pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/auth/login`.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthOutcome, AppError> {
        request.validate()?;

        let (status, body) = self.post("login", "/auth/login", &request.wire()).await?;
        if !status.is_success() {
            return Ok(rejected("login", status, body, LOGIN_FALLBACK));
        }

        match (body.token, body.role) {
            (Some(token), Some(role)) if !token.is_empty() => {
                info!(role = role.as_str(), "Login succeeded");
                record_auth_request("login", "success");
                Ok(AuthOutcome::Authenticated(AuthSession {
                    token: Secret::new(token),
                    role,
                }))
            }
            _ => {
                warn!(status = status.as_u16(), "Login response carried no token or role");
                record_auth_request("login", "invalid_response");
                record_error("bad_gateway");
                Err(AppError::BadGateway(
                    "Login response is missing token or role".to_string(),
                ))
            }
        }
    }

    /// `POST {base}/auth/register`.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthOutcome, AppError> {
        request.validate()?;

        let (status, body) = self.post("register", "/auth/register", &request.wire()).await?;
        if !status.is_success() {
            return Ok(rejected("register", status, body, REGISTER_FALLBACK));
        }

        info!("Registration succeeded");
        record_auth_request("register", "success");
        Ok(AuthOutcome::Registered {
            message: body.message,
        })
    }

    /// Like [`login`](Self::login), but any failure becomes a `Rejected`
    /// outcome with status 0 and the generic login message.
    pub async fn login_outcome(&self, request: &LoginRequest) -> AuthOutcome {
        self.login(request)
            .await
            .unwrap_or_else(|e| fallback_outcome("login", e, LOGIN_FALLBACK))
    }

    /// Like [`register`](Self::register), with the generic registration
    /// message on failure.
    pub async fn register_outcome(&self, request: &RegisterRequest) -> AuthOutcome {
        self.register(request)
            .await
            .unwrap_or_else(|e| fallback_outcome("register", e, REGISTER_FALLBACK))
    }

    async fn post<B: Serialize>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, AuthBody), AppError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(operation, &url, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(operation, &url, e))?;

        let body = serde_json::from_str(&text).unwrap_or_else(|e| {
            debug!(error = %e, status = status.as_u16(), "Auth response body is not JSON");
            AuthBody::default()
        });
        Ok((status, body))
    }
}

fn rejected(operation: &str, status: StatusCode, body: AuthBody, fallback: &str) -> AuthOutcome {
    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    warn!(operation, status = status.as_u16(), message = %message, "Auth request rejected");
    record_auth_request(operation, "rejected");
    AuthOutcome::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn fallback_outcome(operation: &str, err: AppError, fallback: &str) -> AuthOutcome {
    warn!(operation, error = %err, "Auth request failed; reporting generic message");
    AuthOutcome::Rejected {
        status: 0,
        message: fallback.to_string(),
    }
}

fn transport_error(operation: &str, url: &str, err: reqwest::Error) -> AppError {
    error!("Failed to send POST request to {}: {}", url, err);
    let err = AppError::from(err);
    record_auth_request(operation, err.kind());
    record_error(err.kind());
    err
}
