//! HTTP access to the account-management service.
//!
//! `RosterBackend` is the seam between the roster view and the network; the
//! reqwest-backed `HttpBackend` is the production implementation. Every
//! authenticated call sends the session token verbatim in `Authorization` and
//! maps failures onto the console error taxonomy. Token material is never
//! logged.

use crate::console::{
    account::{Account, AccountId},
    dispatcher::BulkAction,
    error::ConsoleError,
    login::{Credentials, LoginError, LoginResponse},
};
use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{AUTHORIZATION, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{Instrument, debug, info_span};
use url::Url;

/// Default request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters carried into error messages.
const MAX_ERROR_CHARS: usize = 200;

pub const USERS_PATH: &str = "/users";
pub const LOGIN_PATH: &str = "/login";

#[async_trait]
pub trait RosterBackend: Send + Sync {
    /// `GET /users`.
    async fn list_accounts(&self, token: &SecretString) -> Result<Vec<Account>, ConsoleError>;

    /// Batch mutation for `action` over `ids`.
    async fn apply(
        &self,
        action: BulkAction,
        ids: &[AccountId],
        token: &SecretString,
    ) -> Result<(), ConsoleError>;

    /// `POST /login`.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError>;
}

#[derive(Serialize)]
struct IdsBody<'a> {
    ids: &'a [AccountId],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ConsoleError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }
}

/// Joins `path` onto `base_url` without doubling or dropping slashes.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn authorization(token: &SecretString) -> Result<HeaderValue, ConsoleError> {
    let mut value = HeaderValue::from_str(token.expose_secret()).map_err(|_| {
        ConsoleError::Validation("session token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Maps transport errors into `ConsoleError::Network` with timeout detection.
fn map_request_error(err: &reqwest::Error) -> ConsoleError {
    if err.is_timeout() {
        ConsoleError::Network("Request timed out. Please try again.".to_string())
    } else {
        ConsoleError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Trims and truncates error bodies, preferring a JSON `error`/`message` field.
fn sanitize_body(body: &str) -> Option<String> {
    let extracted = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.or(parsed.message));
    let text = extracted.as_deref().unwrap_or(body).trim();

    if text.is_empty() {
        None
    } else {
        Some(text.chars().take(MAX_ERROR_CHARS).collect())
    }
}

async fn failure_message(response: Response) -> Option<String> {
    let body = response.text().await.unwrap_or_default();
    sanitize_body(&body)
}

/// Classifies a non-success status into the console error taxonomy.
fn classify(status: StatusCode, message: Option<String>) -> ConsoleError {
    let message = message.unwrap_or_else(|| "Request failed.".to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ConsoleError::Authorization {
            status: status.as_u16(),
        },
        status if status.is_client_error() => {
            ConsoleError::Validation(format!("{}: {message}", status.as_u16()))
        }
        status => ConsoleError::Network(format!("server error {}: {message}", status.as_u16())),
    }
}

async fn expect_success(response: Response) -> Result<Response, ConsoleError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(classify(status, failure_message(response).await))
    }
}

#[async_trait]
impl RosterBackend for HttpBackend {
    async fn list_accounts(&self, token: &SecretString) -> Result<Vec<Account>, ConsoleError> {
        let url = self.endpoint(USERS_PATH);
        let span = info_span!("roster.list", http.method = "GET", url = %url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, authorization(token)?)
            .send()
            .instrument(span)
            .await
            .map_err(|err| map_request_error(&err))?;

        let accounts = expect_success(response)
            .await?
            .json::<Vec<Account>>()
            .await
            .map_err(|err| ConsoleError::Network(format!("Failed to decode response: {err}")))?;

        debug!(count = accounts.len(), "roster fetched");
        Ok(accounts)
    }

    async fn apply(
        &self,
        action: BulkAction,
        ids: &[AccountId],
        token: &SecretString,
    ) -> Result<(), ConsoleError> {
        let url = self.endpoint(action.path());
        let body = IdsBody { ids };
        let span = info_span!(
            "roster.apply",
            action = action.as_str(),
            http.method = action.http_method(),
            url = %url,
            targets = ids.len()
        );

        let request = match action {
            BulkAction::Block | BulkAction::Unblock => self.client.put(&url),
            BulkAction::Delete => self.client.delete(&url),
        };

        let response = request
            .header(AUTHORIZATION, authorization(token)?)
            .json(&body)
            .send()
            .instrument(span)
            .await
            .map_err(|err| map_request_error(&err))?;

        expect_success(response).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
        let url = self.endpoint(LOGIN_PATH);
        let span = info_span!("roster.login", http.method = "POST", url = %url);

        let response = self
            .client
            .post(&url)
            .json(&credentials.to_body())
            .send()
            .instrument(span)
            .await
            .map_err(|err| LoginError::Console(map_request_error(&err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoginError::Rejected {
                status: status.as_u16(),
                message: failure_message(response).await,
            });
        }

        response.json::<LoginResponse>().await.map_err(|err| {
            LoginError::Console(ConsoleError::Network(format!(
                "Failed to decode response: {err}"
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_with_base_handles_slashes() {
        assert_eq!(
            build_url_with_base("https://api.example.com/", "/users"),
            "https://api.example.com/users"
        );
        assert_eq!(
            build_url_with_base("https://api.example.com/v1", "users/block"),
            "https://api.example.com/v1/users/block"
        );
        assert_eq!(build_url_with_base("", "/users"), "/users");
    }

    #[test]
    fn classify_maps_status_to_taxonomy() {
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, None),
            ConsoleError::Authorization { status: 401 }
        );
        assert_eq!(
            classify(StatusCode::FORBIDDEN, Some("nope".into())),
            ConsoleError::Authorization { status: 403 }
        );
        assert_eq!(
            classify(StatusCode::BAD_REQUEST, Some("ids required".into())),
            ConsoleError::Validation("400: ids required".to_string())
        );
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, None),
            ConsoleError::Network(_)
        ));
    }

    #[test]
    fn sanitize_body_prefers_json_error_field() {
        assert_eq!(
            sanitize_body(r#"{"error":"Invalid credentials"}"#),
            Some("Invalid credentials".to_string())
        );
        assert_eq!(
            sanitize_body(r#"{"message":"Token expired"}"#),
            Some("Token expired".to_string())
        );
        assert_eq!(sanitize_body("  plain text  "), Some("plain text".to_string()));
        assert_eq!(sanitize_body("   "), None);
        assert_eq!(sanitize_body(&"x".repeat(500)).map(|s| s.len()), Some(200));
    }

    #[test]
    fn authorization_header_is_sensitive() {
        let header = authorization(&SecretString::from("tok".to_string())).unwrap();
        assert!(header.is_sensitive());
        assert!(authorization(&SecretString::from("bad\ntoken".to_string())).is_err());
    }
}
