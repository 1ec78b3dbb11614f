//! Operator sign-in. The login endpoint issues the opaque token that the
//! session store keeps; nothing here inspects the token itself.

use crate::console::{
    account::AccountId, client::RosterBackend, error::ConsoleError, session::Session,
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Backend error text for a rejected login; the service uses it for blocked accounts.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl Credentials {
    #[must_use]
    pub fn new(email: &str, password: SecretString) -> Self {
        Self {
            email: email.trim().to_string(),
            password,
        }
    }

    pub(crate) fn to_body(&self) -> LoginBody<'_> {
        LoginBody {
            email: &self.email,
            password: self.password.expose_secret(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawLoginUser")]
pub struct LoginUser {
    pub id: Option<AccountId>,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
struct RawLoginUser {
    #[serde(default, rename = "_id")]
    underscore_id: Option<AccountId>,
    #[serde(default)]
    id: Option<AccountId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl From<RawLoginUser> for LoginUser {
    fn from(raw: RawLoginUser) -> Self {
        Self {
            id: raw.underscore_id.or(raw.id),
            name: raw.name,
            email: raw.email,
        }
    }
}

#[derive(Deserialize)]
struct RawLoginResponse {
    token: String,
    user: LoginUser,
}

#[derive(Deserialize)]
#[serde(from = "RawLoginResponse")]
pub struct LoginResponse {
    pub token: SecretString,
    pub user: LoginUser,
}

impl From<RawLoginResponse> for LoginResponse {
    fn from(raw: RawLoginResponse) -> Self {
        Self {
            token: SecretString::from(raw.token),
            user: raw.user,
        }
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginResponse")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("login rejected ({status})")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

impl LoginError {
    /// Message shown on the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail => "Please enter a valid email address.".to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } if message == INVALID_CREDENTIALS => {
                "You're blocked. Please contact support.".to_string()
            }
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } | Self::Console(_) => {
                "Login failed. Please try again.".to_string()
            }
        }
    }
}

#[must_use]
pub fn welcome_message(user: &LoginUser) -> String {
    format!("Welcome back, {}!", user.name)
}

/// Signs in and stores the issued token in `session`.
///
/// # Errors
/// Returns a `LoginError` if the email is malformed, the backend rejects the
/// credentials, or the token cannot be stored.
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn login<B: RosterBackend + ?Sized>(
    backend: &B,
    session: &Session,
    credentials: &Credentials,
) -> Result<LoginUser, LoginError> {
    if !valid_email(&credentials.email) {
        return Err(LoginError::InvalidEmail);
    }

    let response = backend.login(credentials).await.inspect_err(|err| {
        warn!("login failed: {err}");
    })?;
    session.set(response.token)?;

    info!("operator signed in");
    Ok(response.user)
}
