//! Session token storage.
//!
//! `Session` is the context object handed to every component that needs the
//! token. Its only capabilities are get, set and clear; where the token lives is
//! decided by the `SessionStore` it wraps. The token is opaque: nothing here
//! checks its shape, only the backend decides whether it is valid.

use crate::console::error::ConsoleError;
use secrecy::{ExposeSecret, SecretString};
use std::{
    fmt, fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tracing::debug;
use url::Url;

/// File name used for the token inside an origin directory.
pub const TOKEN_KEY: &str = "token";

pub trait SessionStore: Send + Sync {
    /// Returns the stored token, or `None` when there is no session.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self) -> Result<Option<SecretString>, ConsoleError>;

    /// Replaces the stored token.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, token: SecretString) -> Result<(), ConsoleError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), ConsoleError>;
}

/// Process-local store, used by tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<SecretString>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::from(token.to_string()))),
        }
    }
}

fn poisoned() -> ConsoleError {
    ConsoleError::Session("session lock poisoned".to_string())
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<SecretString>, ConsoleError> {
        Ok(self.token.read().map_err(|_| poisoned())?.clone())
    }

    fn set(&self, token: SecretString) -> Result<(), ConsoleError> {
        *self.token.write().map_err(|_| poisoned())? = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), ConsoleError> {
        *self.token.write().map_err(|_| poisoned())? = None;
        Ok(())
    }
}

/// Durable store keeping one token file per backend origin, so a token issued
/// by one service is never presented to another.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Builds a store for the origin (scheme, host, port) of `api_url`.
    ///
    /// # Errors
    /// Returns an error if the URL has no host.
    pub fn for_origin(state_dir: &Path, api_url: &Url) -> Result<Self, ConsoleError> {
        let key = origin_key(api_url)?;
        Ok(Self {
            path: state_dir.join(key).join(TOKEN_KEY),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Filesystem-safe key for the origin of `url`, e.g. `https_api.example.com_443`.
///
/// # Errors
/// Returns an error if the URL has no host.
pub fn origin_key(url: &Url) -> Result<String, ConsoleError> {
    let host = url
        .host_str()
        .ok_or_else(|| ConsoleError::Config(format!("API URL has no host: {url}")))?;
    let port = url.port_or_known_default().unwrap_or_default();
    let host: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    Ok(format!("{}_{host}_{port}", url.scheme()))
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> ConsoleError {
    ConsoleError::Session(format!("failed to {action} {}: {err}", path.display()))
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<SecretString>, ConsoleError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_string())))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error("read", &self.path, &err)),
        }
    }

    fn set(&self, token: SecretString) -> Result<(), ConsoleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error("create", parent, &err))?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|err| io_error("open", &self.path, &err))?;
        file.write_all(token.expose_secret().as_bytes())
            .map_err(|err| io_error("write", &self.path, &err))?;

        debug!("session token stored at {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), ConsoleError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("session token removed from {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &self.path, &err)),
        }
    }
}

/// Injectable session handle shared by the gate, the roster view and login.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn get(&self) -> Result<Option<SecretString>, ConsoleError> {
        self.store.get()
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn set(&self, token: SecretString) -> Result<(), ConsoleError> {
        self.store.set(token)
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), ConsoleError> {
        self.store.clear()
    }

    /// Token presence; a read failure counts as no session.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self.store.get(), Ok(Some(_)))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("present", &self.is_present())
            .finish()
    }
}
