use crate::console::{ApiConfig, ConsoleError, FileSessionStore, HttpBackend, Session};
use std::{path::PathBuf, sync::Arc, time::Duration};
use url::Url;

#[derive(Clone, Debug)]
pub struct GlobalArgs {
    pub api: ApiConfig,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: Url, timeout_seconds: u64, state_dir: PathBuf) -> Self {
        Self {
            api: ApiConfig::new(api_url).with_timeout(Duration::from_secs(timeout_seconds)),
            state_dir,
        }
    }

    /// Session persisted under the state directory, scoped to the API origin.
    ///
    /// # Errors
    /// Returns an error if the API URL has no host.
    pub fn session(&self) -> Result<Session, ConsoleError> {
        let store = FileSessionStore::for_origin(&self.state_dir, &self.api.base_url)?;
        Ok(Session::new(Arc::new(store)))
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn backend(&self) -> Result<Arc<HttpBackend>, ConsoleError> {
        HttpBackend::new(&self.api).map(Arc::new)
    }
}
