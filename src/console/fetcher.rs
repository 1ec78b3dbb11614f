//! Authenticated roster reads.

use crate::console::{
    account::Roster,
    client::RosterBackend,
    error::{ActionError, Operation},
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{instrument, warn};

pub struct RosterFetcher<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for RosterFetcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: RosterBackend + ?Sized> RosterFetcher<B> {
    #[must_use]
    pub const fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Reads the full roster. The caller keeps its previous roster on error.
    ///
    /// # Errors
    /// Returns an `ActionError` tagged `fetch` on transport or authorization failure.
    #[instrument(skip_all)]
    pub async fn fetch(&self, token: &SecretString) -> Result<Roster, ActionError> {
        self.backend
            .list_accounts(token)
            .await
            .map(Roster::from)
            .map_err(|err| {
                warn!("roster fetch failed: {err}");
                ActionError::new(Operation::Fetch, err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{
        account::{AccountStatus, fixtures::roster},
        error::ConsoleError,
        testing::FakeBackend,
    };

    #[tokio::test]
    async fn fetch_returns_server_order() {
        let server = roster(&[(3, AccountStatus::Active), (1, AccountStatus::Blocked)]);
        let backend = Arc::new(FakeBackend::with_roster(server.clone()));
        let fetcher = RosterFetcher::new(backend);

        let fetched = fetcher
            .fetch(&SecretString::from("tok".to_string()))
            .await
            .unwrap();
        assert_eq!(fetched, server);
    }

    #[tokio::test]
    async fn fetch_failure_is_tagged() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_next_list(ConsoleError::Authorization { status: 401 });
        let fetcher = RosterFetcher::new(backend);

        let err = fetcher
            .fetch(&SecretString::from("tok".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.operation, Operation::Fetch);
        assert!(err.is_authorization());
    }
}
