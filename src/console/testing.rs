//! In-memory backend for unit tests. It keeps its own copy of the roster and
//! applies accepted mutations to it, so refetches observe server state.

use crate::console::{
    account::{Account, AccountId, AccountStatus, Roster},
    client::RosterBackend,
    dispatcher::BulkAction,
    error::ConsoleError,
    login::{Credentials, INVALID_CREDENTIALS, LoginError, LoginResponse, LoginUser},
    session::SessionStore,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::{collections::BTreeSet, sync::Mutex};

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    calls: Vec<(BulkAction, Vec<AccountId>)>,
    list_calls: usize,
    login_calls: usize,
    fail_next_list: Option<ConsoleError>,
    fail_next_apply: Option<ConsoleError>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub(crate) const PASSWORD: &'static str = "correct horse";
    pub(crate) const TOKEN: &'static str = "fake-token";

    pub(crate) fn with_roster(roster: Roster) -> Self {
        let backend = Self::default();
        backend.set_roster(roster);
        backend
    }

    pub(crate) fn set_roster(&self, roster: Roster) {
        self.state.lock().unwrap().accounts = roster.accounts().to_vec();
    }

    pub(crate) fn fail_next_list(&self, err: ConsoleError) {
        self.state.lock().unwrap().fail_next_list = Some(err);
    }

    pub(crate) fn fail_next_apply(&self, err: ConsoleError) {
        self.state.lock().unwrap().fail_next_apply = Some(err);
    }

    pub(crate) fn calls(&self) -> Vec<(BulkAction, Vec<AccountId>)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.state.lock().unwrap().login_calls
    }
}

#[async_trait]
impl RosterBackend for FakeBackend {
    async fn list_accounts(&self, _token: &SecretString) -> Result<Vec<Account>, ConsoleError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(err) = state.fail_next_list.take() {
            return Err(err);
        }
        Ok(state.accounts.clone())
    }

    async fn apply(
        &self,
        action: BulkAction,
        ids: &[AccountId],
        _token: &SecretString,
    ) -> Result<(), ConsoleError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((action, ids.to_vec()));
        if let Some(err) = state.fail_next_apply.take() {
            return Err(err);
        }

        let targets: BTreeSet<&AccountId> = ids.iter().collect();
        match action {
            BulkAction::Delete => state.accounts.retain(|a| !targets.contains(&a.id)),
            BulkAction::Block | BulkAction::Unblock => {
                let status = if action == BulkAction::Block {
                    AccountStatus::Blocked
                } else {
                    AccountStatus::Active
                };
                for account in &mut state.accounts {
                    if targets.contains(&account.id) {
                        account.status = status;
                    }
                }
            }
        }
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
        self.state.lock().unwrap().login_calls += 1;
        if credentials.password.expose_secret() != Self::PASSWORD {
            return Err(LoginError::Rejected {
                status: 401,
                message: Some(INVALID_CREDENTIALS.to_string()),
            });
        }
        Ok(LoginResponse {
            token: SecretString::from(Self::TOKEN.to_string()),
            user: LoginUser {
                id: None,
                name: "Operator".to_string(),
                email: credentials.email.clone(),
            },
        })
    }
}

/// Session store holding a token that can never be removed.
pub(crate) struct StuckSessionStore;

impl SessionStore for StuckSessionStore {
    fn get(&self) -> Result<Option<SecretString>, ConsoleError> {
        Ok(Some(SecretString::from(FakeBackend::TOKEN.to_string())))
    }

    fn set(&self, _token: SecretString) -> Result<(), ConsoleError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), ConsoleError> {
        Err(ConsoleError::Session("permission denied".to_string()))
    }
}
