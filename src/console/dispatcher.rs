//! Bulk moderation actions.
//!
//! The dispatcher sends one batch call per action and, on success, reports what
//! was targeted and the intended effect. It never assumes the response echoes
//! the roster; the reconciler projects the effect locally and the view confirms
//! it with a fetch.

use crate::console::{
    account::{AccountId, AccountStatus},
    client::RosterBackend,
    error::{ActionError, ConsoleError, Operation},
};
use secrecy::SecretString;
use std::{collections::BTreeSet, fmt, str::FromStr, sync::Arc};
use tracing::{info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Block,
    Unblock,
    Delete,
}

/// Local projection of a successful bulk action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    SetStatus(AccountStatus),
    Remove,
}

impl BulkAction {
    pub const ALL: [Self; 3] = [Self::Block, Self::Unblock, Self::Delete];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Delete => "delete",
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Block => "/users/block",
            Self::Unblock => "/users/unblock",
            Self::Delete => "/users",
        }
    }

    #[must_use]
    pub const fn http_method(self) -> &'static str {
        match self {
            Self::Block | Self::Unblock => "PUT",
            Self::Delete => "DELETE",
        }
    }

    #[must_use]
    pub const fn effect(self) -> Effect {
        match self {
            Self::Block => Effect::SetStatus(AccountStatus::Blocked),
            Self::Unblock => Effect::SetStatus(AccountStatus::Active),
            Self::Delete => Effect::Remove,
        }
    }

    #[must_use]
    pub const fn operation(self) -> Operation {
        match self {
            Self::Block => Operation::Block,
            Self::Unblock => Operation::Unblock,
            Self::Delete => Operation::Delete,
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "unblock" => Ok(Self::Unblock),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown bulk action: {other}")),
        }
    }
}

/// What a successful dispatch targeted and the effect it should have.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedAction {
    pub action: BulkAction,
    pub targets: BTreeSet<AccountId>,
}

impl AppliedAction {
    #[must_use]
    pub const fn effect(&self) -> Effect {
        self.action.effect()
    }
}

pub struct BulkActionDispatcher<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for BulkActionDispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: RosterBackend + ?Sized> BulkActionDispatcher<B> {
    #[must_use]
    pub const fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Sends `action` for `ids` in one backend call.
    ///
    /// # Errors
    /// Returns an `ActionError` tagged with the action when `ids` is empty or the
    /// backend call fails. Nothing local is touched either way.
    #[instrument(skip(self, ids, token), fields(action = %action, targets = ids.len()))]
    pub async fn apply(
        &self,
        action: BulkAction,
        ids: &BTreeSet<AccountId>,
        token: &SecretString,
    ) -> Result<AppliedAction, ActionError> {
        if ids.is_empty() {
            return Err(ActionError::new(
                action.operation(),
                ConsoleError::Validation("no accounts selected".to_string()),
            ));
        }

        let batch: Vec<AccountId> = ids.iter().cloned().collect();
        match self.backend.apply(action, &batch, token).await {
            Ok(()) => {
                info!("bulk {action} accepted for {} accounts", batch.len());
                Ok(AppliedAction {
                    action,
                    targets: ids.clone(),
                })
            }
            Err(err) => {
                warn!("bulk {action} failed: {err}");
                Err(ActionError::new(action.operation(), err))
            }
        }
    }
}
