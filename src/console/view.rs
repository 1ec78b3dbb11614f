//! Roster view state machine.
//!
//! ```text
//! Loading -> Ready -> Mutating -> Ready
//!                              -> LoggedOut
//! ```
//!
//! `LoggedOut` is terminal for the session; only a fresh login followed by
//! `restart` produces a new `Loading`. Each network step is split into a
//! `begin_*` call that snapshots what the request needs and a `complete_*` /
//! `finish_*` call that applies the response, so a front-end can run the
//! request on its own task. Responses carry the session epoch they were issued
//! under; anything arriving after a logout is discarded.

use crate::console::{
    account::{AccountId, Roster},
    client::RosterBackend,
    dispatcher::{AppliedAction, BulkAction, BulkActionDispatcher},
    error::{ActionError, ConsoleError, Operation},
    fetcher::RosterFetcher,
    gate::{Navigation, Route, SessionGate},
    reconciler::RosterReconciler,
    selection::SelectionSet,
    session::Session,
};
use secrecy::SecretString;
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Ready,
    Mutating(BulkAction),
    LoggedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoutReason {
    /// The last active account was blocked or deleted.
    NoActiveAccounts,
    /// The backend rejected the session token.
    SessionRejected,
    /// No token was stored when an authenticated call was needed.
    MissingSession,
    /// The operator logged out.
    Operator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed(ActionError),
    Discarded,
    LoggedOut(LogoutReason),
}

/// Result of applying a dispatcher response to the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyStep {
    /// Projection applied; the roster must be refetched to confirm it.
    Projected,
    Failed(ActionError),
    Discarded,
    LoggedOut(LogoutReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The operator kept access. `confirmed` is false when the follow-up fetch
    /// failed and the view still shows the local projection.
    Reconciled { confirmed: bool },
    LoggedOut(LogoutReason),
    Discarded,
}

#[derive(Debug)]
pub struct FetchTicket {
    epoch: u64,
    token: SecretString,
}

impl FetchTicket {
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

#[derive(Debug)]
pub struct ApplyTicket {
    epoch: u64,
    action: BulkAction,
    targets: BTreeSet<AccountId>,
    token: SecretString,
}

impl ApplyTicket {
    #[must_use]
    pub const fn action(&self) -> BulkAction {
        self.action
    }

    #[must_use]
    pub const fn targets(&self) -> &BTreeSet<AccountId> {
        &self.targets
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

pub struct RosterView<B: ?Sized> {
    session: Session,
    fetcher: RosterFetcher<B>,
    dispatcher: BulkActionDispatcher<B>,
    state: ViewState,
    roster: Roster,
    selection: SelectionSet,
    error: Option<ActionError>,
    logout_reason: Option<LogoutReason>,
    session_error: Option<ConsoleError>,
    epoch: u64,
}

impl<B: RosterBackend + ?Sized> RosterView<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        Self {
            session,
            fetcher: RosterFetcher::new(Arc::clone(&backend)),
            dispatcher: BulkActionDispatcher::new(backend),
            state: ViewState::Loading,
            roster: Roster::default(),
            selection: SelectionSet::new(),
            error: None,
            logout_reason: None,
            session_error: None,
            epoch: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ViewState {
        self.state
    }

    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ActionError> {
        self.error.as_ref()
    }

    /// User-visible message for the last failed operation.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ActionError::user_message)
    }

    #[must_use]
    pub const fn logout_reason(&self) -> Option<LogoutReason> {
        self.logout_reason
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Where the console should be: the roster view, or login once logged out
    /// or when the gate finds no token.
    #[must_use]
    pub fn navigation(&self) -> Navigation {
        if self.state == ViewState::LoggedOut {
            Navigation::Redirect(Route::Login)
        } else {
            SessionGate::guard(Route::Admin, &self.session)
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.state, ViewState::Mutating(_))
    }

    /// Toggles `id`; returns `None` when the id is not in the roster.
    pub fn toggle(&mut self, id: &AccountId) -> Option<bool> {
        if self.roster.contains(id) {
            Some(self.selection.toggle(id.clone()))
        } else {
            debug!("ignoring toggle for unknown account {id}");
            None
        }
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.roster);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Header checkbox: select every visible row or none.
    pub fn set_all_selected(&mut self, checked: bool) {
        if checked {
            self.select_all();
        } else {
            self.clear_selection();
        }
    }

    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.roster)
    }

    /// Initial load of the roster view.
    pub async fn mount(&mut self) -> FetchOutcome {
        if self.state != ViewState::LoggedOut {
            self.state = ViewState::Loading;
        }
        self.refresh().await
    }

    /// Replaces the roster with server state.
    pub async fn refresh(&mut self) -> FetchOutcome {
        let ticket = match self.begin_fetch() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        let result = self.fetcher.fetch(ticket.token()).await;
        self.complete_fetch(ticket, result)
    }

    /// Snapshots the token for a roster fetch.
    ///
    /// # Errors
    /// Returns the final outcome when no fetch should be sent: the view is
    /// logged out, or there is no session (which logs the view out).
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, FetchOutcome> {
        if self.state == ViewState::LoggedOut {
            return Err(FetchOutcome::Discarded);
        }
        match self.session.get() {
            Ok(Some(token)) => Ok(FetchTicket {
                epoch: self.epoch,
                token,
            }),
            Ok(None) => Err(self.fetch_logout(LogoutReason::MissingSession)),
            Err(err) => {
                let err = ActionError::new(Operation::Fetch, err);
                self.settle_loading();
                self.error = Some(err.clone());
                Err(FetchOutcome::Failed(err))
            }
        }
    }

    /// Applies a fetch response. Stale responses are dropped; failures keep
    /// the previous roster.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Roster, ActionError>,
    ) -> FetchOutcome {
        if ticket.epoch != self.epoch || self.state == ViewState::LoggedOut {
            debug!("discarding roster response from a previous session");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(roster) => {
                self.roster = roster;
                self.selection.clear();
                self.error = None;
                self.settle_loading();
                FetchOutcome::Applied
            }
            Err(err) if err.is_authorization() => self.fetch_logout(LogoutReason::SessionRejected),
            Err(err) => {
                self.settle_loading();
                self.error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        }
    }

    /// Runs a bulk action over the current selection: dispatch, project,
    /// enforce the invariant, then confirm with a fetch.
    ///
    /// # Errors
    /// Returns the `ActionError` when the action cannot start or the backend
    /// rejects it for a reason other than authorization.
    pub async fn apply(&mut self, action: BulkAction) -> Result<ApplyOutcome, ActionError> {
        let ticket = self.begin_apply(action)?;
        let result = self
            .dispatcher
            .apply(ticket.action, &ticket.targets, &ticket.token)
            .await;

        match self.finish_apply(ticket, result) {
            ApplyStep::Projected => Ok(match self.refresh().await {
                FetchOutcome::Applied => ApplyOutcome::Reconciled { confirmed: true },
                FetchOutcome::LoggedOut(reason) => ApplyOutcome::LoggedOut(reason),
                FetchOutcome::Failed(_) => ApplyOutcome::Reconciled { confirmed: false },
                FetchOutcome::Discarded => ApplyOutcome::Discarded,
            }),
            ApplyStep::Failed(err) => Err(err),
            ApplyStep::LoggedOut(reason) => Ok(ApplyOutcome::LoggedOut(reason)),
            ApplyStep::Discarded => Ok(ApplyOutcome::Discarded),
        }
    }

    /// Enters `Mutating` and snapshots the selection and token.
    ///
    /// # Errors
    /// Returns an `ActionError` when another action is in flight, the roster
    /// is not loaded, or there is no session.
    pub fn begin_apply(&mut self, action: BulkAction) -> Result<ApplyTicket, ActionError> {
        let operation = action.operation();
        match self.state {
            ViewState::Mutating(pending) => {
                warn!("refusing {action} while {pending} is in flight");
                return Err(ActionError::new(
                    operation,
                    ConsoleError::Validation(format!("{pending} is still in progress")),
                ));
            }
            ViewState::Loading => {
                return Err(ActionError::new(
                    operation,
                    ConsoleError::Validation("roster is not loaded".to_string()),
                ));
            }
            ViewState::LoggedOut => {
                return Err(ActionError::new(operation, ConsoleError::missing_token()));
            }
            ViewState::Ready => {}
        }

        let token = match self.session.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                let source = self
                    .force_logout(LogoutReason::MissingSession)
                    .err()
                    .unwrap_or_else(ConsoleError::missing_token);
                return Err(ActionError::new(operation, source));
            }
            Err(err) => return Err(ActionError::new(operation, err)),
        };

        self.state = ViewState::Mutating(action);
        self.error = None;
        Ok(ApplyTicket {
            epoch: self.epoch,
            action,
            targets: self.selection.members().clone(),
            token,
        })
    }

    /// Applies a dispatcher response: on success clears the selection,
    /// projects the effect and evaluates the zero-active-accounts invariant.
    pub fn finish_apply(
        &mut self,
        ticket: ApplyTicket,
        result: Result<AppliedAction, ActionError>,
    ) -> ApplyStep {
        if ticket.epoch != self.epoch || self.state == ViewState::LoggedOut {
            debug!("discarding {} response from a previous session", ticket.action);
            return ApplyStep::Discarded;
        }
        self.state = ViewState::Ready;
        let applied_operation = ticket.action.operation();

        let applied = match result {
            Ok(applied) => applied,
            Err(err) if err.is_authorization() => {
                return self.apply_logout(applied_operation, LogoutReason::SessionRejected);
            }
            Err(err) => {
                self.error = Some(err.clone());
                return ApplyStep::Failed(err);
            }
        };

        self.selection.clear();
        let reconciliation = RosterReconciler::reconcile(&self.roster, &applied);
        if reconciliation.must_logout {
            info!("no active accounts remain after {}", applied.action);
            return self.apply_logout(applied_operation, LogoutReason::NoActiveAccounts);
        }

        debug!(
            active = reconciliation.active_count,
            "projected {} locally",
            applied.action
        );
        self.roster = reconciliation.roster;
        ApplyStep::Projected
    }

    /// Operator-initiated logout.
    ///
    /// # Errors
    /// Returns the storage error when the token could not be removed. The view
    /// is logged out either way.
    pub fn logout(&mut self) -> Result<LogoutReason, ConsoleError> {
        self.force_logout(LogoutReason::Operator)
    }

    /// Storage error from the last logout, if the token could not be removed.
    #[must_use]
    pub const fn session_error(&self) -> Option<&ConsoleError> {
        self.session_error.as_ref()
    }

    /// Leaves `LoggedOut` after a fresh login; returns false when there is
    /// still no session.
    pub fn restart(&mut self) -> bool {
        if !self.session.is_present() {
            return false;
        }
        self.state = ViewState::Loading;
        self.logout_reason = None;
        self.session_error = None;
        self.error = None;
        true
    }

    fn settle_loading(&mut self) {
        if self.state == ViewState::Loading {
            self.state = ViewState::Ready;
        }
    }

    fn fetch_logout(&mut self, reason: LogoutReason) -> FetchOutcome {
        match self.force_logout(reason) {
            Ok(reason) => FetchOutcome::LoggedOut(reason),
            Err(err) => FetchOutcome::Failed(ActionError::new(Operation::Fetch, err)),
        }
    }

    fn apply_logout(&mut self, operation: Operation, reason: LogoutReason) -> ApplyStep {
        match self.force_logout(reason) {
            Ok(reason) => ApplyStep::LoggedOut(reason),
            Err(err) => ApplyStep::Failed(ActionError::new(operation, err)),
        }
    }

    /// Ends the session locally. The view is logged out even when the token
    /// cannot be removed; that failure is returned and kept in `session_error`.
    fn force_logout(&mut self, reason: LogoutReason) -> Result<LogoutReason, ConsoleError> {
        self.epoch += 1;
        self.state = ViewState::LoggedOut;
        self.roster = Roster::default();
        self.selection.clear();
        self.error = None;
        self.logout_reason = Some(reason);

        if let Err(err) = self.session.clear() {
            error!(?reason, "failed to clear session: {err}");
            self.session_error = Some(err.clone());
            return Err(err);
        }
        self.session_error = None;
        info!(?reason, "session ended");
        Ok(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{
        account::{AccountStatus, fixtures::roster},
        testing::{FakeBackend, StuckSessionStore},
    };

    fn view_with(server: Roster) -> (Arc<FakeBackend>, RosterView<FakeBackend>) {
        let backend = Arc::new(FakeBackend::with_roster(server));
        let session = Session::in_memory();
        session
            .set(SecretString::from(FakeBackend::TOKEN.to_string()))
            .unwrap();
        let view = RosterView::new(Arc::clone(&backend), session);
        (backend, view)
    }

    fn id(value: u64) -> AccountId {
        AccountId::Number(value)
    }

    #[tokio::test]
    async fn mount_loads_roster_and_becomes_ready() {
        let (backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Blocked)]));
        assert_eq!(view.state(), ViewState::Loading);

        assert_eq!(view.mount().await, FetchOutcome::Applied);
        assert_eq!(view.state(), ViewState::Ready);
        assert_eq!(view.roster().len(), 2);
        assert_eq!(backend.list_calls(), 1);
        assert_eq!(view.navigation(), Navigation::Render(Route::Admin));
    }

    #[tokio::test]
    async fn block_everyone_logs_out_and_clears_session() {
        let (_backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));
        view.toggle(&id(2));

        let outcome = view.apply(BulkAction::Block).await.unwrap();

        assert_eq!(outcome, ApplyOutcome::LoggedOut(LogoutReason::NoActiveAccounts));
        assert_eq!(view.state(), ViewState::LoggedOut);
        assert!(!view.session().is_present());
        assert!(view.roster().is_empty());
        assert_eq!(view.navigation(), Navigation::Redirect(Route::Login));
    }

    #[tokio::test]
    async fn blocking_last_active_account_logs_out() {
        let (backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Blocked)]));
        view.mount().await;
        view.toggle(&id(1));

        let outcome = view.apply(BulkAction::Block).await.unwrap();

        assert_eq!(outcome, ApplyOutcome::LoggedOut(LogoutReason::NoActiveAccounts));
        // the projection is discarded, no confirmation fetch is sent
        assert_eq!(backend.list_calls(), 1);
    }

    #[tokio::test]
    async fn unblock_keeps_session_and_refetches() {
        let (backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Blocked), (2, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));

        let outcome = view.apply(BulkAction::Unblock).await.unwrap();

        assert_eq!(outcome, ApplyOutcome::Reconciled { confirmed: true });
        assert_eq!(backend.list_calls(), 2);
        assert!(view.roster().iter().all(|a| a.status == AccountStatus::Active));
        assert!(view.selection().is_empty());
        assert!(view.session().is_present());
    }

    #[tokio::test]
    async fn delete_removes_account_and_empties_selection() {
        let (_backend, mut view) = view_with(roster(&[
            (1, AccountStatus::Active),
            (2, AccountStatus::Active),
            (3, AccountStatus::Active),
        ]));
        view.mount().await;
        view.toggle(&id(2));

        view.apply(BulkAction::Delete).await.unwrap();

        assert_eq!(
            view.roster().ids().cloned().collect::<Vec<_>>(),
            vec![id(1), id(3)]
        );
        assert!(view.selection().is_empty());
    }

    #[tokio::test]
    async fn fetch_authorization_failure_logs_out_without_retry() {
        let (backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        backend.fail_next_list(ConsoleError::Authorization { status: 401 });

        let outcome = view.mount().await;

        assert_eq!(outcome, FetchOutcome::LoggedOut(LogoutReason::SessionRejected));
        assert_eq!(backend.list_calls(), 1);
        assert!(!view.session().is_present());
        assert_eq!(view.navigation(), Navigation::Redirect(Route::Login));
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_roster() {
        let (backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));
        backend.fail_next_list(ConsoleError::Network("reset".to_string()));

        let outcome = view.refresh().await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(view.roster().len(), 1);
        assert_eq!(
            view.error_message().as_deref(),
            Some("Failed to fetch users. Please try again.")
        );
        assert_eq!(view.state(), ViewState::Ready);
    }

    #[tokio::test]
    async fn failed_action_mutates_nothing() {
        let (backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));
        backend.fail_next_apply(ConsoleError::Validation("400: bad".to_string()));

        let err = view.apply(BulkAction::Block).await.unwrap_err();

        assert_eq!(err.user_message(), "Failed to block users. Please try again.");
        assert_eq!(view.state(), ViewState::Ready);
        assert_eq!(view.roster().active_count(), 2);
        assert!(view.selection().contains(&id(1)));
        assert_eq!(backend.list_calls(), 1);
    }

    #[tokio::test]
    async fn action_authorization_failure_logs_out() {
        let (backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));
        backend.fail_next_apply(ConsoleError::Authorization { status: 403 });

        let outcome = view.apply(BulkAction::Delete).await.unwrap();

        assert_eq!(outcome, ApplyOutcome::LoggedOut(LogoutReason::SessionRejected));
        assert!(!view.session().is_present());
    }

    #[tokio::test]
    async fn projection_is_kept_when_confirmation_fails() {
        let (backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));

        let ticket = view.begin_apply(BulkAction::Block).unwrap();
        assert_eq!(view.state(), ViewState::Mutating(BulkAction::Block));
        let applied = AppliedAction {
            action: ticket.action(),
            targets: ticket.targets().clone(),
        };

        // phase 1: local projection
        assert_eq!(view.finish_apply(ticket, Ok(applied)), ApplyStep::Projected);
        assert_eq!(
            view.roster().get(&id(1)).map(|a| a.status),
            Some(AccountStatus::Blocked)
        );

        // phase 2: confirmation fetch fails, projection stays
        backend.fail_next_list(ConsoleError::Network("reset".to_string()));
        assert!(matches!(view.refresh().await, FetchOutcome::Failed(_)));
        assert_eq!(view.roster().active_count(), 1);
    }

    #[tokio::test]
    async fn confirmation_replaces_projection_with_server_state() {
        let (backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));

        let ticket = view.begin_apply(BulkAction::Block).unwrap();
        let applied = AppliedAction {
            action: ticket.action(),
            targets: ticket.targets().clone(),
        };
        view.finish_apply(ticket, Ok(applied));

        // server diverged from the projection (e.g. another operator)
        backend.set_roster(roster(&[(2, AccountStatus::Active), (4, AccountStatus::Active)]));
        assert_eq!(view.refresh().await, FetchOutcome::Applied);
        assert_eq!(view.roster().id_set(), BTreeSet::from([id(2), id(4)]));
    }

    #[tokio::test]
    async fn second_action_is_refused_while_mutating() {
        let (_backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));

        let _pending = view.begin_apply(BulkAction::Unblock).unwrap();
        let err = view.begin_apply(BulkAction::Delete).unwrap_err();

        assert_eq!(err.operation, Operation::Delete);
        assert!(view.is_busy());
    }

    #[tokio::test]
    async fn late_fetch_after_logout_is_discarded() {
        let (_backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        view.mount().await;

        let ticket = view.begin_fetch().unwrap();
        view.logout().unwrap();
        let outcome = view.complete_fetch(ticket, Ok(roster(&[(9, AccountStatus::Active)])));

        assert_eq!(outcome, FetchOutcome::Discarded);
        assert!(view.roster().is_empty());
        assert_eq!(view.state(), ViewState::LoggedOut);
    }

    #[tokio::test]
    async fn late_action_response_after_logout_is_discarded() {
        let (_backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        view.mount().await;
        view.toggle(&id(1));

        let ticket = view.begin_apply(BulkAction::Delete).unwrap();
        let applied = AppliedAction {
            action: ticket.action(),
            targets: ticket.targets().clone(),
        };
        view.logout().unwrap();

        assert_eq!(view.finish_apply(ticket, Ok(applied)), ApplyStep::Discarded);
        assert_eq!(view.logout_reason(), Some(LogoutReason::Operator));
    }

    #[tokio::test]
    async fn toggle_ignores_unknown_ids_and_refresh_resets_selection() {
        let (_backend, mut view) =
            view_with(roster(&[(1, AccountStatus::Active), (2, AccountStatus::Active)]));
        view.mount().await;

        assert_eq!(view.toggle(&id(7)), None);
        view.set_all_selected(true);
        assert!(view.all_selected());
        assert!(view.selection().is_subset_of(view.roster()));

        view.refresh().await;
        assert!(view.selection().is_empty());
    }

    #[tokio::test]
    async fn missing_session_logs_out_on_mount() {
        let backend = Arc::new(FakeBackend::with_roster(roster(&[(1, AccountStatus::Active)])));
        let mut view = RosterView::new(Arc::clone(&backend), Session::in_memory());

        let outcome = view.mount().await;

        assert_eq!(outcome, FetchOutcome::LoggedOut(LogoutReason::MissingSession));
        assert_eq!(backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn restart_requires_fresh_login() {
        let (_backend, mut view) = view_with(roster(&[(1, AccountStatus::Active)]));
        view.mount().await;
        view.logout().unwrap();
        assert!(!view.restart());

        view.session()
            .set(SecretString::from(FakeBackend::TOKEN.to_string()))
            .unwrap();
        assert!(view.restart());
        assert_eq!(view.state(), ViewState::Loading);
        assert_eq!(view.mount().await, FetchOutcome::Applied);
        assert_eq!(view.roster().len(), 1);
    }

    #[tokio::test]
    async fn failed_session_clear_is_reported() {
        let backend = Arc::new(FakeBackend::with_roster(roster(&[
            (1, AccountStatus::Active),
            (2, AccountStatus::Blocked),
        ])));
        let session = Session::new(Arc::new(StuckSessionStore));
        let mut view = RosterView::new(backend, session);
        view.mount().await;
        view.toggle(&id(1));

        let err = view.apply(BulkAction::Block).await.unwrap_err();

        assert_eq!(err.operation, Operation::Block);
        assert!(matches!(err.source, ConsoleError::Session(_)));
        assert_eq!(view.state(), ViewState::LoggedOut);
        assert!(view.session().is_present());
        assert!(matches!(view.session_error(), Some(ConsoleError::Session(_))));
        assert!(view.logout().is_err());
    }

    #[tokio::test]
    async fn rejected_token_with_stuck_store_fails_fetch() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail_next_list(ConsoleError::Authorization { status: 401 });
        let mut view = RosterView::new(backend, Session::new(Arc::new(StuckSessionStore)));

        let outcome = view.mount().await;

        assert!(matches!(
            outcome,
            FetchOutcome::Failed(ActionError {
                source: ConsoleError::Session(_),
                ..
            })
        ));
        assert_eq!(view.state(), ViewState::LoggedOut);
    }
}
