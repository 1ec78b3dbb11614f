//! Roster moderation core: session handling, backend access, selection, bulk
//! dispatch and reconciliation. Nothing here knows about the command line.

pub mod account;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod humanize;
pub mod login;
pub mod reconciler;
pub mod selection;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use self::{
    account::{Account, AccountId, AccountStatus, Roster},
    client::{ApiConfig, HttpBackend, RosterBackend},
    dispatcher::{AppliedAction, BulkAction, BulkActionDispatcher},
    error::{ActionError, ConsoleError, Operation},
    fetcher::RosterFetcher,
    gate::{Navigation, Route, SessionGate},
    reconciler::{Reconciliation, RosterReconciler},
    selection::SelectionSet,
    session::{FileSessionStore, MemorySessionStore, Session, SessionStore},
    view::{ApplyOutcome, FetchOutcome, LogoutReason, RosterView, ViewState},
};
