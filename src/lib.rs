//! # rosterctl (Roster Moderation Console)
//!
//! `rosterctl` lets an operator sign in against an account-management service,
//! inspect the roster of managed accounts and apply bulk moderation actions
//! (block, unblock, delete) to a selection of them.
//!
//! ## Reconciliation Model
//!
//! Every bulk action is a two-phase commit:
//!
//! 1. **Projection:** once the backend accepts the mutation, the intended effect
//!    (status flip or removal) is applied to the local roster and the
//!    zero-active-accounts invariant is evaluated immediately.
//! 2. **Confirmation:** if the operator keeps access, the roster is fetched again
//!    and replaces the projection with server state.
//!
//! When no account remains active, or the backend rejects the session token,
//! the session is cleared and the console navigates back to the login surface.
//!
//! ## Account Identity
//!
//! Accounts are keyed by one canonical identifier (`AccountId`). Selection,
//! dispatch and rendering all use it; nothing infers identity per call.

pub mod cli;
pub mod console;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
