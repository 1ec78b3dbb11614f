//! Projection of a bulk action onto the roster and the zero-active-accounts
//! invariant.
//!
//! The console must not stay usable against a roster with no active accounts:
//! blocking or deleting everyone (the operator included, when listed) costs the
//! operator their session.

use crate::console::{
    account::Roster,
    dispatcher::{AppliedAction, Effect},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub roster: Roster,
    pub active_count: usize,
    pub must_logout: bool,
}

pub struct RosterReconciler;

impl RosterReconciler {
    /// Applies the intended effect of `applied` to `roster`.
    #[must_use]
    pub fn reconcile(roster: &Roster, applied: &AppliedAction) -> Reconciliation {
        let roster = match applied.effect() {
            Effect::SetStatus(status) => roster.with_status(&applied.targets, status),
            Effect::Remove => roster.without(&applied.targets),
        };
        let active_count = roster.active_count();

        Reconciliation {
            roster,
            active_count,
            must_logout: active_count == 0,
        }
    }
}
