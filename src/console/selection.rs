//! Checkbox selection for bulk actions.

use crate::console::account::{AccountId, Roster};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    members: BTreeSet<AccountId>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: AccountId) -> bool {
        if self.members.remove(&id) {
            false
        } else {
            self.members.insert(id);
            true
        }
    }

    /// Selects exactly the identifiers currently visible in `roster`.
    pub fn select_all(&mut self, roster: &Roster) {
        self.members = roster.id_set();
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    #[must_use]
    pub const fn members(&self) -> &BTreeSet<AccountId> {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, id: &AccountId) -> bool {
        self.members.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Header checkbox state: a non-empty roster with every row selected.
    #[must_use]
    pub fn all_selected(&self, roster: &Roster) -> bool {
        !roster.is_empty() && roster.ids().all(|id| self.members.contains(id))
    }

    /// Whether every member still refers to an account in `roster`.
    #[must_use]
    pub fn is_subset_of(&self, roster: &Roster) -> bool {
        self.members.iter().all(|id| roster.contains(id))
    }
}
