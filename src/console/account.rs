//! Account records and the roster they form.
//!
//! `AccountId` is the single identity key shared by selection, dispatch and
//! rendering. On the wire it is the backend's `_id` field. Payloads that carry
//! `id` instead, or both keys, are accepted with `_id` taking precedence. The
//! identifier is echoed back in mutation bodies exactly as received, string or
//! number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Backend-assigned account identifier, never mutated locally.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountId {
    Number(u64),
    Text(String),
}

impl fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
}

impl AccountStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAccount")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub last_login: Option<DateTime<Utc>>,
    pub status: AccountStatus,
}

/// Wire shape: either id key (or both), either last-login spelling.
#[derive(Deserialize)]
struct RawAccount {
    #[serde(default, rename = "_id")]
    underscore_id: Option<AccountId>,
    #[serde(default)]
    id: Option<AccountId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    last_login: Option<DateTime<Utc>>,
    #[serde(default, rename = "lastLogin")]
    last_login_camel: Option<DateTime<Utc>>,
    status: AccountStatus,
}

impl TryFrom<RawAccount> for Account {
    type Error = String;

    fn try_from(raw: RawAccount) -> Result<Self, Self::Error> {
        let id = raw
            .underscore_id
            .or(raw.id)
            .ok_or_else(|| "account without `_id` or `id`".to_string())?;
        Ok(Self {
            id,
            name: raw.name,
            email: raw.email,
            last_login: raw.last_login.or(raw.last_login_camel),
            status: raw.status,
        })
    }
}

impl Account {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }
}

/// Accounts in server response order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    accounts: Vec<Account>,
}

impl Roster {
    #[must_use]
    pub const fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Identifiers currently visible, in roster order.
    pub fn ids(&self) -> impl Iterator<Item = &AccountId> {
        self.accounts.iter().map(|account| &account.id)
    }

    #[must_use]
    pub fn id_set(&self) -> BTreeSet<AccountId> {
        self.ids().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, id: &AccountId) -> bool {
        self.accounts.iter().any(|account| &account.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| &account.id == id)
    }

    /// Resolves an identifier typed by an operator against the roster.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&AccountId> {
        let label = label.trim();
        self.ids().find(|id| id.to_string() == label)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.accounts.iter().filter(|account| account.is_active()).count()
    }

    /// Copy of the roster with `status` applied to every targeted account.
    #[must_use]
    pub fn with_status(&self, targets: &BTreeSet<AccountId>, status: AccountStatus) -> Self {
        let accounts = self
            .accounts
            .iter()
            .map(|account| {
                if targets.contains(&account.id) {
                    Account {
                        status,
                        ..account.clone()
                    }
                } else {
                    account.clone()
                }
            })
            .collect();
        Self { accounts }
    }

    /// Copy of the roster without the targeted accounts.
    #[must_use]
    pub fn without(&self, targets: &BTreeSet<AccountId>) -> Self {
        let accounts = self
            .accounts
            .iter()
            .filter(|account| !targets.contains(&account.id))
            .cloned()
            .collect();
        Self { accounts }
    }
}

impl From<Vec<Account>> for Roster {
    fn from(accounts: Vec<Account>) -> Self {
        Self::new(accounts)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Account;
    type IntoIter = std::slice::Iter<'a, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}
