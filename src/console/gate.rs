//! Route-level session guard.
//!
//! UX-only: the gate looks at token presence and nothing else. A stale token is
//! discovered by the first authenticated call that fails, which then routes
//! through the same logout path as the zero-active-accounts invariant.

use crate::console::session::Session;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Admin,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/reg",
            Self::Admin => "/admin",
        }
    }

    /// Maps a path to its route; `/` and unknown paths land on login.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "/admin" => Self::Admin,
            "/reg" => Self::Register,
            _ => Self::Login,
        }
    }

    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

/// Outcome of evaluating the gate for a requested route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up on screen.
    #[must_use]
    pub const fn route(self) -> Route {
        match self {
            Self::Render(route) | Self::Redirect(route) => route,
        }
    }
}

pub struct SessionGate;

impl SessionGate {
    /// Renders `requested` when it is public or a token is present; otherwise
    /// redirects to login.
    #[must_use]
    pub fn guard(requested: Route, session: &Session) -> Navigation {
        if !requested.is_protected() || session.is_present() {
            Navigation::Render(requested)
        } else {
            Navigation::Redirect(Route::Login)
        }
    }
}
