//! Navigation guard.

use super::routes::RouteMeta;
use super::{Location, SessionView, login_path};

/// Shown when a non-admin tries to open an admin page.
pub const MSG_ADMIN_REQUIRED: &str = "Administrator privileges required";

/// What the guard decided about a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigate here instead. `notice` is shown to the user first.
    Redirect {
        to: String,
        notice: Option<&'static str>,
    },
}

/// Decide whether `target` may be entered with the current session.
///
/// The admin check runs first, so a signed-out visitor of an admin page is
/// sent home with the admin notice rather than to the login page.
#[must_use]
pub fn check(meta: &RouteMeta, target: &Location, session: &dyn SessionView) -> GuardDecision {
    if meta.requires_admin && !session.is_admin() {
        return GuardDecision::Redirect {
            to: "/".to_string(),
            notice: Some(MSG_ADMIN_REQUIRED),
        };
    }

    if meta.requires_auth && !session.is_logged_in() {
        return GuardDecision::Redirect {
            to: login_path(&target.full_path()),
            notice: None,
        };
    }

    if meta.requires_guest && session.is_logged_in() {
        return GuardDecision::Redirect {
            to: "/".to_string(),
            notice: None,
        };
    }

    GuardDecision::Allow
}
