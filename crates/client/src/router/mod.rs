//! Client-side router: resolves paths against the route table and runs the
//! navigation guard before committing a location.
//!
//! The router only sees the session through [`SessionView`], so it can be
//! built before (and independently of) the request layer.

pub mod guard;
mod routes;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::notify::{Notice, Notifier};

pub use guard::{GuardDecision, MSG_ADMIN_REQUIRED};
pub use routes::{ROUTES, RouteDef, RouteMeta, match_route};

/// Hops (static redirects plus guard redirects) followed before giving up.
const MAX_REDIRECTS: usize = 8;

/// Read-only view of the session used by the guard.
pub trait SessionView: Send + Sync {
    fn is_logged_in(&self) -> bool;
    fn is_admin(&self) -> bool;
}

/// Navigation failures. The current location is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("No route matches {0}")]
    NoMatch(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),
}

/// A resolved, committed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Decoded query pairs, in the order given.
    pub query: Vec<(String, String)>,
    pub name: Option<&'static str>,
    pub params: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

impl Location {
    /// Path plus query string, e.g. `/login?redirect=/cart`.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_query_value(k), encode_query_value(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }

    /// First value of query parameter `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn home() -> Self {
        Self {
            path: "/".to_string(),
            query: Vec::new(),
            name: Some("home"),
            params: BTreeMap::new(),
            meta: RouteMeta::default(),
        }
    }
}

/// Login page that returns to `redirect` after signing in.
#[must_use]
pub fn login_path(redirect: &str) -> String {
    format!("/login?redirect={}", encode_query_value(redirect))
}

/// Percent-encode a query component, leaving `/` readable.
fn encode_query_value(value: &str) -> String {
    urlencoding::encode(value).replace("%2F", "/")
}

fn split_full_path(full_path: &str) -> (&str, Vec<(String, String)>) {
    let (path, query) = full_path.split_once('?').unwrap_or((full_path, ""));

    let query = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_query_value(k), decode_query_value(v))
        })
        .collect();

    let path = if path.is_empty() { "/" } else { path };
    (path, query)
}

fn decode_query_value(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), std::borrow::Cow::into_owned)
}

/// Guarded navigation over [`ROUTES`].
pub struct Router {
    session: Arc<dyn SessionView>,
    notifier: Arc<dyn Notifier>,
    current: RwLock<Location>,
}

impl Router {
    /// A router positioned at `/`.
    #[must_use]
    pub fn new(session: Arc<dyn SessionView>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            notifier,
            current: RwLock::new(Location::home()),
        }
    }

    /// The committed location.
    #[must_use]
    pub fn current(&self) -> Location {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `full_path`, following static and guard redirects.
    ///
    /// Returns the location actually committed, which differs from the
    /// request whenever a redirect fired.
    ///
    /// # Errors
    ///
    /// `NoMatch` if the path (or a redirect target) is not in the route table,
    /// `RedirectLoop` if redirects do not settle. The current location is left
    /// unchanged in both cases.
    pub fn push(&self, full_path: &str) -> Result<Location, NavigationError> {
        let mut target = full_path.to_owned();

        for _ in 0..MAX_REDIRECTS {
            let (path, query) = split_full_path(&target);
            let matched =
                match_route(ROUTES, path).ok_or_else(|| NavigationError::NoMatch(path.to_owned()))?;

            if let Some(to) = matched.route.redirect {
                tracing::debug!(from = %path, to, "Static redirect");
                target = Location {
                    path: to.to_owned(),
                    query,
                    name: None,
                    params: BTreeMap::new(),
                    meta: RouteMeta::default(),
                }
                .full_path();
                continue;
            }

            let location = Location {
                path: path.to_owned(),
                query,
                name: matched.route.name,
                params: matched.params,
                meta: matched.route.meta,
            };

            match guard::check(&location.meta, &location, self.session.as_ref()) {
                GuardDecision::Allow => {
                    tracing::debug!(path = %location.full_path(), "Navigated");
                    *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                        location.clone();
                    return Ok(location);
                }
                GuardDecision::Redirect { to, notice } => {
                    tracing::debug!(from = %location.full_path(), to = %to, "Guard redirect");
                    if let Some(message) = notice {
                        self.notifier.notify(Notice::error(message));
                    }
                    target = to;
                }
            }
        }

        tracing::warn!(target = %full_path, "Redirect limit reached");
        Err(NavigationError::RedirectLoop(full_path.to_owned()))
    }
}
