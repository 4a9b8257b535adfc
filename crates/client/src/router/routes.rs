//! Route table and path matching.

use std::collections::BTreeMap;

/// Access requirements of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
    /// Only reachable while signed out (login, register).
    pub requires_guest: bool,
    pub title: Option<&'static str>,
}

impl RouteMeta {
    const PUBLIC: Self = Self {
        requires_auth: false,
        requires_admin: false,
        requires_guest: false,
        title: None,
    };

    const AUTH: Self = Self {
        requires_auth: true,
        ..Self::PUBLIC
    };

    const GUEST: Self = Self {
        requires_guest: true,
        ..Self::PUBLIC
    };

    const ADMIN: Self = Self {
        requires_auth: true,
        requires_admin: true,
        ..Self::PUBLIC
    };

    const fn titled(self, title: &'static str) -> Self {
        Self {
            title: Some(title),
            ..self
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteDef {
    /// Pattern; `:name` segments capture a parameter.
    pub pattern: &'static str,
    pub name: Option<&'static str>,
    pub meta: RouteMeta,
    /// Unconditional redirect applied before the guard runs.
    pub redirect: Option<&'static str>,
}

impl RouteDef {
    const fn page(pattern: &'static str, name: &'static str, meta: RouteMeta) -> Self {
        Self {
            pattern,
            name: Some(name),
            meta,
            redirect: None,
        }
    }

    const fn redirect(pattern: &'static str, to: &'static str) -> Self {
        Self {
            pattern,
            name: None,
            meta: RouteMeta::PUBLIC,
            redirect: Some(to),
        }
    }
}

/// The storefront's pages.
pub const ROUTES: &[RouteDef] = &[
    RouteDef::page("/", "home", RouteMeta::PUBLIC),
    RouteDef::page("/products", "products", RouteMeta::PUBLIC),
    RouteDef::page("/product/:id", "product-detail", RouteMeta::PUBLIC),
    RouteDef::page("/user", "user", RouteMeta::AUTH),
    RouteDef::page("/cart", "cart", RouteMeta::AUTH),
    RouteDef::redirect("/orders", "/order/list"),
    RouteDef::page("/addresses", "addresses", RouteMeta::AUTH),
    RouteDef::page("/admin/products", "admin-products", RouteMeta::ADMIN),
    RouteDef::page("/login", "login", RouteMeta::GUEST),
    RouteDef::page("/register", "register", RouteMeta::GUEST),
    RouteDef::page("/order/list", "order-list", RouteMeta::AUTH.titled("My Orders")),
    RouteDef::page(
        "/order/settlement",
        "order-settlement",
        RouteMeta::AUTH.titled("Checkout"),
    ),
    RouteDef::page(
        "/order/detail/:id",
        "order-detail",
        RouteMeta::AUTH.titled("Order Details"),
    ),
    RouteDef::page(
        "/review/create/:id",
        "review-create",
        RouteMeta::AUTH.titled("Write a Review"),
    ),
];

/// A route that matched a path, with captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: &'static RouteDef,
    pub params: BTreeMap<String, String>,
}

/// Find the first route in `routes` matching `path`.
///
/// Trailing slashes are ignored and parameter segments never match an empty
/// segment.
#[must_use]
pub fn match_route(routes: &'static [RouteDef], path: &str) -> Option<RouteMatch> {
    let segments: Vec<&str> = split_segments(path).collect();

    routes.iter().find_map(|route| {
        let pattern: Vec<&str> = split_segments(route.pattern).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, actual) in pattern.iter().zip(&segments) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_owned(), (*actual).to_owned());
            } else if expected != actual {
                return None;
            }
        }
        Some(RouteMatch { route, params })
    })
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_static_routes() {
        let m = match_route(ROUTES, "/").map(|m| m.route.name);
        assert_eq!(m, Some(Some("home")));

        let m = match_route(ROUTES, "/cart/").map(|m| m.route.name);
        assert_eq!(m, Some(Some("cart")));
    }

    #[test]
    fn test_match_captures_params() {
        let m = match_route(ROUTES, "/order/detail/1024");
        let m = m.map(|m| (m.route.name, m.params.get("id").cloned()));
        assert_eq!(m, Some((Some("order-detail"), Some("1024".to_string()))));
    }

    #[test]
    fn test_no_match() {
        assert!(match_route(ROUTES, "/product").is_none());
        assert!(match_route(ROUTES, "/product/1/reviews").is_none());
        assert!(match_route(ROUTES, "/checkout").is_none());
    }

    #[test]
    fn test_meta_flags() {
        let admin = match_route(ROUTES, "/admin/products").map(|m| m.route.meta);
        assert_eq!(
            admin.map(|m| (m.requires_auth, m.requires_admin, m.requires_guest)),
            Some((true, true, false))
        );

        let settle = match_route(ROUTES, "/order/settlement").map(|m| m.route.meta.title);
        assert_eq!(settle, Some(Some("Checkout")));
    }
}
