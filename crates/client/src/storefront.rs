//! Storefront context: owns every piece of client state and wires the hooks
//! between them.
//!
//! Construction order matters only in one direction: session and cart come
//! from the store, the router reads the session, and the gateway's response
//! policy closes the loop through [`ForceLogout`]. Nothing here is global;
//! two `Storefront`s over two stores are fully independent.

use std::sync::Arc;

use teamall_core::UserProfile;
use tracing::instrument;

use crate::api::{Api, Credentials};
use crate::cart::CartState;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::gateway::RequestGateway;
use crate::notify::Notifier;
use crate::policy::{ResponsePolicy, UnauthorizedHandler};
use crate::router::{Location, Router, login_path};
use crate::session::SessionState;
use crate::storage::PersistentStore;

/// Reaction to a 401: drop the session and send the user to the login page,
/// remembering where they were.
pub struct ForceLogout {
    session: Arc<SessionState>,
    router: Arc<Router>,
}

impl ForceLogout {
    #[must_use]
    pub const fn new(session: Arc<SessionState>, router: Arc<Router>) -> Self {
        Self { session, router }
    }
}

impl UnauthorizedHandler for ForceLogout {
    fn on_unauthorized(&self) {
        self.session.logout();

        let current = self.router.current();
        // Already on the login page: keep its pending redirect.
        let target = if current.name == Some("login") {
            current.full_path()
        } else {
            login_path(&current.full_path())
        };

        if let Err(e) = self.router.push(&target) {
            tracing::error!(error = %e, target = %target, "Failed to redirect to login");
        }
    }
}

/// The storefront client.
pub struct Storefront {
    config: ClientConfig,
    store: Arc<dyn PersistentStore>,
    session: Arc<SessionState>,
    cart: Arc<CartState>,
    router: Arc<Router>,
    gateway: RequestGateway,
    api: Api,
}

impl Storefront {
    /// Hydrate session and cart from `store` and build the request layer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::RequestConfig` if the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn PersistentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = Arc::new(SessionState::initialize(store.clone()));
        let cart = Arc::new(CartState::initialize(store.clone()));
        let router = Arc::new(Router::new(session.clone(), notifier.clone()));

        let policy = ResponsePolicy::new(
            session.clone(),
            Arc::new(ForceLogout::new(session.clone(), router.clone())),
            notifier,
        );
        let gateway = RequestGateway::new(&config, policy)?;
        let api = Api::new(&gateway);

        tracing::info!(
            base_url = %config.base_url,
            logged_in = session.is_logged_in(),
            cart_lines = cart.count(),
            "Storefront initialized"
        );

        Ok(Self {
            config,
            store,
            session,
            cart,
            router,
            gateway,
            api,
        })
    }

    /// Sign in, then continue to the page that sent the user to login (the
    /// `redirect` query parameter of the current location) or home.
    ///
    /// # Errors
    ///
    /// Any failure of the login call. Navigation problems fall back to `/`.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Location> {
        let response = self.api.users.login(credentials).await?;
        self.session.set_token(Some(&response.token));

        match response.user {
            Some(user) => self.session.set_user_info(Some(user)),
            None => {
                self.session.refresh_user_info(&self.api.users).await;
            }
        }
        tracing::info!("Logged in");

        let target = self
            .router
            .current()
            .query_value("redirect")
            .map_or_else(|| "/".to_string(), str::to_owned);

        match self.router.push(&target) {
            Ok(location) => Ok(location),
            Err(e) => {
                tracing::warn!(error = %e, target = %target, "Post-login redirect failed");
                Ok(self.router.push("/")?)
            }
        }
    }

    /// Sign out. The backend call is best effort; the local session is
    /// always cleared.
    ///
    /// # Errors
    ///
    /// Only if the login page cannot be entered.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Location> {
        if let Err(e) = self.api.users.logout().await {
            tracing::warn!(error = %e, "Backend logout failed");
        }
        self.session.logout();
        Ok(self.router.push("/login")?)
    }

    /// Whether the stored session is still accepted by the backend.
    pub async fn check_login_state(&self) -> bool {
        self.session.check_login_state(&self.api.users).await
    }

    /// Re-fetch the signed-in user's profile.
    pub async fn refresh_user_info(&self) -> Option<UserProfile> {
        self.session.refresh_user_info(&self.api.users).await
    }

    /// Guarded navigation.
    ///
    /// # Errors
    ///
    /// `ClientError::Navigation` if the path does not resolve.
    pub fn navigate(&self, full_path: &str) -> Result<Location> {
        Ok(self.router.push(full_path)?)
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn PersistentStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub const fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    #[must_use]
    pub const fn api(&self) -> &Api {
        &self.api
    }
}
