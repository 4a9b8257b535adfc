//! Typed wrappers over the backend's REST endpoints.
//!
//! Every wrapper is a thin handle on the shared [`RequestGateway`]; cloning
//! one is cheap. Users and the cart have typed payloads; catalog, order,
//! address and review payloads are passed through as JSON since their rules
//! live on the server.

mod addresses;
mod cart;
mod categories;
mod orders;
mod products;
mod reviews;
mod users;

pub use addresses::AddressesApi;
pub use cart::CartApi;
pub use categories::CategoriesApi;
pub use orders::{DEFAULT_PAYMENT_METHOD, OrdersApi};
pub use products::ProductsApi;
pub use reviews::ReviewsApi;
pub use users::{Credentials, LoginResponse, PasswordChange, Registration, UsersApi};

use crate::gateway::RequestGateway;

/// All endpoint groups over one gateway.
#[derive(Clone)]
pub struct Api {
    pub users: UsersApi,
    pub cart: CartApi,
    pub products: ProductsApi,
    pub categories: CategoriesApi,
    pub orders: OrdersApi,
    pub addresses: AddressesApi,
    pub reviews: ReviewsApi,
}

impl Api {
    #[must_use]
    pub fn new(gateway: &RequestGateway) -> Self {
        Self {
            users: UsersApi::new(gateway.clone()),
            cart: CartApi::new(gateway.clone()),
            products: ProductsApi::new(gateway.clone()),
            categories: CategoriesApi::new(gateway.clone()),
            orders: OrdersApi::new(gateway.clone()),
            addresses: AddressesApi::new(gateway.clone()),
            reviews: ReviewsApi::new(gateway.clone()),
        }
    }
}
