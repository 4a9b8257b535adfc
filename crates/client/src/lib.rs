//! TeaMall storefront client library.
//!
//! The session, cart and request layer of the storefront: everything between
//! the views and the `/api` backend that has state to keep consistent.
//!
//! # Components
//!
//! - [`storage`] - Durable string key-value store (`token`, `userInfo`, `cartItems`)
//! - [`session`] - Token and user profile, mirrored to the store on every mutation
//! - [`cart`] - Cart lines keyed by `(id, spec)`, mirrored to the store on every mutation
//! - [`gateway`] - The single egress point; attaches the bearer token
//! - [`policy`] - Classifies responses and drives token rotation, logout and notices
//! - [`router`] - Route table and the navigation guard
//! - [`api`] - Typed wrappers over the backend endpoints
//! - [`storefront`] - Wires the above together without globals
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use teamall_client::{ClientConfig, Storefront, notify::TracingNotifier, storage::FileStore};
//!
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(FileStore::open(&config.store_path)?);
//! let shop = Storefront::new(config, store, Arc::new(TracingNotifier))?;
//!
//! shop.router().push("/cart")?; // redirected to /login?redirect=/cart
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod policy;
pub mod router;
pub mod session;
pub mod storage;
pub mod storefront;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use storefront::Storefront;
