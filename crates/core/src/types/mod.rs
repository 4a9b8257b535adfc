//! Core types for the TeaMall storefront client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod envelope;
pub mod id;
pub mod price;
pub mod status;
pub mod user;

pub use cart::CartItem;
pub use email::{Email, EmailError};
pub use envelope::{Envelope, EnvelopeError, SUCCESS_CODE};
pub use id::*;
pub use price::{line_total, sum_amounts};
pub use status::*;
pub use user::{UserProfile, UserRole};
