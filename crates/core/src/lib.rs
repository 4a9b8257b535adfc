//! TeaMall Core - Shared types library.
//!
//! This crate provides the types shared by the storefront client and its tools:
//! - `client` - Session, cart, request gateway and route guard
//! - `cli` - Command-line driver for the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. Everything here is plain data that round-trips through JSON the
//! way the `/api` backend and the persistent store expect it.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, emails, prices, roles, statuses, the response
//!   envelope, user profiles and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
