//! Subcommand implementations.

pub mod auth;
pub mod browse;
pub mod cart;
