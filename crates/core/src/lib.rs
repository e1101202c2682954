//! DevMart Core - Shared types library.
//!
//! This crate provides common types used across all DevMart components:
//! - `storefront` - REST client, cart, checkout and session management
//! - `cli` - Command-line front end for shoppers and administrators
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, statuses
//!   and backend timestamps

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
