//! DevMart Storefront library.
//!
//! Client-side storefront for the DevMart REST backend: typed API access
//! with a query cache, a persisted cart, checkout, session management, form
//! validation and route guarding. Front ends (the `devmart` CLI) drive it
//! through [`state::AppState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;
