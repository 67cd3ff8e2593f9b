//! Rideshare Core - Order store and matching engine.
//!
//! This crate holds the domain of the rideshare service:
//! - [`types`] - Orders, matches, identifiers, and datetime handling
//! - [`store`] - The bounded in-memory [`OrderStore`]
//! - [`matching`] - [`find_matches`], pairing offers with requests
//!
//! # Architecture
//!
//! The core crate contains no I/O, no HTTP, and no internal synchronization.
//! The store assumes one logical actor at a time; callers that serve requests
//! concurrently must wrap it in a single lock covering each whole operation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod matching;
pub mod store;
pub mod types;

pub use matching::find_matches;
pub use store::{DEFAULT_ORDER_CAPACITY, OrderStore, StoreError};
pub use types::*;
