//! Rideshare server library.
//!
//! This crate provides the HTTP adapter and the geocode subsystem as a
//! library, allowing them to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod envelope;
pub mod error;
pub mod geocode;
pub mod middleware;
pub mod routes;
pub mod state;
