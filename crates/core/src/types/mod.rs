//! Core types for the rideshare service.
//!
//! This module provides type-safe wrappers for the order domain.

pub mod datetime;
pub mod id;
pub mod matches;
pub mod order;

pub use datetime::{DateTimeError, format_datetime, parse_datetime};
pub use id::{InvalidOrderId, OrderId, UserId};
pub use matches::Match;
pub use order::{NewOrder, Order, OrderKind, TimeWindow, ValidationError};
