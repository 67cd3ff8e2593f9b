//! Match results.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::datetime;
use super::id::UserId;
use super::order::Order;

/// A compatible offer/request pair.
///
/// Derived on every query and never stored. The wire shape uses "hire" for
/// the request side:
/// `{"start","hire_userid","hire_address","offer_userid","offer_address"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Start of the offer's window.
    #[serde(rename = "start", with = "datetime::wire")]
    pub window_start: NaiveDateTime,
    /// Owner of the request.
    #[serde(rename = "hire_userid")]
    pub request_owner: UserId,
    /// Address of the request.
    #[serde(rename = "hire_address")]
    pub request_address: String,
    /// Owner of the offer.
    #[serde(rename = "offer_userid")]
    pub offer_owner: UserId,
    /// Address of the offer.
    #[serde(rename = "offer_address")]
    pub offer_address: String,
}

impl Match {
    /// Build the match for an offer and a request.
    #[must_use]
    pub fn between(offer: &Order, request: &Order) -> Self {
        Self {
            window_start: offer.window.start,
            request_owner: request.owner.clone(),
            request_address: request.address.clone(),
            offer_owner: offer.owner.clone(),
            offer_address: offer.address.clone(),
        }
    }
}
