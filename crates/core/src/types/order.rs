//! Order types.
//!
//! An [`Order`] is one offer of transport capacity or one request for a
//! pickup, tied to an address and a time window. Orders are immutable once
//! stored; the only mutation is deletion.

use core::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::datetime::{self, DateTimeError, parse_datetime};
use super::id::{OrderId, UserId};

/// Errors raised while building a [`NewOrder`] from client input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The order type is neither `"0"` nor `"1"`.
    #[error("invalid order type '{0}', expected \"0\" (offer) or \"1\" (request)")]
    UnknownKind(String),
    /// The start datetime could not be parsed.
    #[error("invalid start: {0}")]
    InvalidStart(DateTimeError),
    /// The end datetime could not be parsed.
    #[error("invalid end: {0}")]
    InvalidEnd(DateTimeError),
    /// An offer was submitted without an end datetime.
    #[error("end is required for offers")]
    MissingEnd,
    /// An offer window ends before it starts.
    #[error("end must not be before start")]
    EndBeforeStart,
}

/// Whether an order offers a ride or asks for one.
///
/// On the wire an offer is `"0"` and a request is `"1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    /// Available transport capacity over a time window.
    Offer,
    /// A desired pickup at a specific time.
    Request,
}

impl OrderKind {
    /// Parse the wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownKind`] for anything but `"0"` or `"1"`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim() {
            "0" => Ok(Self::Offer),
            "1" => Ok(Self::Request),
            other => Err(ValidationError::UnknownKind(other.to_owned())),
        }
    }

    /// The wire representation (`"0"` or `"1"`).
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Offer => "0",
            Self::Request => "1",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offer => f.write_str("offer"),
            Self::Request => f.write_str("request"),
        }
    }
}

impl Serialize for OrderKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for OrderKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The time window of an order.
///
/// For a request only `start` is meaningful and `end` is `None`. For an offer
/// `end` is supplied by the caller (start plus the offered duration); the
/// store never computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window.
    #[serde(with = "datetime::wire")]
    pub start: NaiveDateTime,
    /// End of the window (offers only).
    #[serde(with = "datetime::wire::option")]
    pub end: Option<NaiveDateTime>,
}

impl TimeWindow {
    /// Whether `instant` falls inside `[start, end]`, bounds included.
    ///
    /// A window without an end contains nothing.
    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.end
            .is_some_and(|end| self.start <= instant && instant <= end)
    }
}

/// A validated order that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// User placing the order.
    pub owner: UserId,
    /// Offer or request.
    pub kind: OrderKind,
    /// Pickup address, compared by exact string equality.
    pub address: String,
    /// Time window.
    pub window: TimeWindow,
}

impl NewOrder {
    /// Build a new order from typed parts.
    ///
    /// A request's `end` is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingEnd`] for an offer without an end and
    /// [`ValidationError::EndBeforeStart`] for an inverted offer window.
    pub fn new(
        owner: UserId,
        kind: OrderKind,
        address: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<Self, ValidationError> {
        let end = match kind {
            OrderKind::Request => None,
            OrderKind::Offer => {
                let end = end.ok_or(ValidationError::MissingEnd)?;
                if end < start {
                    return Err(ValidationError::EndBeforeStart);
                }
                Some(end)
            }
        };

        Ok(Self {
            owner,
            kind,
            address: address.into(),
            window: TimeWindow { start, end },
        })
    }

    /// Build a new order from raw wire fields.
    ///
    /// An empty `end` is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown type, a malformed
    /// datetime, or an invalid offer window.
    pub fn parse(
        owner: UserId,
        kind: &str,
        address: impl Into<String>,
        start: &str,
        end: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let kind = OrderKind::parse(kind)?;
        let start = parse_datetime(start).map_err(ValidationError::InvalidStart)?;
        let end = match end.map(str::trim).filter(|e| !e.is_empty()) {
            // Requests ignore end, so a malformed one is not worth rejecting
            Some(raw) if kind == OrderKind::Offer => {
                Some(parse_datetime(raw).map_err(ValidationError::InvalidEnd)?)
            }
            _ => None,
        };
        Self::new(owner, kind, address, start, end)
    }
}

/// A stored order.
///
/// Serializes to the wire shape
/// `{"id","start","end","type","address","userid"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identifier.
    pub id: OrderId,
    /// Time window.
    #[serde(flatten)]
    pub window: TimeWindow,
    /// Offer or request.
    #[serde(rename = "type")]
    pub kind: OrderKind,
    /// Pickup address.
    pub address: String,
    /// User who placed the order.
    #[serde(rename = "userid")]
    pub owner: UserId,
}

impl Order {
    /// Attach a store-assigned id to a validated order.
    #[must_use]
    pub fn from_new(id: OrderId, order: NewOrder) -> Self {
        Self {
            id,
            window: order.window,
            kind: order.kind,
            address: order.address,
            owner: order.owner,
        }
    }

    /// Whether this order is an offer.
    #[must_use]
    pub fn is_offer(&self) -> bool {
        self.kind == OrderKind::Offer
    }

    /// Whether this order is a request.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.kind == OrderKind::Request
    }
}
