//! Identifier newtypes.
//!
//! [`OrderId`] is assigned by the [`OrderStore`](crate::OrderStore) from a
//! monotonically increasing counter and travels over the wire as a decimal
//! string. [`UserId`] is an opaque caller-supplied string; it is never
//! validated.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a stored order.
///
/// Serializes as a string (`"42"`) for wire compatibility with existing
/// clients.
///
/// ```
/// use rideshare_core::OrderId;
///
/// let id: OrderId = "42".parse().unwrap();
/// assert_eq!(id, OrderId::new(42));
/// assert!("abc".parse::<OrderId>().is_err());
/// assert!("042".parse::<OrderId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(u64);

impl OrderId {
    /// Create a new ID from a u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not the canonical form of an [`OrderId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order id '{0}'")]
pub struct InvalidOrderId(String);

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    /// Only the form produced by `Display` is accepted: ASCII digits with no
    /// sign, whitespace or leading zero. `"000"` names no order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'));
        if !canonical {
            return Err(InvalidOrderId(s.to_owned()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidOrderId(s.to_owned()))
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for u64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl Serialize for OrderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a participant.
///
/// Opaque: any string is accepted, comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the user ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}
