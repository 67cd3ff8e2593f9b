//! Matching engine.
//!
//! Pairs every live offer with every live request that shares its address
//! exactly and whose start falls inside the offer's window (bounds included).
//! The querying user must own one side of the pair.
//!
//! This is a plain O(n²) scan. The store's capacity is small and bounded, so
//! no index is kept. Results are recomputed on every call.

use tracing::debug;

use crate::store::{OrderStore, StoreError};
use crate::types::{Match, Order, UserId};

/// Whether `offer` and `request` form a match visible to `user`.
fn is_match(user: &UserId, offer: &Order, request: &Order) -> bool {
    offer.is_offer()
        && request.is_request()
        && offer.id != request.id
        && (&offer.owner == user || &request.owner == user)
        && offer.address == request.address
        && offer.window.contains(request.window.start)
}

/// Find every match involving `user`.
///
/// Offers form the outer loop and requests the inner one, both in insertion
/// order. Symmetric pairs are not deduplicated.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when there are no matches.
pub fn find_matches(store: &OrderStore, user: &UserId) -> Result<Vec<Match>, StoreError> {
    let matches: Vec<Match> = store
        .iter()
        .filter(|o| o.is_offer())
        .flat_map(|offer| {
            store
                .iter()
                .filter(move |request| is_match(user, offer, request))
                .map(move |request| Match::between(offer, request))
        })
        .collect();

    debug!(user = %user, count = matches.len(), "Computed matches");

    if matches.is_empty() {
        return Err(StoreError::NotFound);
    }
    Ok(matches)
}
