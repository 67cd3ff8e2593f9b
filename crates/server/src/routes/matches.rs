//! Match route handler.

use axum::extract::{Query, State, rejection::QueryRejection};
use rideshare_core::{Match, find_matches};
use tracing::{debug, instrument};

use super::{UserQuery, require_user};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::state::AppState;

/// List every offer/request pairing that involves the caller.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<UserQuery>, QueryRejection>,
) -> Result<Envelope<Vec<Match>>> {
    let user = require_user(query.ok().and_then(|Query(q)| q.userid))?;
    let matches = state.with_orders(|store| find_matches(store, &user))??;
    debug!(count = matches.len(), "Matches found");
    Ok(Envelope::data(matches))
}
