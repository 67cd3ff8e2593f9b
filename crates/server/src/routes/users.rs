//! User route handler.
//!
//! There is no user registry: registration is acknowledged and nothing is
//! stored. The handler only logs who announced themselves.

use axum::{
    body::Bytes,
    extract::{Query, rejection::QueryRejection},
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::UserQuery;
use crate::envelope::Envelope;

#[derive(Debug, Deserialize)]
struct UserBody {
    userid: Option<String>,
}

/// Acknowledge a user. Always succeeds.
#[instrument(skip_all)]
pub async fn create(
    query: Result<Query<UserQuery>, QueryRejection>,
    body: Bytes,
) -> Envelope<()> {
    let from_body = serde_json::from_slice::<UserBody>(&body)
        .ok()
        .and_then(|b| b.userid);
    let userid = from_body.or_else(|| query.ok().and_then(|Query(q)| q.userid));

    match userid {
        Some(userid) => info!(userid = %userid, "User registered"),
        None => info!("User registered without userid"),
    }

    Envelope::ok()
}
