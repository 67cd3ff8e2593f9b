//! Order route handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use rideshare_core::{NewOrder, Order, OrderId, StoreError};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{UserQuery, require_user};
use crate::envelope::Envelope;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub userid: String,
    #[serde(rename = "type")]
    pub kind: KindField,
    pub address: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

/// Order type as sent by clients: `"0"`/`"1"` or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum KindField {
    Text(String),
    Number(i64),
}

impl KindField {
    fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder> {
        let owner = require_user(Some(self.userid))?;
        let order = NewOrder::parse(
            owner,
            &self.kind.as_text(),
            self.address,
            &self.start,
            self.end.as_deref(),
        )?;
        Ok(order)
    }
}

/// Path ids that do not parse can never name a stored order.
fn parse_order_id(raw: &str) -> Result<OrderId> {
    raw.parse().map_err(|_| StoreError::NotFound.into())
}

/// List every order owned by the caller.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<UserQuery>, QueryRejection>,
) -> Result<Envelope<Vec<Order>>> {
    let owner = require_user(query.ok().and_then(|Query(q)| q.userid))?;
    let orders = state.with_orders(|store| store.list_by_owner(&owner, None))??;
    Ok(Envelope::data(orders))
}

/// Fetch one order owned by the caller.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: std::result::Result<Query<UserQuery>, QueryRejection>,
) -> Result<Envelope<Vec<Order>>> {
    let owner = require_user(query.ok().and_then(|Query(q)| q.userid))?;
    let id = parse_order_id(&id)?;
    let orders = state.with_orders(|store| store.list_by_owner(&owner, Some(id)))??;
    Ok(Envelope::data(orders))
}

/// Create an order.
#[instrument(skip(state, body))]
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Envelope<Vec<Order>>> {
    let request: CreateOrderRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid order body: {e}")))?;
    let new_order = request.into_new_order()?;

    let order = state.with_orders(|store| store.insert(new_order))??;
    info!(order_id = %order.id, owner = %order.owner, kind = %order.kind, "Order created");

    Ok(Envelope::data(vec![order]))
}

/// Delete one of the caller's orders.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: std::result::Result<Query<UserQuery>, QueryRejection>,
) -> Result<Envelope<()>> {
    let owner = require_user(query.ok().and_then(|Query(q)| q.userid))?;
    let id = parse_order_id(&id)?;

    let removed = state.with_orders(|store| store.delete(&owner, id))??;
    info!(order_id = %removed.id, owner = %owner, "Order deleted");

    Ok(Envelope::ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_accepts_string_or_number() {
        let text: CreateOrderRequest = serde_json::from_str(
            r#"{"userid":"u1","type":"0","address":"A","start":"2018-12-05T18:00","end":"2018-12-05T19:00"}"#,
        )
        .unwrap();
        assert_eq!(text.kind.as_text(), "0");

        let number: CreateOrderRequest = serde_json::from_str(
            r#"{"userid":"u1","type":1,"address":"A","start":"2018-12-05T18:00"}"#,
        )
        .unwrap();
        assert_eq!(number.kind.as_text(), "1");
        assert!(number.end.is_none());
    }

    #[test]
    fn test_non_numeric_id_is_not_found() {
        assert!(matches!(
            parse_order_id("abc"),
            Err(AppError::Store(StoreError::NotFound))
        ));
        assert_eq!(parse_order_id("7").unwrap(), OrderId::new(7));
    }

    #[test]
    fn test_blank_owner_rejected() {
        let request = CreateOrderRequest {
            userid: "  ".to_string(),
            kind: KindField::Text("1".to_string()),
            address: "A".to_string(),
            start: "2018-12-05T18:00".to_string(),
            end: None,
        };
        assert!(matches!(
            request.into_new_order(),
            Err(AppError::BadRequest(_))
        ));
    }
}
