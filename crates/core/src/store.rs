//! Bounded in-memory order store.
//!
//! # Invariants
//!
//! - Ids come from a counter that only moves forward. A deleted id is never
//!   handed out again, so fullness is measured by the live count and not by
//!   the counter.
//! - Once `capacity` orders are live, inserts are rejected. Nothing is evicted.
//! - Orders are kept in insertion order; deleting one keeps the relative order
//!   of the rest. The matching engine relies on this for its traversal order.
//!
//! The store has no internal synchronization. Wrap it in one lock covering
//! every whole insert, delete, list, or match operation.

use tracing::debug;

use crate::types::{NewOrder, Order, OrderId, UserId};

/// Live order bound used when none is configured.
pub const DEFAULT_ORDER_CAPACITY: usize = 10;

/// Errors returned by [`OrderStore`] operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The store already holds `capacity` live orders.
    #[error("order store is full ({capacity} live orders)")]
    CapacityExceeded {
        /// Configured live order bound.
        capacity: usize,
    },
    /// No record matched. Covers a missing id, a wrong owner, and an empty
    /// result alike.
    #[error("no matching records")]
    NotFound,
}

/// The registry of live orders.
#[derive(Debug, Clone)]
pub struct OrderStore {
    capacity: usize,
    next_id: u64,
    orders: Vec<Order>,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl OrderStore {
    /// Create an empty store holding at most `capacity` live orders.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_id: 0,
            orders: Vec::with_capacity(capacity),
        }
    }

    /// Create an empty store with [`DEFAULT_ORDER_CAPACITY`].
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_ORDER_CAPACITY)
    }

    /// Configured live order bound.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no orders are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Live orders in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Store a new order and assign it the next id.
    ///
    /// A rejected insert does not consume an id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] when the store is full.
    pub fn insert(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        if self.orders.len() >= self.capacity {
            debug!(capacity = self.capacity, "Rejecting insert, store full");
            return Err(StoreError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let id = OrderId::new(self.next_id);
        self.next_id += 1;

        let order = Order::from_new(id, order);
        debug!(id = %order.id, owner = %order.owner, kind = %order.kind, "Stored order");
        self.orders.push(order.clone());
        Ok(order)
    }

    /// Remove the order with `id` if it belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no live order has that id, or if it
    /// belongs to someone else. The two cases are indistinguishable.
    pub fn delete(&mut self, owner: &UserId, id: OrderId) -> Result<Order, StoreError> {
        let position = self
            .orders
            .iter()
            .position(|o| o.id == id && &o.owner == owner)
            .ok_or(StoreError::NotFound)?;

        let removed = self.orders.remove(position);
        debug!(id = %removed.id, owner = %owner, "Deleted order");
        Ok(removed)
    }

    /// List the orders of `owner`, optionally narrowed to one id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when nothing matches, including when
    /// the owner simply has no orders.
    pub fn list_by_owner(
        &self,
        owner: &UserId,
        id: Option<OrderId>,
    ) -> Result<Vec<Order>, StoreError> {
        let found: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| &o.owner == owner && id.is_none_or(|id| o.id == id))
            .cloned()
            .collect();

        if found.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(found)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn request(owner: &str, address: &str) -> NewOrder {
        NewOrder::parse(UserId::from(owner), "1", address, "2024-01-01T10:30", None).unwrap()
    }

    #[test]
    fn test_insert_up_to_capacity_assigns_unique_ids() {
        let mut store = OrderStore::with_default_capacity();
        let mut ids = HashSet::new();

        for i in 0..DEFAULT_ORDER_CAPACITY {
            let order = store.insert(request(&format!("u{i}"), "X")).unwrap();
            assert!(ids.insert(order.id));
        }
        assert_eq!(store.len(), DEFAULT_ORDER_CAPACITY);

        let overflow = store.insert(request("late", "X"));
        assert_eq!(
            overflow,
            Err(StoreError::CapacityExceeded {
                capacity: DEFAULT_ORDER_CAPACITY
            })
        );
        assert_eq!(store.len(), DEFAULT_ORDER_CAPACITY);
    }

    #[test]
    fn test_ids_are_never_reused_after_delete() {
        let mut store = OrderStore::new(2);
        let a = store.insert(request("a", "X")).unwrap();
        let b = store.insert(request("b", "X")).unwrap();
        assert_eq!(a.id, OrderId::new(0));
        assert_eq!(b.id, OrderId::new(1));

        store.delete(&UserId::from("a"), a.id).unwrap();
        let c = store.insert(request("c", "X")).unwrap();
        assert_eq!(c.id, OrderId::new(2));
    }

    #[test]
    fn test_fullness_counts_live_orders() {
        let mut store = OrderStore::new(2);
        let a = store.insert(request("a", "X")).unwrap();
        store.insert(request("b", "X")).unwrap();
        assert!(store.insert(request("c", "X")).is_err());

        store.delete(&UserId::from("a"), a.id).unwrap();
        assert!(store.insert(request("c", "X")).is_ok());
        assert!(store.insert(request("d", "X")).is_err());
    }

    #[test]
    fn test_rejected_insert_does_not_consume_id() {
        let mut store = OrderStore::new(1);
        let a = store.insert(request("a", "X")).unwrap();
        assert!(store.insert(request("b", "X")).is_err());

        store.delete(&UserId::from("a"), a.id).unwrap();
        let b = store.insert(request("b", "X")).unwrap();
        assert_eq!(b.id, OrderId::new(1));
    }

    #[test]
    fn test_delete_requires_matching_owner() {
        let mut store = OrderStore::with_default_capacity();
        let a = store.insert(request("a", "X")).unwrap();

        assert_eq!(
            store.delete(&UserId::from("mallory"), a.id),
            Err(StoreError::NotFound)
        );
        assert_eq!(store.len(), 1);

        assert_eq!(
            store.delete(&UserId::from("a"), OrderId::new(99)),
            Err(StoreError::NotFound)
        );
        assert_eq!(store.len(), 1);

        assert_eq!(store.delete(&UserId::from("a"), a.id).unwrap(), a);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_preserves_insertion_order() {
        let mut store = OrderStore::with_default_capacity();
        let a = store.insert(request("a", "X")).unwrap();
        let b = store.insert(request("b", "X")).unwrap();
        let c = store.insert(request("c", "X")).unwrap();

        store.delete(&UserId::from("b"), b.id).unwrap();
        let ids: Vec<OrderId> = store.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_list_by_owner() {
        let mut store = OrderStore::with_default_capacity();
        let a1 = store.insert(request("a", "X")).unwrap();
        store.insert(request("b", "X")).unwrap();
        let a2 = store.insert(request("a", "Y")).unwrap();

        let all = store.list_by_owner(&UserId::from("a"), None).unwrap();
        assert_eq!(all, vec![a1.clone(), a2]);

        let one = store.list_by_owner(&UserId::from("a"), Some(a1.id)).unwrap();
        assert_eq!(one, vec![a1]);
    }

    #[test]
    fn test_list_by_owner_empty_is_not_found() {
        let mut store = OrderStore::with_default_capacity();
        let b = store.insert(request("b", "X")).unwrap();

        assert_eq!(
            store.list_by_owner(&UserId::from("nobody"), None),
            Err(StoreError::NotFound)
        );
        // Someone else's id
        assert_eq!(
            store.list_by_owner(&UserId::from("a"), Some(b.id)),
            Err(StoreError::NotFound)
        );
    }
}
