use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    order_types::{Order, OrderStatus},
    traits::{OrderStore, OrderStoreError},
};

#[derive(Debug, Default)]
struct StoreInner {
    orders: HashMap<i64, Order>,
    meta: HashMap<(i64, String), String>,
    notes: HashMap<i64, Vec<String>>,
    paid_refs: HashMap<i64, String>,
}

/// An in-memory order store. Clones share the same state, so a store handed to the reconciler can be inspected from
/// the test afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an order record.
    pub fn upsert_order(&self, order: Order) {
        self.lock().orders.insert(order.id, order);
    }

    pub fn order(&self, id: i64) -> Option<Order> {
        self.lock().orders.get(&id).cloned()
    }

    pub fn meta(&self, id: i64, key: &str) -> Option<String> {
        self.lock().meta.get(&(id, key.to_string())).cloned()
    }

    pub fn notes(&self, id: i64) -> Vec<String> {
        self.lock().notes.get(&id).cloned().unwrap_or_default()
    }

    /// The payment reference recorded by `mark_paid`, if the order has been completed through this store.
    pub fn paid_reference(&self, id: i64) -> Option<String> {
        self.lock().paid_refs.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderStore for MemoryOrderStore {
    async fn find_by_order_number(&self, number: &str) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.lock().orders.values().find(|o| o.order_number == number).cloned())
    }

    async fn find_by_order_key(&self, key: &str) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.lock().orders.values().find(|o| o.order_key == key).cloned())
    }

    async fn find_by_internal_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn read_meta(&self, order: &Order, key: &str) -> Result<Option<String>, OrderStoreError> {
        Ok(self.lock().meta.get(&(order.id, key.to_string())).cloned())
    }

    async fn write_meta(&self, order: &Order, key: &str, value: &str) -> Result<(), OrderStoreError> {
        self.lock().meta.insert((order.id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn save(&self, _order: &Order) -> Result<(), OrderStoreError> {
        // Writes go straight to the maps, so there is nothing to flush.
        Ok(())
    }

    async fn set_status(&self, order: &Order, status: OrderStatus, note: &str) -> Result<(), OrderStoreError> {
        let mut inner = self.lock();
        if let Some(stored) = inner.orders.get_mut(&order.id) {
            stored.status = status;
        }
        inner.notes.entry(order.id).or_default().push(note.to_string());
        Ok(())
    }

    async fn mark_paid(&self, order: &Order, tx_ref: &str) -> Result<(), OrderStoreError> {
        let mut inner = self.lock();
        if let Some(stored) = inner.orders.get_mut(&order.id) {
            stored.status = OrderStatus::Processing;
        }
        inner.paid_refs.insert(order.id, tx_ref.to_string());
        Ok(())
    }

    async fn add_note(&self, order: &Order, note: &str) -> Result<(), OrderStoreError> {
        self.lock().notes.entry(order.id).or_default().push(note.to_string());
        Ok(())
    }
}
