//! In-memory reference implementation of the `OrderStore` port (C2).
//!
//! Session-scoped storage for one `OrderAggregate` per `order_id` with
//! per-key TTL (default 1800s per §4.2). Totals are recomputed by the
//! Command Bus, never here — this is a typed blob store with TTL, nothing
//! more.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use sa_domain::error::Result;
use sa_domain::ports::{Clock, OrderStore};
use sa_domain::types::OrderAggregate;

struct Entry {
    order: OrderAggregate,
    expires_at: DateTime<Utc>,
}

pub struct InMemoryOrderStore {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryOrderStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evict_expired(&self) {
        let now = self.clock.now();
        self.entries.write().retain(|_, e| e.expires_at > now);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, order_id: &str) -> Result<Option<OrderAggregate>> {
        let now = self.clock.now();
        let entries = self.entries.read();
        Ok(entries
            .get(order_id)
            .filter(|e| e.expires_at > now)
            .map(|e| e.order.clone()))
    }

    async fn upsert(&self, order: &OrderAggregate, ttl: Duration) -> Result<()> {
        let expires_at = self.clock.now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        self.entries.write().insert(
            order.order_id.clone(),
            Entry {
                order: order.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, order_id: &str) -> Result<()> {
        self.entries.write().remove(order_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sa_domain::ports::SystemClock;

    fn order() -> OrderAggregate {
        OrderAggregate::new("o1".into(), "s1".into(), 1, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = InMemoryOrderStore::new(Arc::new(SystemClock));
        store.upsert(&order(), Duration::from_secs(1800)).await.unwrap();
        let got = store.get("o1").await.unwrap().unwrap();
        assert_eq!(got.order_id, "o1");
    }

    #[tokio::test]
    async fn missing_order_is_none() {
        let store = InMemoryOrderStore::new(Arc::new(SystemClock));
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_order() {
        let store = InMemoryOrderStore::new(Arc::new(SystemClock));
        store.upsert(&order(), Duration::from_secs(1800)).await.unwrap();
        store.delete("o1").await.unwrap();
        assert!(store.get("o1").await.unwrap().is_none());
    }
}
