//! In-memory reference implementation of the `SessionStore` port.
//!
//! Session/order records are conceptually `session:<session_id>` keys in a
//! generic key/value store (§6); this is the process-local stand-in used by
//! tests and the demo CLI. A TTL is attached on every `put` and enforced
//! lazily on `get`, mirroring the teacher's "optional cache, fall through on
//! any failure" style but for a store that is itself the source of truth.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use sa_domain::error::Result;
use sa_domain::ports::{Clock, SessionStore};
use sa_domain::types::SessionContext;

struct Entry {
    ctx: SessionContext,
    expires_at: DateTime<Utc>,
}

pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries present, expired or not — used by the background
    /// TTL-eviction sweep.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict every expired entry. Called periodically, not per-get, so a
    /// burst of reads on a hot session never pays for a full table scan.
    pub fn evict_expired(&self) {
        let now = self.clock.now();
        self.entries.write().retain(|_, e| e.expires_at > now);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionContext>> {
        let now = self.clock.now();
        let entries = self.entries.read();
        Ok(entries
            .get(session_id)
            .filter(|e| e.expires_at > now)
            .map(|e| e.ctx.clone()))
    }

    async fn put(&self, session_id: &str, ctx: &SessionContext, ttl: Duration) -> Result<()> {
        let expires_at = self.clock.now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        self.entries.write().insert(
            session_id.to_owned(),
            Entry {
                ctx: ctx.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.entries.write().remove(session_id);
        Ok(())
    }
}
