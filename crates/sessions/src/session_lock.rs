//! Per-session concurrency control.
//!
//! Ensures only one turn runs per session at a time, per §5 of the pipeline
//! design: the orchestrator acquires this lock before step 1 and releases it
//! after step 7 on every path including errors. A second turn arriving while
//! one is in flight waits up to the configured deadline, then fails with a
//! retriable SYSTEM error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use sa_domain::error::{Error, ErrorCode};

/// Manages per-session run locks. Each session key maps to a `Semaphore(1)`;
/// holding the permit for the duration of a turn guarantees exclusivity.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn semaphore_for(&self, session_key: &str) -> Arc<Semaphore> {
        let mut locks = self.locks.lock();
        locks
            .entry(session_key.to_owned())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }

    /// Acquire the run lock for a session, waiting at most `deadline`. A
    /// timed-out acquire is surfaced as `Error::Business{TURN_LOCK_TIMEOUT}`-
    /// shaped SYSTEM error (§5), not an indefinite block.
    pub async fn acquire_with_timeout(
        &self,
        session_key: &str,
        deadline: Duration,
    ) -> Result<OwnedSemaphorePermit, Error> {
        let sem = self.semaphore_for(session_key);
        match tokio::time::timeout(deadline, sem.acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(Error::System("session lock semaphore closed".into())),
            Err(_) => Err(Error::System(format!(
                "turn lock timeout for session {session_key} after {deadline:?}"
            ))),
        }
    }

    /// Convenience used by tests and the demo CLI where busy-ness should
    /// fail fast instead of waiting.
    pub async fn acquire(&self, session_key: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let sem = self.semaphore_for(session_key);
        sem.acquire_owned().await.map_err(|_| SessionBusy)
    }

    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Remove locks for sessions with no in-flight holder. Called from a
    /// periodic background sweep, not on every release, so the hot path
    /// never contends on the lock map itself.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

#[derive(Debug)]
pub struct SessionBusy;

impl std::fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session is busy — a turn is already in progress")
    }
}

impl std::error::Error for SessionBusy {}

impl From<SessionBusy> for Error {
    fn from(_: SessionBusy) -> Self {
        Error::Business {
            code: ErrorCode::InternalError,
            message: "session is busy".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = SessionLockMap::new();
        let permit1 = map.acquire("s1").await.unwrap();
        drop(permit1);
        let permit2 = map.acquire("s1").await.unwrap();
        drop(permit2);
    }

    #[tokio::test]
    async fn different_sessions_concurrent() {
        let map = Arc::new(SessionLockMap::new());
        let p1 = map.acquire("s1").await.unwrap();
        let p2 = map.acquire("s2").await.unwrap();
        assert_eq!(map.session_count(), 2);
        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_session_waits_then_proceeds() {
        let map = Arc::new(SessionLockMap::new());
        let map2 = map.clone();
        let p1 = map.acquire("s1").await.unwrap();

        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("s1").await.unwrap();
            42
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(p1);

        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn timeout_surfaces_system_error_and_releases_waiter_slot() {
        let map = SessionLockMap::new();
        let _held = map.acquire("s1").await.unwrap();

        let result = map
            .acquire_with_timeout("s1", Duration::from_millis(20))
            .await;
        assert!(matches!(result, Err(Error::System(_))));
    }

    #[tokio::test]
    async fn prune_idle_drops_unused_sessions_but_keeps_held_ones() {
        let map = SessionLockMap::new();
        let held = map.acquire("busy").await.unwrap();
        {
            let _released = map.acquire("idle").await.unwrap();
        }
        map.prune_idle();
        assert_eq!(map.session_count(), 1);
        drop(held);
    }
}
