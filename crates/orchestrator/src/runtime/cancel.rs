//! Per-session cancellation tokens.
//!
//! Each running turn gets a `CancelToken`, checked at every suspension
//! point in [`crate::turn::process_turn`]: before the classifier call,
//! before the parser router call, before the command bus call and before
//! audio dispatch. Cancelling a turn never unwinds a mutation already in
//! flight — it only stops the orchestrator from starting the next step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Tracks the single in-flight cancel token per session key.
#[derive(Default)]
pub struct CancelMap {
    tokens: Mutex<HashMap<String, CancelToken>>,
}

impl CancelMap {
    pub fn new() -> Self {
        Self { tokens: Mutex::new(HashMap::new()) }
    }

    /// Create and register a new cancel token for a turn, replacing any
    /// stale token left behind by a previous turn on the same session.
    pub fn register(&self, session_key: &str) -> CancelToken {
        let token = CancelToken::new();
        self.tokens.lock().insert(session_key.to_owned(), token.clone());
        token
    }

    /// Cancel the running turn for a session, if any. Returns true if a
    /// token was found.
    pub fn cancel(&self, session_key: &str) -> bool {
        match self.tokens.lock().get(session_key) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop the token once a turn finishes, so cancelling a finished turn
    /// is a no-op rather than affecting the next one.
    pub fn clear(&self, session_key: &str) {
        self.tokens.lock().remove(session_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_replaces_a_stale_token() {
        let map = CancelMap::new();
        let first = map.register("s1");
        let second = map.register("s1");
        map.cancel("s1");
        assert!(!first.is_cancelled(), "stale token should not observe a later turn's cancel");
        assert!(second.is_cancelled());
    }

    #[test]
    fn cancel_unknown_session_returns_false() {
        let map = CancelMap::new();
        assert!(!map.cancel("ghost"));
    }

    #[test]
    fn clear_makes_a_later_cancel_a_no_op() {
        let map = CancelMap::new();
        let token = map.register("s1");
        map.clear("s1");
        map.cancel("s1");
        assert!(!token.is_cancelled());
    }
}
