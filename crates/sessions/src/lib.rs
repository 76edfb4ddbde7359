//! Session Store (C2's session-side sibling) and Order Store, plus the
//! per-session advisory lock the Turn Orchestrator (C9) uses to serialize
//! turns within a session.

pub mod order_store;
pub mod session_lock;
pub mod session_store;

pub use order_store::InMemoryOrderStore;
pub use session_lock::{SessionBusy, SessionLockMap};
pub use session_store::InMemorySessionStore;
