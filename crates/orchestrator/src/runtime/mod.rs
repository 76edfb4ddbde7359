//! Runtime support for the Turn Orchestrator (C9): per-turn cancellation.
//! The per-session advisory lock lives in `sa_sessions::SessionLockMap`
//! since the session store and its lock share a lifecycle; the turn
//! sequence itself lives in `crate::turn`.

pub mod cancel;

pub use cancel::{CancelMap, CancelToken};
