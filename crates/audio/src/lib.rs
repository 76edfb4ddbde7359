//! Audio Dispatcher (C8): resolves an `AggregatedResponse` to a playable
//! URL, caching both canned phrases and synthesized dynamic speech behind
//! a hash-keyed object store.

pub mod dispatch;

pub use dispatch::AudioDispatcher;
