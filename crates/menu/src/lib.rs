//! Menu Read Model (C1): a cache-first projection of the restaurant
//! catalog, answering menu questions without hitting the primary store on
//! the hot path.

pub mod normalize;
pub mod read_model;
pub mod source;

pub use read_model::MenuReadModel;
pub use source::{CachedSource, DirectSource, FallbackSource, MenuSource};
