//! Command Bus (C3): validates and executes order-mutating and pure
//! response commands, aggregating a deterministic batch outcome.

pub mod bus;
pub mod outcome;
pub mod validation;

pub use bus::CommandBus;
pub use outcome::{build_batch_result, derive_outcome};
