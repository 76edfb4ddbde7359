//! Intent Parser Router (C6): rule-based and LLM-backed parsers that turn a
//! classified, cleansed utterance into the commands the Command Bus (C3)
//! executes, gated by the Command Schema Validator.

pub mod add_item;
pub mod dispatch;
pub mod mutate_item;
pub mod rule;
pub mod schema;

pub use dispatch::{route, RouterContext};
pub use schema::validate_descriptor;
