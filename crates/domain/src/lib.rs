//! Shared types, ports and configuration for the drive-thru conversation
//! pipeline. Every other crate in the workspace depends on this one and
//! nothing in this crate depends on them.

pub mod config;
pub mod error;
pub mod money;
pub mod ports;
pub mod types;

pub use error::{Error, ErrorCode, Result};
