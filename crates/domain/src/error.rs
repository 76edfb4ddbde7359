use serde::{Deserialize, Serialize};

/// Shared error type used across every pipeline crate.
///
/// Components never propagate this upward past the Command Bus: a failed
/// command is folded into a [`crate::types::CommandResult`] there rather than
/// bubbling as an `Err`. Everything *before* that point (repository I/O, LLM
/// calls, lock acquisition) returns `Result<T, Error>` normally.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("config: {0}")]
    Config(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("business rule {code:?}: {message}")]
    Business { code: ErrorCode, message: String },

    #[error("system: {0}")]
    System(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Domain-level error codes surfaced through [`crate::types::CommandResult`]
/// and, for the `Business`/`Validation` error variants above, through
/// [`Error`] itself before a command result is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ItemUnavailable,
    ItemNotFound,
    SizeNotAvailable,
    ModifierRemoveNotPresent,
    ModifierAddNotAllowed,
    ModifierConflict,
    QuantityExceedsLimit,
    InventoryShortage,
    InvalidQuantity,
    DatabaseError,
    InternalError,
}
