//! Command Schema Validator: every descriptor produced by any C6 parser
//! passes through this gate before a [`Command`] is built from it. Failure
//! here is a parser bug, not a user-facing error, so it surfaces as a
//! SYSTEM error.

use serde_json::Value;

use sa_domain::error::{Error, Result};
use sa_domain::types::CommandDescriptor;

const ALLOWED_KEYS: [&str; 6] =
    ["intent", "confidence", "slots", "needs_clarification", "clarifying_question", "notes"];

pub fn validate_descriptor(raw: &Value) -> Result<CommandDescriptor> {
    let obj = raw
        .as_object()
        .ok_or_else(|| Error::System("command descriptor must be a JSON object".into()))?;

    for key in obj.keys() {
        if !ALLOWED_KEYS.contains(&key.as_str()) {
            return Err(Error::System(format!("command descriptor has unknown field '{key}'")));
        }
    }

    let descriptor: CommandDescriptor = serde_json::from_value(raw.clone())
        .map_err(|e| Error::System(format!("command descriptor failed schema validation: {e}")))?;

    if !(0.0..=1.0).contains(&descriptor.confidence) {
        return Err(Error::System(format!(
            "command descriptor confidence {} out of range",
            descriptor.confidence
        )));
    }

    Ok(descriptor)
}
