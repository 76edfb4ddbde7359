use serde::{Deserialize, Serialize};

fn d_llm_timeout_ms() -> u64 {
    20_000
}
fn d_db_timeout_ms() -> u64 {
    5_000
}
fn d_tts_timeout_ms() -> u64 {
    15_000
}
fn d_object_store_timeout_ms() -> u64 {
    10_000
}

/// Per-call timeouts for every suspension point the orchestrator crosses
/// (§5). Each is enforced with `tokio::time::timeout` at the call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "d_llm_timeout_ms")]
    pub llm_timeout_ms: u64,
    #[serde(default = "d_db_timeout_ms")]
    pub db_timeout_ms: u64,
    #[serde(default = "d_tts_timeout_ms")]
    pub tts_timeout_ms: u64,
    #[serde(default = "d_object_store_timeout_ms")]
    pub object_store_timeout_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            llm_timeout_ms: d_llm_timeout_ms(),
            db_timeout_ms: d_db_timeout_ms(),
            tts_timeout_ms: d_tts_timeout_ms(),
            object_store_timeout_ms: d_object_store_timeout_ms(),
        }
    }
}
