use serde::{Deserialize, Serialize};

fn d_session_ttl_secs() -> u64 {
    1800
}
fn d_turn_deadline_secs() -> u64 {
    30
}
fn d_history_window() -> usize {
    8
}

/// Session lifetime and per-turn locking parameters (§5 of the pipeline
/// design).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "d_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "d_turn_deadline_secs")]
    pub turn_deadline_secs: u64,
    #[serde(default = "d_history_window")]
    pub history_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: d_session_ttl_secs(),
            turn_deadline_secs: d_turn_deadline_secs(),
            history_window: d_history_window(),
        }
    }
}
