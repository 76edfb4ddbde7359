use serde::{Deserialize, Serialize};

fn d_voice() -> String {
    "alloy".to_string()
}
fn d_language() -> String {
    "en-US".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "d_voice")]
    pub voice: String,
    #[serde(default = "d_language")]
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice: d_voice(),
            language: d_language(),
        }
    }
}
