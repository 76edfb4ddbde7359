use serde::{Deserialize, Serialize};

fn d_model() -> String {
    "gpt-4o-mini".to_string()
}
fn d_max_tool_loops() -> u32 {
    5
}

/// Model selection for the Intent Classifier (C4) and both stages of the
/// Intent Parser Router (C6). Provider wiring lives in the `sa-llm` crate;
/// this only names which model each call uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "d_model")]
    pub model: String,
    /// Model used for the ADD_ITEM disambiguation call. Defaults to `model`
    /// when absent so a single-model deployment needs no extra field.
    #[serde(default)]
    pub disambiguation_model: Option<String>,
    #[serde(default = "d_max_tool_loops")]
    pub max_tool_loops: u32,
}

impl LlmConfig {
    pub fn disambiguation_model(&self) -> &str {
        self.disambiguation_model.as_deref().unwrap_or(&self.model)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: d_model(),
            disambiguation_model: None,
            max_tool_loops: d_max_tool_loops(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguation_model_falls_back_to_model() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.disambiguation_model(), cfg.model);
    }

    #[test]
    fn explicit_disambiguation_model_wins() {
        let mut cfg = LlmConfig::default();
        cfg.disambiguation_model = Some("gpt-4o".into());
        assert_eq!(cfg.disambiguation_model(), "gpt-4o");
    }
}
