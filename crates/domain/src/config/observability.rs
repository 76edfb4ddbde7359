use serde::{Deserialize, Serialize};

fn d_format() -> LogFormat {
    LogFormat::Pretty
}
fn d_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logging setup, matching the teacher's `tracing-subscriber` layering:
/// JSON in production, pretty for the demo CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "d_format")]
    pub format: LogFormat,
    #[serde(default = "d_level")]
    pub level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            format: d_format(),
            level: d_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pretty_info() {
        let cfg = ObservabilityConfig::default();
        assert_eq!(cfg.format, LogFormat::Pretty);
        assert_eq!(cfg.level, "info");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: ObservabilityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.format, LogFormat::Pretty);
    }
}
