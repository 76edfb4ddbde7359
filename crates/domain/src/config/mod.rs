mod llm;
mod observability;
mod pipeline;
mod session;
mod timeouts;
mod voice;

pub use llm::*;
pub use observability::*;
pub use pipeline::*;
pub use session::*;
pub use timeouts::*;
pub use voice::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "error",
            ConfigSeverity::Warning => "warning",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate cross-field and range constraints the type system can't
    /// express. Returns warnings and errors rather than panicking; the host
    /// binary logs warnings and refuses to start on errors.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !(0.0..=1.0).contains(&self.pipeline.confidence_threshold) {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "pipeline.confidence_threshold".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if self.pipeline.max_quantity_per_item == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "pipeline.max_quantity_per_item".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.pipeline.max_items_per_order == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "pipeline.max_items_per_order".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.pipeline.max_order_total <= rust_decimal::Decimal::ZERO {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "pipeline.max_order_total".into(),
                message: "must be positive".into(),
            });
        }

        if self.session.session_ttl_secs == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "session.session_ttl_secs".into(),
                message: "must be positive".into(),
            });
        }
        if self.session.turn_deadline_secs == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "session.turn_deadline_secs".into(),
                message: "must be positive".into(),
            });
        }
        if self.session.history_window == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "session.history_window".into(),
                message: "0 means the classifier sees no prior turns".into(),
            });
        }

        for (field, ms) in [
            ("timeouts.llm_timeout_ms", self.timeouts.llm_timeout_ms),
            ("timeouts.db_timeout_ms", self.timeouts.db_timeout_ms),
            ("timeouts.tts_timeout_ms", self.timeouts.tts_timeout_ms),
            (
                "timeouts.object_store_timeout_ms",
                self.timeouts.object_store_timeout_ms,
            ),
        ] {
            if ms == 0 {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Error,
                    field: field.into(),
                    message: "must be positive".into(),
                });
            }
        }

        if self.llm.model.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "llm.model".into(),
                message: "must not be empty".into(),
            });
        }
        if self.llm.max_tool_loops == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "llm.max_tool_loops".into(),
                message: "0 disables all LLM tool use in the parser router".into(),
            });
        }

        if self.voice.voice.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "voice.voice".into(),
                message: "must not be empty".into(),
            });
        }

        issues
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == ConfigSeverity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates_clean() {
        let cfg = Config::default();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn confidence_threshold_out_of_range_is_error() {
        let mut cfg = Config::default();
        cfg.pipeline.confidence_threshold = 1.5;
        let issues = cfg.validate();
        assert!(Config::has_errors(&issues));
        assert!(issues.iter().any(|i| i.field == "pipeline.confidence_threshold"));
    }

    #[test]
    fn zero_history_window_is_warning_not_error() {
        let mut cfg = Config::default();
        cfg.session.history_window = 0;
        let issues = cfg.validate();
        assert!(!Config::has_errors(&issues));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    }

    #[test]
    fn display_format_matches_teacher_bracket_tag() {
        let issue = ConfigIssue {
            severity: ConfigSeverity::Error,
            field: "x.y".into(),
            message: "bad".into(),
        };
        assert_eq!(format!("{issue}"), "[error] x.y: bad");
    }
}
