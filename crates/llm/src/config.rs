//! Provider wiring for the single OpenAI-compatible chat endpoint the
//! pipeline talks to. Kept in the host family's provider-config shape even
//! though only one provider kind ships here — multi-provider routing,
//! OAuth and pricing all belong to a different product.

use serde::{Deserialize, Serialize};

use sa_domain::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenaiCompat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    ApiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub auth: AuthConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenaiCompat,
            base_url: "https://api.openai.com/v1".to_string(),
            auth: AuthConfig { mode: AuthMode::ApiKey, api_key_env: "SA_LLM_API_KEY".to_string() },
        }
    }
}

impl ProviderConfig {
    pub fn resolve_api_key(&self) -> Result<String> {
        std::env::var(&self.auth.api_key_env).map_err(|_| {
            Error::Config(format!("missing environment variable {}", self.auth.api_key_env))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_api_key_surfaces_config_error_when_unset() {
        let cfg = ProviderConfig {
            kind: ProviderKind::OpenaiCompat,
            base_url: "https://example.invalid/v1".into(),
            auth: AuthConfig { mode: AuthMode::ApiKey, api_key_env: "SA_DEFINITELY_UNSET_KEY".into() },
        };
        assert!(matches!(cfg.resolve_api_key(), Err(Error::Config(_))));
    }
}
