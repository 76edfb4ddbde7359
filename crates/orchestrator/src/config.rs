//! On-disk configuration for the `drivethru` binary: the pipeline config
//! every core crate shares, plus the provider wiring and local adapter
//! settings that belong to this binary alone.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use sa_domain::config::Config as PipelineConfig;
use sa_llm::ProviderConfig;

fn d_object_store_dir() -> PathBuf {
    PathBuf::from("./data/audio")
}

fn d_restaurant_id() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "d_object_store_dir")]
    pub object_store_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { object_store_dir: d_object_store_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Restaurant this process serves. The pipeline is multi-tenant in
    /// principle (every port keys on `restaurant_id`); this binary runs one
    /// tenant per process, matching how the teacher's gateway pins one
    /// config file per deployment.
    #[serde(default = "d_restaurant_id")]
    pub restaurant_id: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { pipeline: PipelineConfig::default(), provider: ProviderConfig::default(), storage: StorageConfig::default(), restaurant_id: d_restaurant_id() }
    }
}

/// Read `SA_CONFIG` (default `config.toml`); fall back to defaults, with a
/// placeholder/demo menu and a silent TTS, when the file is absent.
pub fn load_config() -> anyhow::Result<(AppConfig, String)> {
    let path = std::env::var("SA_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if std::path::Path::new(&path).exists() {
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
        let cfg: AppConfig = toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))?;
        Ok((cfg, path))
    } else {
        Ok((AppConfig::default(), path))
    }
}
