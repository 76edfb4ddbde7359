//! Filesystem-backed `ObjectStore`. Writes land under a base directory
//! keyed exactly as the caller names them (`restaurants/<id>/canned/...`,
//! `restaurants/<id>/tts/<hash>.mp3`), and the returned URL is a `file://`
//! path a local audio player can open directly — adequate for the demo CLI,
//! not for a production deployment, which would swap this for S3 or GCS
//! without touching `sa-audio`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use sa_domain::error::Result;
use sa_domain::ports::ObjectStore;

pub struct LocalObjectStore {
    base_dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

fn to_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(to_url(&path))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.resolve(key);
        match tokio::fs::metadata(&path).await {
            Ok(_) => Ok(Some(to_url(&path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
