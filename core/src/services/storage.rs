use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};

use crate::error::{ClientError, Result};

/// Simple JSON based key-value storage persisted to `data.json`.
pub struct Storage {
    file: PathBuf,
    data: Mutex<HashMap<String, Value>>,
}

impl Storage {
    /// Open (or create) the store inside `dir`.
    pub async fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).await?;
        let file = dir.join("data.json");
        let data = if let Ok(bytes) = fs::read(&file).await {
            serde_json::from_slice(&bytes).unwrap_or_default()
        } else {
            HashMap::new()
        };
        Ok(Self {
            file,
            data: Mutex::new(data),
        })
    }

    /// Open the store in the platform data directory.
    pub async fn open_default() -> Result<Self> {
        Self::open(&default_data_dir()?).await
    }

    /// Retrieve a raw value by key.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.data.lock().await.get(key).cloned()
    }

    /// Retrieve and decode a value; undecodable entries read as absent.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .await
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Store a value under a key.
    pub async fn put(&self, key: &str, value: impl Serialize) -> Result<()> {
        let mut data = self.data.lock().await;
        data.insert(key.to_string(), serde_json::to_value(value)?);
        self.flush(&data).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.data.lock().await;
        if data.remove(key).is_some() {
            self.flush(&data).await?;
        }
        Ok(())
    }

    async fn flush(&self, data: &HashMap<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec(data)?;
        fs::write(&self.file, bytes).await?;
        Ok(())
    }
}

/// Platform data directory, overridable with `KIFEKOI_DATA_DIR`.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("KIFEKOI_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("org", "kifekoi", "kifekoi")
        .map(|p| p.data_dir().to_path_buf())
        .ok_or_else(|| ClientError::NotConfigured("data directory".into()))
}
