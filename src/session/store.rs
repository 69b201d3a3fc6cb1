use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use axum::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::user::User;

/// Fixed key the profile record is stored under on each device.
pub const PROFILE_KEY: &str = "user";

/// Durable per-device storage for the serialized identity. A device holds at
/// most one record, overwritten wholesale on every save.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, device: &str) -> anyhow::Result<Option<User>>;
    async fn save(&self, device: &str, user: &User) -> anyhow::Result<()>;
    async fn remove(&self, device: &str) -> anyhow::Result<()>;
}

/// JSON files under `<root>/<device>/user.json`.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    root: PathBuf,
}

impl FileProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn device_dir(&self, device: &str) -> anyhow::Result<PathBuf> {
        // device ids end up in a path
        anyhow::ensure!(
            !device.is_empty() && device.chars().all(|c| c.is_ascii_alphanumeric()),
            "invalid device id"
        );
        Ok(self.root.join(device))
    }

    fn record_path(dir: &Path) -> PathBuf {
        dir.join(format!("{PROFILE_KEY}.json"))
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn load(&self, device: &str) -> anyhow::Result<Option<User>> {
        let path = Self::record_path(&self.device_dir(device)?);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        let user = serde_json::from_str(&raw)
            .with_context(|| format!("parse profile {}", path.display()))?;
        debug!(device, "profile restored");
        Ok(Some(user))
    }

    async fn save(&self, device: &str, user: &User) -> anyhow::Result<()> {
        let dir = self.device_dir(device)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create {}", dir.display()))?;
        let body = serde_json::to_vec(user).context("serialize profile")?;
        let path = Self::record_path(&dir);
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(device, username = %user.username, "profile saved");
        Ok(())
    }

    async fn remove(&self, device: &str) -> anyhow::Result<()> {
        let dir = self.device_dir(device)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", dir.display())),
        }
    }
}

/// Process-local store, used by tests and `AppState::fake`.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: Mutex<HashMap<String, User>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self, device: &str) -> anyhow::Result<Option<User>> {
        Ok(self.records.lock().await.get(device).cloned())
    }

    async fn save(&self, device: &str, user: &User) -> anyhow::Result<()> {
        self.records
            .lock()
            .await
            .insert(device.to_string(), user.clone());
        Ok(())
    }

    async fn remove(&self, device: &str) -> anyhow::Result<()> {
        self.records.lock().await.remove(device);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::goals::Goal;

    fn sample_user() -> User {
        let mut user = User::new("ana", "abc123".into());
        user.height = 170.0;
        user.weight = 65.0;
        user.goal = Goal::Slim;
        user.allergies = vec!["nuts".into()];
        user
    }

    #[tokio::test]
    async fn file_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path());

        assert!(store.load("abc123").await.unwrap().is_none());

        let user = sample_user();
        store.save("abc123", &user).await.unwrap();
        assert!(dir.path().join("abc123").join("user.json").exists());
        assert_eq!(store.load("abc123").await.unwrap(), Some(user.clone()));

        let mut updated = user.clone();
        updated.weight = 62.0;
        store.save("abc123", &updated).await.unwrap();
        assert_eq!(store.load("abc123").await.unwrap().unwrap().weight, 62.0);

        store.remove("abc123").await.unwrap();
        assert!(store.load("abc123").await.unwrap().is_none());
        // removing twice is fine
        store.remove("abc123").await.unwrap();
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_device_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path());
        assert!(store.load("../etc").await.is_err());
        assert!(store.save("", &sample_user()).await.is_err());
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryProfileStore::new();
        let user = sample_user();
        store.save("dev1", &user).await.unwrap();
        assert_eq!(store.load("dev1").await.unwrap(), Some(user));
        assert!(store.load("dev2").await.unwrap().is_none());
        store.remove("dev1").await.unwrap();
        assert!(store.load("dev1").await.unwrap().is_none());
    }
}
