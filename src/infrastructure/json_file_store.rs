// Flat-file JSON storage - one pretty-printed array per entity kind
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Entities stored by uuid.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

/// Every operation holds the store lock for its whole read-modify-write,
/// so single-entity writes are atomic within this process.
pub struct JsonFileStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Keyed + Send,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_file_exists(&self) -> Result<()> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to check {}", self.path.display()))?;
        if exists {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, "[]")
            .await
            .with_context(|| format!("Failed to initialise {}", self.path.display()))?;
        tracing::info!("Initialised empty store at {}", self.path.display());
        Ok(())
    }

    async fn read_file(&self) -> Result<Vec<T>> {
        self.ensure_file_exists().await?;
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Write to a sibling temp file, then rename over the original.
    async fn write_file(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items).context("Failed to serialise store")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        let _guard = self.lock.lock().await;
        self.read_file().await
    }

    pub async fn find(&self, key: Uuid) -> Result<Option<T>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_file().await?.into_iter().find(|item| item.key() == key))
    }

    pub async fn find_where<P>(&self, predicate: P) -> Result<Vec<T>>
    where
        P: Fn(&T) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        Ok(self.read_file().await?.into_iter().filter(|item| predicate(item)).collect())
    }

    pub async fn insert(&self, item: T) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_file().await?;
        let key = item.key();
        if items.iter().any(|existing| existing.key() == key) {
            anyhow::bail!("Entity {} already exists in {}", key, self.path.display());
        }
        items.push(item);
        self.write_file(&items).await
    }

    /// Apply `change` to the entity with `key`. Returns false if it is absent.
    pub async fn modify<F>(&self, key: Uuid, change: F) -> Result<bool>
    where
        F: FnOnce(&mut T) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.read_file().await?;
        let Some(item) = items.iter_mut().find(|item| item.key() == key) else {
            return Ok(false);
        };
        change(item);
        self.write_file(&items).await?;
        Ok(true)
    }

    pub async fn remove(&self, key: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_file().await?;
        let before = items.len();
        items.retain(|item| item.key() != key);
        if items.len() == before {
            return Ok(false);
        }
        self.write_file(&items).await?;
        Ok(true)
    }
}
