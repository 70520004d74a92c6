//! JSON file storage backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{AliasRecord, OverrideRecord, Storage, StoreDocument, StoreError, TriggerRecord};
use crate::gateway::{GuildId, RoleId};

/// Persists the whole store as one pretty-printed JSON document.
///
/// Every mutation reads the file, applies the change and replaces the file
/// through a temporary sibling, so a crash never leaves a half-written store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document; a missing file is an empty store.
    pub async fn load_document(&self) -> Result<StoreDocument, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store file {} not found, starting empty", self.path.display());
                Ok(StoreDocument::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_document(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(document)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Sibling written before the rename; never equal to the store path.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn update<R>(&self, change: impl FnOnce(&mut StoreDocument) -> R + Send) -> Result<R, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load_document().await?;
        let result = change(&mut document);
        self.save_document(&document).await?;
        Ok(result)
    }
}

#[async_trait]
impl Storage for JsonFileStore {
    async fn load_overrides(&self) -> Result<Vec<OverrideRecord>, StoreError> {
        Ok(self.load_document().await?.overrides)
    }

    async fn put_override(&self, record: OverrideRecord) -> Result<(), StoreError> {
        self.update(|doc| doc.put_override(record)).await
    }

    async fn remove_override(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command_path: &str,
    ) -> Result<bool, StoreError> {
        self.update(|doc| doc.remove_override(guild_id, role_id, command_path))
            .await
    }

    async fn load_aliases(&self) -> Result<Vec<AliasRecord>, StoreError> {
        Ok(self.load_document().await?.aliases)
    }

    async fn put_alias(&self, record: AliasRecord) -> Result<(), StoreError> {
        self.update(|doc| doc.put_alias(record)).await
    }

    async fn remove_alias(&self, guild_id: GuildId, alias: &str) -> Result<bool, StoreError> {
        self.update(|doc| doc.remove_alias(guild_id, alias)).await
    }

    async fn load_triggers(&self) -> Result<Vec<TriggerRecord>, StoreError> {
        Ok(self.load_document().await?.triggers)
    }

    async fn put_trigger(&self, record: TriggerRecord) -> Result<(), StoreError> {
        self.update(|doc| doc.put_trigger(record)).await
    }

    async fn remove_trigger(&self, guild_id: GuildId) -> Result<bool, StoreError> {
        self.update(|doc| doc.remove_trigger(guild_id)).await
    }
}
