//! Storage interface and the in-memory backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use super::{AliasRecord, OverrideRecord, TriggerRecord};
use crate::gateway::{GuildId, RoleId};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse store file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persistent rows for overrides, aliases and custom triggers.
///
/// `put_*` operations upsert on the record's unique key.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_overrides(&self) -> Result<Vec<OverrideRecord>, StoreError>;

    async fn put_override(&self, record: OverrideRecord) -> Result<(), StoreError>;

    async fn remove_override(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command_path: &str,
    ) -> Result<bool, StoreError>;

    async fn load_aliases(&self) -> Result<Vec<AliasRecord>, StoreError>;

    async fn put_alias(&self, record: AliasRecord) -> Result<(), StoreError>;

    async fn remove_alias(&self, guild_id: GuildId, alias: &str) -> Result<bool, StoreError>;

    async fn load_triggers(&self) -> Result<Vec<TriggerRecord>, StoreError>;

    async fn put_trigger(&self, record: TriggerRecord) -> Result<(), StoreError>;

    async fn remove_trigger(&self, guild_id: GuildId) -> Result<bool, StoreError>;
}

/// Every table of the store as one serializable document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreDocument {
    #[serde(default)]
    pub overrides: Vec<OverrideRecord>,

    #[serde(default)]
    pub aliases: Vec<AliasRecord>,

    #[serde(default)]
    pub triggers: Vec<TriggerRecord>,
}

impl StoreDocument {
    pub fn put_override(&mut self, record: OverrideRecord) {
        match self
            .overrides
            .iter_mut()
            .find(|r| r.same_key(record.guild_id, record.role_id, &record.command_path))
        {
            Some(existing) => *existing = record,
            None => self.overrides.push(record),
        }
    }

    pub fn remove_override(&mut self, guild_id: GuildId, role_id: RoleId, command_path: &str) -> bool {
        let before = self.overrides.len();
        self.overrides
            .retain(|r| !r.same_key(guild_id, role_id, command_path));
        self.overrides.len() != before
    }

    pub fn put_alias(&mut self, record: AliasRecord) {
        match self
            .aliases
            .iter_mut()
            .find(|r| r.guild_id == record.guild_id && r.alias == record.alias)
        {
            Some(existing) => *existing = record,
            None => self.aliases.push(record),
        }
    }

    pub fn remove_alias(&mut self, guild_id: GuildId, alias: &str) -> bool {
        let before = self.aliases.len();
        self.aliases
            .retain(|r| !(r.guild_id == guild_id && r.alias == alias));
        self.aliases.len() != before
    }

    pub fn put_trigger(&mut self, record: TriggerRecord) {
        match self.triggers.iter_mut().find(|r| r.guild_id == record.guild_id) {
            Some(existing) => *existing = record,
            None => self.triggers.push(record),
        }
    }

    pub fn remove_trigger(&mut self, guild_id: GuildId) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|r| r.guild_id != guild_id);
        self.triggers.len() != before
    }
}

/// Keeps the store document in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<StoreDocument>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(document: StoreDocument) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn load_overrides(&self) -> Result<Vec<OverrideRecord>, StoreError> {
        Ok(self.document.lock().await.overrides.clone())
    }

    async fn put_override(&self, record: OverrideRecord) -> Result<(), StoreError> {
        self.document.lock().await.put_override(record);
        Ok(())
    }

    async fn remove_override(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command_path: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .document
            .lock()
            .await
            .remove_override(guild_id, role_id, command_path))
    }

    async fn load_aliases(&self) -> Result<Vec<AliasRecord>, StoreError> {
        Ok(self.document.lock().await.aliases.clone())
    }

    async fn put_alias(&self, record: AliasRecord) -> Result<(), StoreError> {
        self.document.lock().await.put_alias(record);
        Ok(())
    }

    async fn remove_alias(&self, guild_id: GuildId, alias: &str) -> Result<bool, StoreError> {
        Ok(self.document.lock().await.remove_alias(guild_id, alias))
    }

    async fn load_triggers(&self) -> Result<Vec<TriggerRecord>, StoreError> {
        Ok(self.document.lock().await.triggers.clone())
    }

    async fn put_trigger(&self, record: TriggerRecord) -> Result<(), StoreError> {
        self.document.lock().await.put_trigger(record);
        Ok(())
    }

    async fn remove_trigger(&self, guild_id: GuildId) -> Result<bool, StoreError> {
        Ok(self.document.lock().await.remove_trigger(guild_id))
    }
}
