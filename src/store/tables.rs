//! In-memory views of the stored records, reloaded wholesale on every write.

use std::sync::Arc;

use tracing::{debug, info};

use super::{AliasRecord, OverrideRecord, SnapshotTable, Storage, StoreError, TriggerRecord};
use crate::commands::{AliasTable, TriggerTable};
use crate::gateway::{GuildId, RoleId};
use crate::permissions::OverrideTable;

/// Overrides, aliases and custom triggers shared by every message task.
pub struct Tables {
    storage: Arc<dyn Storage>,
    overrides: SnapshotTable<OverrideTable>,
    aliases: SnapshotTable<AliasTable>,
    triggers: SnapshotTable<TriggerTable>,
}

impl Tables {
    /// Loads every table from storage.
    pub async fn load(storage: Arc<dyn Storage>) -> Result<Self, StoreError> {
        let overrides = OverrideTable::from_records(&storage.load_overrides().await?);
        let aliases = AliasTable::from_records(&storage.load_aliases().await?);
        let triggers = TriggerTable::from_records(&storage.load_triggers().await?);

        info!(
            "Loaded {} overrides, {} aliases, {} custom triggers",
            overrides.len(),
            aliases.len(),
            triggers.len()
        );

        Ok(Self {
            storage,
            overrides: SnapshotTable::new(overrides),
            aliases: SnapshotTable::new(aliases),
            triggers: SnapshotTable::new(triggers),
        })
    }

    pub async fn overrides(&self) -> Arc<OverrideTable> {
        self.overrides.load().await
    }

    pub async fn aliases(&self) -> Arc<AliasTable> {
        self.aliases.load().await
    }

    pub async fn triggers(&self) -> Arc<TriggerTable> {
        self.triggers.load().await
    }

    /// Stores an allow/deny override and republishes the override table.
    pub async fn set_override(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command_path: &str,
        allow: bool,
    ) -> Result<(), StoreError> {
        let _writer = self.overrides.lock_writer().await;
        self.storage
            .put_override(OverrideRecord::new(guild_id, role_id, command_path, allow))
            .await?;
        self.reload_overrides().await
    }

    /// Deletes an override. Returns whether one existed.
    pub async fn clear_override(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command_path: &str,
    ) -> Result<bool, StoreError> {
        let _writer = self.overrides.lock_writer().await;
        let removed = self
            .storage
            .remove_override(guild_id, role_id, command_path)
            .await?;
        self.reload_overrides().await?;
        Ok(removed)
    }

    pub async fn set_alias(
        &self,
        guild_id: GuildId,
        alias: &str,
        command_path: &str,
    ) -> Result<(), StoreError> {
        let _writer = self.aliases.lock_writer().await;
        self.storage
            .put_alias(AliasRecord::new(guild_id, alias, command_path))
            .await?;
        self.reload_aliases().await
    }

    pub async fn remove_alias(&self, guild_id: GuildId, alias: &str) -> Result<bool, StoreError> {
        let _writer = self.aliases.lock_writer().await;
        let removed = self.storage.remove_alias(guild_id, alias).await?;
        self.reload_aliases().await?;
        Ok(removed)
    }

    pub async fn set_trigger(&self, guild_id: GuildId, trigger: &str) -> Result<(), StoreError> {
        let _writer = self.triggers.lock_writer().await;
        self.storage
            .put_trigger(TriggerRecord::new(guild_id, trigger))
            .await?;
        self.reload_triggers().await
    }

    pub async fn clear_trigger(&self, guild_id: GuildId) -> Result<bool, StoreError> {
        let _writer = self.triggers.lock_writer().await;
        let removed = self.storage.remove_trigger(guild_id).await?;
        self.reload_triggers().await?;
        Ok(removed)
    }

    /// Re-reads every table from storage, e.g. after the file was edited by hand.
    pub async fn reload_all(&self) -> Result<(), StoreError> {
        {
            let _writer = self.overrides.lock_writer().await;
            self.reload_overrides().await?;
        }
        {
            let _writer = self.aliases.lock_writer().await;
            self.reload_aliases().await?;
        }
        let _writer = self.triggers.lock_writer().await;
        self.reload_triggers().await
    }

    // The reload_* helpers expect the matching writer lock to be held.

    async fn reload_overrides(&self) -> Result<(), StoreError> {
        let table = OverrideTable::from_records(&self.storage.load_overrides().await?);
        debug!("Reloaded override table ({} entries)", table.len());
        self.overrides.publish(table).await;
        Ok(())
    }

    async fn reload_aliases(&self) -> Result<(), StoreError> {
        let table = AliasTable::from_records(&self.storage.load_aliases().await?);
        debug!("Reloaded alias table ({} entries)", table.len());
        self.aliases.publish(table).await;
        Ok(())
    }

    async fn reload_triggers(&self) -> Result<(), StoreError> {
        let table = TriggerTable::from_records(&self.storage.load_triggers().await?);
        debug!("Reloaded trigger table ({} entries)", table.len());
        self.triggers.publish(table).await;
        Ok(())
    }
}

impl std::fmt::Debug for Tables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tables").finish_non_exhaustive()
    }
}
