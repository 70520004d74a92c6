//! Persisted rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::{GuildId, RoleId};

/// Explicit allow/deny of a command for a role. Unique per guild, role and path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverrideRecord {
    pub guild_id: GuildId,
    pub role_id: RoleId,
    pub command_path: String,
    pub allow: bool,
    pub created_at: DateTime<Utc>,
}

impl OverrideRecord {
    #[must_use]
    pub fn new(guild_id: GuildId, role_id: RoleId, command_path: impl Into<String>, allow: bool) -> Self {
        Self {
            guild_id,
            role_id,
            command_path: command_path.into(),
            allow,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn same_key(&self, guild_id: GuildId, role_id: RoleId, command_path: &str) -> bool {
        self.guild_id == guild_id && self.role_id == role_id && self.command_path == command_path
    }
}

/// Short text that expands to a command path. Unique per guild and alias.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasRecord {
    pub guild_id: GuildId,
    pub alias: String,
    pub command_path: String,
    pub created_at: DateTime<Utc>,
}

impl AliasRecord {
    #[must_use]
    pub fn new(guild_id: GuildId, alias: impl Into<String>, command_path: impl Into<String>) -> Self {
        Self {
            guild_id,
            alias: alias.into(),
            command_path: command_path.into(),
            created_at: Utc::now(),
        }
    }
}

/// Guild-specific prefix that addresses the bot. One per guild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerRecord {
    pub guild_id: GuildId,
    pub trigger: String,
    pub created_at: DateTime<Utc>,
}

impl TriggerRecord {
    #[must_use]
    pub fn new(guild_id: GuildId, trigger: impl Into<String>) -> Self {
        Self {
            guild_id,
            trigger: trigger.into(),
            created_at: Utc::now(),
        }
    }
}
