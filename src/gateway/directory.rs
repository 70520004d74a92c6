//! Member lookups and reply delivery.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use super::{GuildId, InboundMessage, Role, RoleId, UserId};

/// Errors raised by gateway or REST collaborators.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Source of guild role information.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    /// Roles held by `user_id` in `guild_id`, in the order the platform reports them.
    async fn member_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<Role>, TransportError>;

    /// The implicit role every member of the guild holds.
    async fn default_role(&self, guild_id: GuildId) -> Result<Role, TransportError>;
}

/// Delivers replies back to where a message came from.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), TransportError>;
}

/// A fixed, in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    roles: HashMap<GuildId, HashMap<RoleId, Role>>,
    members: HashMap<(GuildId, UserId), Vec<RoleId>>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role to a guild.
    #[must_use]
    pub fn with_role(mut self, guild_id: GuildId, role: Role) -> Self {
        self.roles.entry(guild_id).or_default().insert(role.id, role);
        self
    }

    /// Declares the roles a member holds; unknown role ids are skipped on lookup.
    #[must_use]
    pub fn with_member(mut self, guild_id: GuildId, user_id: UserId, roles: Vec<RoleId>) -> Self {
        self.members.insert((guild_id, user_id), roles);
        self
    }
}

#[async_trait]
impl GuildDirectory for StaticDirectory {
    async fn member_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<Role>, TransportError> {
        let Some(role_ids) = self.members.get(&(guild_id, user_id)) else {
            return Ok(Vec::new());
        };
        let guild_roles = self.roles.get(&guild_id);

        Ok(role_ids
            .iter()
            .filter_map(|id| guild_roles.and_then(|roles| roles.get(id)).cloned())
            .collect())
    }

    async fn default_role(&self, guild_id: GuildId) -> Result<Role, TransportError> {
        Ok(self
            .roles
            .get(&guild_id)
            .and_then(|roles| roles.get(&RoleId::everyone(guild_id)))
            .cloned()
            .unwrap_or_else(|| Role::everyone(guild_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_member_roles_keep_member_order() {
        let guild = GuildId(1);
        let directory = StaticDirectory::new()
            .with_role(guild, Role::new(RoleId(10), "mod", 5))
            .with_role(guild, Role::new(RoleId(11), "admin", 9))
            .with_member(guild, UserId(3), vec![RoleId(11), RoleId(10), RoleId(99)]);

        let roles = directory.member_roles(guild, UserId(3)).await.unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["admin", "mod"]);
    }

    #[tokio::test]
    async fn test_unknown_member_has_no_roles() {
        let directory = StaticDirectory::new();
        let roles = directory.member_roles(GuildId(1), UserId(2)).await.unwrap();
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn test_default_role_is_synthesized() {
        let directory = StaticDirectory::new();
        let role = directory.default_role(GuildId(8)).await.unwrap();
        assert_eq!(role, Role::everyone(GuildId(8)));
    }
}
