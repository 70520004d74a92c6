//! Identifiers and message types shared with the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// Identity of a user account.
    UserId
);
snowflake!(
    /// Identity of a guild (server).
    GuildId
);
snowflake!(
    /// Identity of a guild role.
    RoleId
);
snowflake!(
    /// Identity of a text channel.
    ChannelId
);

impl RoleId {
    /// The implicit "@everyone" role of a guild shares the guild's id.
    #[must_use]
    pub const fn everyone(guild_id: GuildId) -> Self {
        Self(guild_id.0)
    }
}

/// A guild role with its seniority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    /// Higher rank means more senior.
    pub rank: i64,
}

impl Role {
    #[must_use]
    pub fn new(id: RoleId, name: impl Into<String>, rank: i64) -> Self {
        Self {
            id,
            name: name.into(),
            rank,
        }
    }

    /// The implicit lowest-ranked role every member of `guild_id` holds.
    #[must_use]
    pub fn everyone(guild_id: GuildId) -> Self {
        Self::new(RoleId::everyone(guild_id), "@everyone", 0)
    }
}

/// The author of a message together with the roles they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub roles: Vec<Role>,
}

impl Actor {
    #[must_use]
    pub const fn new(id: UserId, roles: Vec<Role>) -> Self {
        Self { id, roles }
    }
}

/// Where a message was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// One-to-one conversation with the bot.
    Direct(ChannelId),
    /// Shared channel inside a guild.
    Guild {
        guild_id: GuildId,
        channel_id: ChannelId,
    },
}

impl ChannelKind {
    #[must_use]
    pub const fn guild_id(&self) -> Option<GuildId> {
        match self {
            Self::Direct(_) => None,
            Self::Guild { guild_id, .. } => Some(*guild_id),
        }
    }

    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        match self {
            Self::Direct(channel_id) | Self::Guild { channel_id, .. } => *channel_id,
        }
    }

    #[must_use]
    pub const fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }
}

/// A chat message delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel: ChannelKind,
    pub author: UserId,
    pub text: String,
}

impl InboundMessage {
    #[must_use]
    pub fn new(channel: ChannelKind, author: UserId, text: impl Into<String>) -> Self {
        Self {
            channel,
            author,
            text: text.into(),
        }
    }
}

/// Online status reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Online,
    Idle,
    DoNotDisturb,
    Offline,
}

/// A member's presence changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
    pub status: PresenceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everyone_role_shares_guild_id() {
        let role = Role::everyone(GuildId(42));
        assert_eq!(role.id, RoleId(42));
        assert_eq!(role.rank, 0);
    }

    #[test]
    fn test_channel_kind_guild_id() {
        let dm = ChannelKind::Direct(ChannelId(5));
        let guild = ChannelKind::Guild {
            guild_id: GuildId(1),
            channel_id: ChannelId(6),
        };
        assert_eq!(dm.guild_id(), None);
        assert!(dm.is_direct());
        assert_eq!(guild.guild_id(), Some(GuildId(1)));
        assert_eq!(guild.channel_id(), ChannelId(6));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&RoleId(77)).unwrap();
        assert_eq!(json, "77");
    }
}
