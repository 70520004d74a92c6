//! Chat gateway collaborator interfaces.
//!
//! The router never talks to a chat platform directly. Inbound messages and
//! presence changes arrive as plain values, member roles are looked up through
//! a [`GuildDirectory`], and replies leave through a [`Responder`].

mod directory;
mod types;

pub use directory::{GuildDirectory, Responder, StaticDirectory, TransportError};
pub use types::{
    Actor, ChannelId, ChannelKind, GuildId, InboundMessage, PresenceStatus, PresenceUpdate, Role,
    RoleId, UserId,
};
