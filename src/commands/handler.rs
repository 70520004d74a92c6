//! The handler contract every leaf command implements.

use async_trait::async_trait;
use thiserror::Error;

use super::{CommandResult, CommandTree, NodeId};
use crate::gateway::{GuildId, InboundMessage, TransportError};
use crate::permissions::{PermissionContext, PermissionResolver};
use crate::runtime::Services;
use crate::store::StoreError;

/// Errors a handler may return instead of a [`CommandResult`].
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The arguments did not fit the command's usage.
    #[error("{0}")]
    Usage(String),

    #[error("This command can only be used inside a guild")]
    GuildOnly,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Gateway error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Failed(String),
}

/// Everything a handler can see about the invocation.
pub struct CommandContext<'a> {
    pub message: &'a InboundMessage,
    /// The node being executed.
    pub node: NodeId,
    pub tree: &'a CommandTree,
    pub services: &'a Services,
    /// The permission context the invocation was authorized with.
    pub permissions: &'a PermissionContext,
}

impl CommandContext<'_> {
    /// Guild the message was posted in.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::GuildOnly`] for direct messages.
    pub fn guild_id(&self) -> Result<GuildId, HandlerError> {
        self.message.channel.guild_id().ok_or(HandlerError::GuildOnly)
    }

    /// Command path of the executing node.
    #[must_use]
    pub fn path(&self) -> String {
        self.tree.path(self.node)
    }

    /// Children of `parent` the invoking actor may use, checked against the
    /// current override snapshot.
    pub async fn allowed_children(&self, parent: NodeId) -> Vec<NodeId> {
        let overrides = self.services.tables.overrides().await;
        let resolver = PermissionResolver::new(self.tree, self.permissions, &overrides);
        self.tree
            .node(parent)
            .children()
            .iter()
            .copied()
            .filter(|&child| resolver.allows(child))
            .collect()
    }
}

impl std::fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("message", self.message)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// A leaf command's body.
///
/// `args` is the part of the query the matcher did not consume, already
/// trimmed of leading whitespace.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(
        &self,
        ctx: &CommandContext<'_>,
        args: &str,
    ) -> Result<CommandResult, HandlerError>;
}
