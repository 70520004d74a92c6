//! Message pipeline: trigger detection, alias expansion, matching,
//! authorization and bounded execution.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::Services;
use crate::commands::{
    CommandContext, CommandResult, CommandTree, HandlerError, NodeAction, NodeId, find_command,
    normalize,
};
use crate::gateway::{Actor, InboundMessage, PresenceUpdate, TransportError};
use crate::modules::HookSet;
use crate::permissions::{PermissionContext, PermissionResolver};

/// Errors that prevent a message from being dispatched at all.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A branch without sub-commands was selected. Validation rules this out,
    /// so seeing it means the tree is corrupt.
    #[error("Command '{path}' has neither a handler nor sub-commands")]
    InvalidNode { path: String },

    #[error("Gateway error: {0}")]
    Transport(#[from] TransportError),
}

/// What happened to a message that addressed the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed { path: String, result: CommandResult },
    PermissionDenied { path: String },
    NotFound { query: String },
    BadUsage { path: String, message: String },
    TimedOut { path: String, limit: Duration },
    Failed { path: String, reason: String },
}

impl DispatchOutcome {
    /// Text to send back to the author, if any.
    #[must_use]
    pub fn reply_text(&self) -> Option<String> {
        match self {
            Self::Completed { result, .. } if result.message.is_empty() => None,
            Self::Completed { result, .. } if result.success => Some(result.message.clone()),
            Self::Completed { result, .. } => Some(result.to_string()),
            Self::PermissionDenied { path } => Some(format!("You are not allowed to use `{path}`.")),
            Self::NotFound { query } if query.is_empty() => None,
            Self::NotFound { query } => Some(format!("Unknown command `{query}`. Try `help`.")),
            Self::BadUsage { message, .. } => Some(message.clone()),
            Self::TimedOut { path, limit } => Some(format!(
                "`{path}` did not finish within {}s.",
                limit.as_secs()
            )),
            Self::Failed { path, reason } => Some(format!("`{path}` failed: {reason}")),
        }
    }
}

/// Routes inbound messages to command handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tree: Arc<CommandTree>,
    services: Arc<Services>,
    hooks: Arc<HookSet>,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(tree: Arc<CommandTree>, services: Arc<Services>, hooks: Arc<HookSet>) -> Self {
        Self {
            tree,
            services,
            hooks,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Processes one message.
    ///
    /// Returns `Ok(None)` when the message did not address the bot.
    pub async fn handle(&self, message: &InboundMessage) -> Result<Option<DispatchOutcome>, DispatchError> {
        let bot_user_id = self.services.identity.bot_user_id;
        if message.author == bot_user_id {
            return Ok(None);
        }

        let mut text = message.text.clone();
        self.hooks.rewrite_message(message, &mut text);

        let guild_id = message.channel.guild_id();
        let triggers = self.services.tables.triggers().await;
        let custom_trigger = guild_id.and_then(|id| triggers.get(id));
        let Some(mut query) = normalize(&text, &message.channel, bot_user_id, custom_trigger) else {
            return Ok(None);
        };

        if let Some(guild_id) = guild_id
            && let Some(expanded) = self.services.tables.aliases().await.rewrite(guild_id, &query)
        {
            debug!("Alias expanded '{}' to '{}'", query, expanded);
            query = expanded;
        }
        self.hooks.rewrite_query(message, &mut query);

        let permissions = self.permission_context(message).await?;

        let found = {
            let overrides = self.services.tables.overrides().await;
            let resolver = PermissionResolver::new(&self.tree, &permissions, &overrides);
            match find_command(&self.tree, self.tree.root(), &query, &|id| resolver.allows(id)) {
                Some(hit) => Ok((hit.node, hit.remainder.to_owned())),
                None => Err(self.unmatched(message, &query, &resolver)),
            }
        };

        let (node, remainder) = match found {
            Ok(found) => found,
            Err(outcome) => return Ok(Some(outcome)),
        };

        self.execute(message, node, &remainder, &permissions)
            .await
            .map(Some)
    }

    /// Runs `node` with `args`, bounded by its timeout.
    ///
    /// Permission is checked against the current override snapshot first, so
    /// an override revoked after matching still stops the handler.
    pub async fn execute(
        &self,
        message: &InboundMessage,
        node: NodeId,
        args: &str,
        permissions: &PermissionContext,
    ) -> Result<DispatchOutcome, DispatchError> {
        let command = self.tree.node(node);
        let path = self.tree.path(node);

        let overrides = self.services.tables.overrides().await;
        let decision = PermissionResolver::new(&self.tree, permissions, &overrides).check(node);
        drop(overrides);
        if !decision.allowed {
            info!("Permission denied: {} may not run '{}'", message.author, path);
            return Ok(DispatchOutcome::PermissionDenied { path });
        }

        let ctx = CommandContext {
            message,
            node,
            tree: &self.tree,
            services: &self.services,
            permissions,
        };

        let handler = match command.action() {
            NodeAction::Leaf(handler) => handler,
            NodeAction::Branch if command.children().is_empty() => {
                error!("Selected command '{}' has nothing to run", path);
                return Err(DispatchError::InvalidNode { path });
            }
            NodeAction::Branch => {
                let message = self.branch_usage(&ctx, &path).await;
                return Ok(DispatchOutcome::BadUsage { path, message });
            }
        };

        let limit = command
            .timeout()
            .unwrap_or_else(|| self.services.settings.command_timeout());
        debug!("Executing '{}' for {} with args '{}'", path, message.author, args);

        let outcome = match tokio::time::timeout(limit, handler.call(&ctx, args)).await {
            Err(_) => {
                warn!("Command '{}' timed out after {:?}", path, limit);
                DispatchOutcome::TimedOut { path, limit }
            }
            Ok(Ok(result)) => DispatchOutcome::Completed { path, result },
            Ok(Err(HandlerError::Usage(problem))) => {
                let message = if command.usage().is_empty() {
                    problem
                } else {
                    format!("{problem}\nUsage: {}", command.usage())
                };
                DispatchOutcome::BadUsage { path, message }
            }
            Ok(Err(e)) => {
                warn!("Command '{}' failed: {}", path, e);
                DispatchOutcome::Failed {
                    path,
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }

    /// Hands a presence change to the presence hooks.
    pub async fn notify_presence(&self, update: &PresenceUpdate) {
        self.hooks.notify_presence(update, &self.services).await;
    }

    async fn permission_context(&self, message: &InboundMessage) -> Result<PermissionContext, DispatchError> {
        let owner_id = self.services.identity.owner_id;
        let Some(guild_id) = message.channel.guild_id() else {
            return Ok(PermissionContext::direct(owner_id, message.author));
        };

        let directory = &self.services.directory;
        let (roles, default_role) = tokio::try_join!(
            directory.member_roles(guild_id, message.author),
            directory.default_role(guild_id),
        )?;

        Ok(PermissionContext::in_guild(
            owner_id,
            Actor::new(message.author, roles),
            guild_id,
            default_role,
        ))
    }

    /// Tells a denied command apart from an unknown one.
    ///
    /// A denial names the first command on the path the actor may not use,
    /// which is not always the deepest one matched.
    fn unmatched(
        &self,
        message: &InboundMessage,
        query: &str,
        resolver: &PermissionResolver<'_>,
    ) -> DispatchOutcome {
        let Some(hit) = find_command(&self.tree, self.tree.root(), query, &|_| true) else {
            debug!("No command matches '{}'", query);
            return DispatchOutcome::NotFound {
                query: query.to_owned(),
            };
        };

        let denied = self
            .tree
            .lineage(hit.node)
            .into_iter()
            .find(|&id| !resolver.allows(id))
            .unwrap_or(hit.node);
        let path = self.tree.path(denied);
        info!("Permission denied: {} may not use '{}'", message.author, path);
        DispatchOutcome::PermissionDenied { path }
    }

    async fn branch_usage(&self, ctx: &CommandContext<'_>, path: &str) -> String {
        let options: Vec<&str> = ctx
            .allowed_children(ctx.node)
            .await
            .into_iter()
            .map(|child| self.tree.node(child).trigger())
            .filter(|trigger| !trigger.is_empty())
            .collect();

        if options.is_empty() {
            format!("You may not use any sub-command of `{path}`.")
        } else {
            format!("Usage: {path} <{}>", options.join("|"))
        }
    }
}
