//! Greeting, help and reload.

use async_trait::async_trait;
use tracing::info;

use super::args::resolve_path;
use crate::commands::{CommandContext, CommandHandler, CommandResult, CommandSpec, HandlerError};
use crate::modules::Module;

/// Answers a bare mention.
pub struct GreetingModule;

impl Module for GreetingModule {
    fn name(&self) -> &str {
        "greeting"
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("")
            .description("Say hello")
            .handler(Greet)
    }
}

struct Greet;

#[async_trait]
impl CommandHandler for Greet {
    async fn call(&self, _ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        Ok(CommandResult::success("Hi! Mention me with `help` to see what I can do."))
    }
}

/// Lists the commands the invoking actor may use.
pub struct HelpModule;

impl Module for HelpModule {
    fn name(&self) -> &str {
        "help"
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("help")
            .description("Show available commands")
            .usage("help [command]")
            .accepts_parameters()
            .handler(Help)
    }
}

struct Help;

#[async_trait]
impl CommandHandler for Help {
    async fn call(&self, ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        let tree = ctx.tree;
        let target = if args.trim().is_empty() {
            tree.root()
        } else {
            resolve_path(ctx, args)?.0
        };

        let mut lines = Vec::new();
        if target != tree.root() {
            let node = tree.node(target);
            lines.push(format!("`{}` - {}", tree.path(target), node.description()));
            if !node.usage().is_empty() {
                lines.push(format!("Usage: {}", node.usage()));
            }
        }
        for child in ctx.allowed_children(target).await {
            let node = tree.node(child);
            if !node.trigger().is_empty() {
                lines.push(format!("`{}` - {}", tree.path(child), node.description()));
            }
        }

        if lines.is_empty() {
            return Ok(CommandResult::success("No commands available."));
        }
        Ok(CommandResult::success(lines.join("\n")))
    }
}

/// Re-reads every stored table. Owner only.
pub struct ReloadModule;

impl Module for ReloadModule {
    fn name(&self) -> &str {
        "reload"
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("reload")
            .description("Reload overrides, aliases and triggers from storage")
            .owner_only()
            .handler(Reload)
    }
}

struct Reload;

#[async_trait]
impl CommandHandler for Reload {
    async fn call(&self, ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        ctx.services.tables.reload_all().await?;
        info!("Tables reloaded by {}", ctx.message.author);
        Ok(CommandResult::success("Reloaded overrides, aliases and triggers."))
    }
}
