//! `alias add|remove|list`: guild-scoped shorthands for command paths.

use async_trait::async_trait;
use tracing::info;

use super::args::resolve_path;
use crate::commands::{CommandContext, CommandHandler, CommandResult, CommandSpec, HandlerError};
use crate::modules::Module;

pub struct AliasModule;

impl Module for AliasModule {
    fn name(&self) -> &str {
        "alias"
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("alias")
            .description("Manage command aliases")
            .child(
                CommandSpec::new("add")
                    .description("Make a short text expand to a command")
                    .usage("alias add <alias> = <command>")
                    .accepts_parameters()
                    .default_permission(false)
                    .handler(AddAlias),
            )
            .child(
                CommandSpec::new("remove")
                    .description("Delete an alias")
                    .usage("alias remove <alias>")
                    .accepts_parameters()
                    .default_permission(false)
                    .handler(RemoveAlias),
            )
            .child(
                CommandSpec::new("list")
                    .description("List the aliases of this guild")
                    .handler(ListAliases),
            )
    }
}

/// Collapses runs of whitespace so stored aliases match normalized queries.
fn normalize_alias(alias: &str) -> String {
    alias.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct AddAlias;

#[async_trait]
impl CommandHandler for AddAlias {
    async fn call(&self, ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let (alias, path) = args
            .split_once('=')
            .ok_or_else(|| HandlerError::Usage("Missing `=` between alias and command".to_owned()))?;

        let alias = normalize_alias(alias);
        if alias.is_empty() {
            return Err(HandlerError::Usage("Missing alias".to_owned()));
        }
        let (_, path) = resolve_path(ctx, path)?;

        ctx.services.tables.set_alias(guild_id, &alias, &path).await?;
        info!("Guild {}: alias '{}' -> '{}'", guild_id, alias, path);
        Ok(CommandResult::success(format!("`{alias}` now runs `{path}`.")))
    }
}

struct RemoveAlias;

#[async_trait]
impl CommandHandler for RemoveAlias {
    async fn call(&self, ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let alias = normalize_alias(args);
        if alias.is_empty() {
            return Err(HandlerError::Usage("Missing alias".to_owned()));
        }

        if ctx.services.tables.remove_alias(guild_id, &alias).await? {
            info!("Guild {}: alias '{}' removed", guild_id, alias);
            Ok(CommandResult::success(format!("Removed alias `{alias}`.")))
        } else {
            Ok(CommandResult::error(format!("No alias `{alias}`.")))
        }
    }
}

struct ListAliases;

#[async_trait]
impl CommandHandler for ListAliases {
    async fn call(&self, ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let aliases = ctx.services.tables.aliases().await;
        let entries = aliases.for_guild(guild_id);
        if entries.is_empty() {
            return Ok(CommandResult::success("No aliases in this guild."));
        }

        let mut lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                format!(
                    "`{}` -> `{}` (since {})",
                    entry.alias,
                    entry.target,
                    entry.created_at.format("%Y-%m-%d")
                )
            })
            .collect();
        lines.sort();
        Ok(CommandResult::success(lines.join("\n")))
    }
}
