//! `permissions allow|deny|reset|list`: per-role command overrides.

use async_trait::async_trait;
use tracing::info;

use super::args::{parse_role, resolve_path, role_label, split_word};
use crate::commands::{CommandContext, CommandHandler, CommandResult, CommandSpec, HandlerError};
use crate::gateway::{GuildId, RoleId};
use crate::modules::Module;

pub struct PermissionsModule;

impl Module for PermissionsModule {
    fn name(&self) -> &str {
        "permissions"
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("permissions")
            .description("Manage who may use which command")
            .child(
                CommandSpec::new("allow")
                    .description("Allow a role to use a command")
                    .usage("permissions allow <role> <command>")
                    .accepts_parameters()
                    .default_permission(false)
                    .handler(SetOverride { allow: true }),
            )
            .child(
                CommandSpec::new("deny")
                    .description("Forbid a role to use a command")
                    .usage("permissions deny <role> <command>")
                    .accepts_parameters()
                    .default_permission(false)
                    .handler(SetOverride { allow: false }),
            )
            .child(
                CommandSpec::new("reset")
                    .description("Remove a role's override for a command")
                    .usage("permissions reset <role> <command>")
                    .accepts_parameters()
                    .default_permission(false)
                    .handler(ResetOverride),
            )
            .child(
                CommandSpec::new("list")
                    .description("List the overrides of this guild")
                    .handler(ListOverrides),
            )
    }
}

fn role_and_path<'a>(args: &'a str, guild_id: GuildId) -> Result<(RoleId, &'a str), HandlerError> {
    let (role, path) = split_word(args).ok_or_else(|| HandlerError::Usage("Missing role".to_owned()))?;
    let role_id =
        parse_role(role, guild_id).ok_or_else(|| HandlerError::Usage(format!("Not a role: `{role}`")))?;
    Ok((role_id, path))
}

struct SetOverride {
    allow: bool,
}

#[async_trait]
impl CommandHandler for SetOverride {
    async fn call(&self, ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let (role_id, path) = role_and_path(args, guild_id)?;
        let (_, path) = resolve_path(ctx, path)?;

        ctx.services
            .tables
            .set_override(guild_id, role_id, &path, self.allow)
            .await?;

        let verb = if self.allow { "allowed" } else { "denied" };
        info!("Guild {}: '{}' {} for role {}", guild_id, path, verb, role_id);
        Ok(CommandResult::success(format!(
            "`{path}` is now {verb} for {}.",
            role_label(role_id, guild_id)
        )))
    }
}

struct ResetOverride;

#[async_trait]
impl CommandHandler for ResetOverride {
    async fn call(&self, ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let (role_id, path) = role_and_path(args, guild_id)?;
        let (_, path) = resolve_path(ctx, path)?;

        let role = role_label(role_id, guild_id);
        if ctx.services.tables.clear_override(guild_id, role_id, &path).await? {
            info!("Guild {}: override of '{}' for role {} removed", guild_id, path, role_id);
            Ok(CommandResult::success(format!("Removed the override of `{path}` for {role}.")))
        } else {
            Ok(CommandResult::error(format!("{role} has no override for `{path}`.")))
        }
    }
}

struct ListOverrides;

#[async_trait]
impl CommandHandler for ListOverrides {
    async fn call(&self, ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let entries = ctx.services.tables.overrides().await.for_guild(guild_id);
        if entries.is_empty() {
            return Ok(CommandResult::success("No overrides in this guild."));
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                format!(
                    "`{}` {} for {} (since {})",
                    entry.command_path,
                    if entry.allow { "allowed" } else { "denied" },
                    role_label(entry.role_id, guild_id),
                    entry.created_at.format("%Y-%m-%d")
                )
            })
            .collect();
        Ok(CommandResult::success(lines.join("\n")))
    }
}
