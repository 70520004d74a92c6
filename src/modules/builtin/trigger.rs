//! `trigger set|reset|show`: a guild prefix that addresses the bot.

use async_trait::async_trait;
use tracing::info;

use crate::commands::{CommandContext, CommandHandler, CommandResult, CommandSpec, HandlerError};
use crate::modules::Module;

pub struct TriggerModule;

impl Module for TriggerModule {
    fn name(&self) -> &str {
        "trigger"
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new("trigger")
            .description("Manage the custom trigger of this guild")
            .child(
                CommandSpec::new("set")
                    .description("Address the bot with a prefix instead of a mention")
                    .usage("trigger set <prefix>")
                    .accepts_parameters()
                    .default_permission(false)
                    .handler(SetTrigger),
            )
            .child(
                CommandSpec::new("reset")
                    .description("Go back to mentions only")
                    .default_permission(false)
                    .handler(ResetTrigger),
            )
            .child(
                CommandSpec::new("show")
                    .description("Show the custom trigger")
                    .handler(ShowTrigger),
            )
    }
}

struct SetTrigger;

#[async_trait]
impl CommandHandler for SetTrigger {
    async fn call(&self, ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let trigger = args.trim();
        if trigger.is_empty() {
            return Err(HandlerError::Usage("Missing prefix".to_owned()));
        }
        if trigger.contains(char::is_whitespace) {
            return Err(HandlerError::Usage("The prefix cannot contain spaces".to_owned()));
        }
        if trigger.starts_with("<@") {
            return Err(HandlerError::Usage("The prefix cannot be a mention".to_owned()));
        }

        ctx.services.tables.set_trigger(guild_id, trigger).await?;
        info!("Guild {}: custom trigger set to '{}'", guild_id, trigger);
        Ok(CommandResult::success(format!("I now also answer to `{trigger}`.")))
    }
}

struct ResetTrigger;

#[async_trait]
impl CommandHandler for ResetTrigger {
    async fn call(&self, ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        if ctx.services.tables.clear_trigger(guild_id).await? {
            info!("Guild {}: custom trigger removed", guild_id);
            Ok(CommandResult::success("Custom trigger removed; mention me instead."))
        } else {
            Ok(CommandResult::error("This guild has no custom trigger."))
        }
    }
}

struct ShowTrigger;

#[async_trait]
impl CommandHandler for ShowTrigger {
    async fn call(&self, ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        let guild_id = ctx.guild_id()?;
        let triggers = ctx.services.tables.triggers().await;
        Ok(CommandResult::success(triggers.get(guild_id).map_or_else(
            || "No custom trigger; mention me.".to_owned(),
            |trigger| format!("Custom trigger: `{trigger}`"),
        )))
    }
}
