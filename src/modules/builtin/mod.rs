//! Modules every bot carries: greeting, help, reload and the administrative
//! commands that edit overrides, aliases and custom triggers.

mod alias;
mod args;
mod general;
mod permissions;
mod trigger;

pub use alias::AliasModule;
pub use general::{GreetingModule, HelpModule, ReloadModule};
pub use permissions::PermissionsModule;
pub use trigger::TriggerModule;

use super::Module;

/// The built-in modules in registration order.
#[must_use]
pub fn builtin_modules() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(GreetingModule),
        Box::new(HelpModule),
        Box::new(ReloadModule),
        Box::new(PermissionsModule),
        Box::new(AliasModule),
        Box::new(TriggerModule),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gateway::{InboundMessage, UserId};
    use crate::modules::ModuleManager;
    use crate::runtime::{DispatchOutcome, Dispatcher};
    use crate::test_support::{self, MEMBER, OWNER};

    async fn bot() -> Dispatcher {
        let services = test_support::services().await;
        let mut manager = ModuleManager::new();
        for module in builtin_modules() {
            manager.register_boxed(module).unwrap();
        }
        let started = manager.start(&services).await.unwrap();
        Dispatcher::new(
            Arc::new(started.tree),
            Arc::new(services),
            Arc::new(started.hooks),
        )
    }

    async fn say(bot: &Dispatcher, author: UserId, query: &str) -> DispatchOutcome {
        send(bot, &test_support::guild_message(author, query)).await
    }

    async fn send(bot: &Dispatcher, message: &InboundMessage) -> DispatchOutcome {
        bot.handle(message).await.unwrap().unwrap()
    }

    fn reply(outcome: &DispatchOutcome) -> String {
        outcome.reply_text().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_bare_mention_greets() {
        let bot = bot().await;
        let outcome = say(&bot, MEMBER, "").await;
        assert!(reply(&outcome).starts_with("Hi!"));
    }

    #[tokio::test]
    async fn test_help_hides_what_the_actor_cannot_use() {
        let bot = bot().await;

        let member = reply(&say(&bot, MEMBER, "help").await);
        let owner = reply(&say(&bot, OWNER, "help").await);

        assert!(member.contains("`help`"));
        assert!(!member.contains("`reload`"));
        assert!(owner.contains("`reload`"));

        let member = reply(&say(&bot, MEMBER, "help permissions").await);
        assert!(member.contains("`permissions list`"));
        assert!(!member.contains("`permissions allow`"));
    }

    #[tokio::test]
    async fn test_reload_is_owner_only() {
        let bot = bot().await;

        assert_eq!(
            say(&bot, MEMBER, "reload").await,
            DispatchOutcome::PermissionDenied {
                path: "reload".to_owned()
            }
        );
        assert!(reply(&say(&bot, OWNER, "reload").await).starts_with("Reloaded"));
    }

    #[tokio::test]
    async fn test_override_grants_admin_command() {
        let bot = bot().await;

        assert!(matches!(
            say(&bot, MEMBER, "alias add h = help").await,
            DispatchOutcome::PermissionDenied { .. }
        ));

        let granted = say(&bot, OWNER, "permissions allow <@&200> ALIAS add").await;
        assert_eq!(reply(&granted), "`alias add` is now allowed for <@&200>.");

        let added = say(&bot, MEMBER, "alias add h = help").await;
        assert_eq!(reply(&added), "`h` now runs `help`.");

        let listed = reply(&say(&bot, MEMBER, "permissions list").await);
        assert!(listed.starts_with("`alias add` allowed for <@&200>"));

        let reset = say(&bot, OWNER, "permissions reset 200 alias add").await;
        assert!(reply(&reset).starts_with("Removed"));
        assert!(matches!(
            say(&bot, MEMBER, "alias add h2 = help").await,
            DispatchOutcome::PermissionDenied { .. }
        ));
    }

    #[tokio::test]
    async fn test_everyone_deny_blocks_default_command() {
        let bot = bot().await;
        say(&bot, OWNER, "permissions deny everyone trigger show").await;

        let outcome = say(&bot, MEMBER, "trigger show").await;

        assert_eq!(
            outcome,
            DispatchOutcome::PermissionDenied {
                path: "trigger show".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_admin_commands_reject_bad_arguments() {
        let bot = bot().await;

        let bad_role = say(&bot, OWNER, "permissions allow moderators help").await;
        assert_eq!(
            reply(&bad_role),
            "Not a role: `moderators`\nUsage: permissions allow <role> <command>"
        );

        let bad_path = say(&bot, OWNER, "alias add x = nowhere").await;
        assert!(matches!(bad_path, DispatchOutcome::BadUsage { .. }));

        let in_dm = send(&bot, &test_support::direct_message(OWNER, "alias list")).await;
        assert!(matches!(in_dm, DispatchOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_alias_and_trigger_round_trip() {
        let bot = bot().await;

        say(&bot, OWNER, "alias add ts = trigger show").await;
        say(&bot, OWNER, "trigger set !").await;

        let custom = InboundMessage::new(
            test_support::guild_message(MEMBER, "").channel,
            MEMBER,
            "!ts",
        );
        assert_eq!(reply(&send(&bot, &custom).await), "Custom trigger: `!`");
        assert!(reply(&say(&bot, MEMBER, "alias list").await).starts_with("`ts` -> `trigger show`"));

        say(&bot, OWNER, "trigger reset").await;
        assert!(bot.handle(&custom).await.unwrap().is_none());

        say(&bot, OWNER, "alias remove ts").await;
        assert_eq!(
            say(&bot, MEMBER, "ts").await,
            DispatchOutcome::NotFound {
                query: "ts".to_owned()
            }
        );
    }
}
