//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::commands::{CommandContext, CommandHandler, CommandResult, HandlerError};
use crate::config::{BotIdentity, BotSettings};
use crate::gateway::{
    ChannelId, ChannelKind, GuildId, InboundMessage, Role, RoleId, StaticDirectory, UserId,
};
use crate::runtime::Services;
use crate::store::{MemoryStore, Tables};

pub const OWNER: UserId = UserId(1);
pub const BOT: UserId = UserId(2);
pub const MEMBER: UserId = UserId(3);
pub const GUILD: GuildId = GuildId(100);
pub const MODERATOR: RoleId = RoleId(200);

/// Replies with a fixed text.
pub struct StaticReply(pub &'static str);

#[async_trait]
impl CommandHandler for StaticReply {
    async fn call(&self, _ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        Ok(CommandResult::success(self.0))
    }
}

/// Records the arguments of every call.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn call(&self, _ctx: &CommandContext<'_>, args: &str) -> Result<CommandResult, HandlerError> {
        self.calls.lock().unwrap().push(args.to_owned());
        Ok(CommandResult::success(format!("called with '{args}'")))
    }
}

/// Sleeps for a fixed time before answering.
pub struct SlowHandler(pub Duration);

#[async_trait]
impl CommandHandler for SlowHandler {
    async fn call(&self, _ctx: &CommandContext<'_>, _args: &str) -> Result<CommandResult, HandlerError> {
        tokio::time::sleep(self.0).await;
        Ok(CommandResult::success("finally"))
    }
}

/// A directory where `MEMBER` holds the moderator role in `GUILD`.
pub fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_role(GUILD, Role::everyone(GUILD))
        .with_role(GUILD, Role::new(MODERATOR, "Moderator", 5))
        .with_member(GUILD, MEMBER, vec![MODERATOR])
}

pub async fn services() -> Services {
    services_with(directory()).await
}

pub async fn services_with(directory: StaticDirectory) -> Services {
    let tables = Tables::load(Arc::new(MemoryStore::new())).await.unwrap();
    Services::new(
        BotIdentity::new(OWNER, BOT),
        BotSettings::default(),
        tables,
        Arc::new(directory),
    )
}

/// A message from `author` in `GUILD`, addressed to the bot by mention.
pub fn guild_message(author: UserId, query: &str) -> InboundMessage {
    InboundMessage::new(
        ChannelKind::Guild {
            guild_id: GUILD,
            channel_id: ChannelId(10),
        },
        author,
        format!("<@{BOT}> {query}"),
    )
}

pub fn direct_message(author: UserId, text: &str) -> InboundMessage {
    InboundMessage::new(ChannelKind::Direct(ChannelId(11)), author, text)
}
