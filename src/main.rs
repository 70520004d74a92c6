//! Guild Command Router - Main Entry Point
//!
//! Runs the command router against a console gateway: every line read from
//! stdin is routed as a message from one user, and replies are printed.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use guild_command_router::commands::CommandTree;
use guild_command_router::config::{BotIdentity, BotSettings};
use guild_command_router::gateway::{
    ChannelId, ChannelKind, GuildId, InboundMessage, Responder, Role, RoleId, StaticDirectory,
    TransportError, UserId,
};
use guild_command_router::modules::ModuleManager;
use guild_command_router::modules::builtin::builtin_modules;
use guild_command_router::runtime::{BotRunner, Dispatcher, RunnerMessage, Services};
use guild_command_router::store::{JsonFileStore, Tables};

/// Chat bot command router with role-based permissions.
#[derive(Parser, Debug)]
#[command(name = "command_router")]
#[command(about = "Route chat messages to commands, driven from the console")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Post console messages in this guild instead of a direct message.
    #[arg(short, long)]
    guild: Option<u64>,

    /// Author of console messages (defaults to the owner).
    #[arg(short, long)]
    user: Option<u64>,

    /// Give the console user a role, as `<role id>:<rank>`. Repeatable.
    #[arg(long = "role", value_parser = parse_role_arg)]
    roles: Vec<(u64, i64)>,

    /// Print the assembled command tree and exit.
    #[arg(long)]
    print_tree: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let identity = BotIdentity::from_env().context("Failed to load bot identity from environment")?;
    let settings = BotSettings::from_env_with_defaults();

    let storage = Arc::new(JsonFileStore::new(&settings.data_path));
    let tables = Tables::load(storage)
        .await
        .with_context(|| format!("Failed to load {}", settings.data_path.display()))?;

    let user = args.user.map_or(identity.owner_id, UserId);
    let directory = console_directory(args.guild.map(GuildId), user, &args.roles);
    let services = Arc::new(Services::new(identity, settings, tables, Arc::new(directory)));

    // Assemble modules
    let mut manager = ModuleManager::new();
    for module in builtin_modules() {
        manager
            .register_boxed(module)
            .context("Failed to register module")?;
    }
    let started = manager
        .start(&services)
        .await
        .context("Module startup failed")?;

    if args.print_tree {
        print_tree(&started.tree);
        manager.shutdown().await;
        return Ok(());
    }

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(started.tree),
        Arc::clone(&services),
        Arc::new(started.hooks),
    ));
    let runner = BotRunner::new(dispatcher, Arc::new(ConsoleResponder));

    let (runner_tx, runner_rx) = mpsc::channel::<RunnerMessage>(32);
    let runner_handle = tokio::spawn(async move {
        runner.run(runner_rx).await;
    });

    let channel = args.guild.map_or(ChannelKind::Direct(ChannelId(1)), |guild| ChannelKind::Guild {
        guild_id: GuildId(guild),
        channel_id: ChannelId(1),
    });
    if channel.is_direct() {
        info!("Console is a direct message from {}. Type commands, Ctrl+C to stop.", user);
    } else {
        info!(
            "Console posts in guild {} as {}. Address the bot with <@{}> or the guild trigger.",
            args.guild.unwrap_or_default(),
            user,
            services.identity.bot_user_id
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            line = lines.next_line() => {
                let Some(text) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if text.trim().is_empty() {
                    continue;
                }
                let message = InboundMessage::new(channel, user, text);
                if runner_tx.send(RunnerMessage::Inbound(message)).await.is_err() {
                    break;
                }
            }
        }
    }

    // Cleanup
    info!("Shutting down...");
    let _ = runner_tx.send(RunnerMessage::Shutdown).await;
    let _ = runner_handle.await;

    let failures = manager.shutdown().await;
    if !failures.is_empty() {
        warn!("{} module(s) failed to tear down cleanly", failures.len());
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn parse_role_arg(value: &str) -> Result<(u64, i64), String> {
    let (id, rank) = value
        .split_once(':')
        .ok_or_else(|| format!("expected <role id>:<rank>, got '{value}'"))?;
    let id = id.parse().map_err(|_| format!("invalid role id '{id}'"))?;
    let rank = rank.parse().map_err(|_| format!("invalid rank '{rank}'"))?;
    Ok((id, rank))
}

/// Role data for the console user; empty outside a guild.
fn console_directory(guild: Option<GuildId>, user: UserId, roles: &[(u64, i64)]) -> StaticDirectory {
    let Some(guild_id) = guild else {
        return StaticDirectory::new();
    };

    let mut directory = StaticDirectory::new().with_role(guild_id, Role::everyone(guild_id));
    for &(id, rank) in roles {
        directory = directory.with_role(guild_id, Role::new(RoleId(id), format!("role-{id}"), rank));
    }
    directory.with_member(guild_id, user, roles.iter().map(|&(id, _)| RoleId(id)).collect())
}

fn print_tree(tree: &CommandTree) {
    for (depth, id) in tree.walk() {
        let node = tree.node(id);
        let trigger = if node.trigger().is_empty() {
            "<mention>"
        } else {
            node.trigger()
        };

        let mut flags = Vec::new();
        if node.owner_only() {
            flags.push("owner");
        } else if !node.default_permission() {
            flags.push("restricted");
        }
        if node.accepts_parameters() {
            flags.push("args");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        println!("{}{trigger}{flags} - {}", "  ".repeat(depth), node.description());
    }
}

/// Prints replies to stdout.
struct ConsoleResponder;

#[async_trait]
impl Responder for ConsoleResponder {
    async fn reply(&self, _message: &InboundMessage, text: &str) -> Result<(), TransportError> {
        println!("{text}");
        Ok(())
    }
}
