//! Command tree, matching and query preprocessing.
//!
//! A message becomes a query in three steps: [`normalize`] strips the mention
//! or custom trigger that addressed the bot, [`AliasTable::rewrite`] expands a
//! guild alias at its head, and [`find_command`] walks the [`CommandTree`] to
//! the deepest node the actor may use.

mod alias;
mod handler;
mod matcher;
mod node;
mod tree;
mod trigger;
mod types;

pub use alias::{AliasEntry, AliasTable, rewrite_alias};
pub use handler::{CommandContext, CommandHandler, HandlerError};
pub use matcher::{CommandMatch, find_command, strip_trigger};
pub use node::{CommandNode, CommandSpec, NodeAction, NodeId};
pub use tree::{CommandTree, TreeBuilder, TreeError};
pub use trigger::{TriggerTable, normalize, strip_mention};
pub use types::CommandResult;
