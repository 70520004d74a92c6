//! Shared state handed to every pipeline stage.

use std::sync::Arc;

use crate::config::{BotIdentity, BotSettings};
use crate::gateway::GuildDirectory;
use crate::store::Tables;

/// Everything the router needs besides the command tree.
///
/// One instance exists per running bot and is passed by reference, so several
/// bots in one process never share state.
pub struct Services {
    pub identity: BotIdentity,
    pub settings: BotSettings,
    pub tables: Tables,
    pub directory: Arc<dyn GuildDirectory>,
}

impl Services {
    #[must_use]
    pub fn new(
        identity: BotIdentity,
        settings: BotSettings,
        tables: Tables,
        directory: Arc<dyn GuildDirectory>,
    ) -> Self {
        Self {
            identity,
            settings,
            tables,
            directory,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("identity", &self.identity)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
