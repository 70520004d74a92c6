//! Typed lifecycle and pipeline hooks.
//!
//! A module registers at most one hook per phase through [`ModuleHooks`]. At
//! startup the manager collects them into a [`HookSet`], keeping registration
//! order, which the dispatcher consults for every message.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::gateway::{InboundMessage, PresenceUpdate, TransportError};
use crate::runtime::Services;
use crate::store::StoreError;

/// Failure reported by a startup or teardown hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Gateway error: {0}")]
    Transport(#[from] TransportError),
}

/// Runs once after the tree is validated, in registration order.
#[async_trait]
pub trait StartupHook: Send + Sync {
    async fn on_startup(&self, services: &Services) -> Result<(), HookError>;
}

/// Runs once at shutdown, in reverse registration order.
#[async_trait]
pub trait TeardownHook: Send + Sync {
    async fn on_teardown(&self) -> Result<(), HookError>;
}

/// Edits the query after trigger stripping and alias expansion, before matching.
pub trait QueryRewriteHook: Send + Sync {
    fn rewrite_query(&self, message: &InboundMessage, query: &mut String);
}

/// Edits the raw message text before trigger detection.
pub trait TriggerRewriteHook: Send + Sync {
    fn rewrite_message(&self, message: &InboundMessage, text: &mut String);
}

/// Observes member presence changes.
#[async_trait]
pub trait PresenceHook: Send + Sync {
    async fn on_presence(&self, update: &PresenceUpdate, services: &Services);
}

/// The hooks one module contributes.
#[derive(Clone, Default)]
pub struct ModuleHooks {
    pub(crate) startup: Option<Arc<dyn StartupHook>>,
    pub(crate) teardown: Option<Arc<dyn TeardownHook>>,
    pub(crate) query_rewrite: Option<Arc<dyn QueryRewriteHook>>,
    pub(crate) trigger_rewrite: Option<Arc<dyn TriggerRewriteHook>>,
    pub(crate) presence: Option<Arc<dyn PresenceHook>>,
}

impl ModuleHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_startup(mut self, hook: impl StartupHook + 'static) -> Self {
        self.startup = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_teardown(mut self, hook: impl TeardownHook + 'static) -> Self {
        self.teardown = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn rewrite_query(mut self, hook: impl QueryRewriteHook + 'static) -> Self {
        self.query_rewrite = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn rewrite_message(mut self, hook: impl TriggerRewriteHook + 'static) -> Self {
        self.trigger_rewrite = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_presence(mut self, hook: impl PresenceHook + 'static) -> Self {
        self.presence = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for ModuleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHooks")
            .field("startup", &self.startup.is_some())
            .field("teardown", &self.teardown.is_some())
            .field("query_rewrite", &self.query_rewrite.is_some())
            .field("trigger_rewrite", &self.trigger_rewrite.is_some())
            .field("presence", &self.presence.is_some())
            .finish()
    }
}

/// Per-message hooks of every started module, in registration order.
#[derive(Clone, Default)]
pub struct HookSet {
    query_rewrites: Vec<Arc<dyn QueryRewriteHook>>,
    trigger_rewrites: Vec<Arc<dyn TriggerRewriteHook>>,
    presence: Vec<Arc<dyn PresenceHook>>,
}

impl HookSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the per-message hooks of one module.
    pub fn extend(&mut self, hooks: &ModuleHooks) {
        self.query_rewrites.extend(hooks.query_rewrite.clone());
        self.trigger_rewrites.extend(hooks.trigger_rewrite.clone());
        self.presence.extend(hooks.presence.clone());
    }

    /// Applies every trigger rewrite hook to the raw text.
    pub fn rewrite_message(&self, message: &InboundMessage, text: &mut String) {
        for hook in &self.trigger_rewrites {
            hook.rewrite_message(message, text);
        }
    }

    /// Applies every query rewrite hook to the query.
    pub fn rewrite_query(&self, message: &InboundMessage, query: &mut String) {
        for hook in &self.query_rewrites {
            hook.rewrite_query(message, query);
        }
    }

    /// Hands a presence update to every presence hook.
    pub async fn notify_presence(&self, update: &PresenceUpdate, services: &Services) {
        debug!("Presence update for {} ({} hooks)", update.user_id, self.presence.len());
        for hook in &self.presence {
            hook.on_presence(update, services).await;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_rewrites.is_empty() && self.trigger_rewrites.is_empty() && self.presence.is_empty()
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSet")
            .field("query_rewrites", &self.query_rewrites.len())
            .field("trigger_rewrites", &self.trigger_rewrites.len())
            .field("presence", &self.presence.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ChannelId, ChannelKind, UserId};

    struct Suffix(&'static str);

    impl QueryRewriteHook for Suffix {
        fn rewrite_query(&self, _message: &InboundMessage, query: &mut String) {
            query.push_str(self.0);
        }
    }

    impl TriggerRewriteHook for Suffix {
        fn rewrite_message(&self, _message: &InboundMessage, text: &mut String) {
            text.push_str(self.0);
        }
    }

    fn message() -> InboundMessage {
        InboundMessage::new(ChannelKind::Direct(ChannelId(1)), UserId(2), "hi")
    }

    #[test]
    fn test_rewrites_run_in_registration_order() {
        let mut set = HookSet::new();
        set.extend(&ModuleHooks::new().rewrite_query(Suffix("a")));
        set.extend(&ModuleHooks::new());
        set.extend(&ModuleHooks::new().rewrite_query(Suffix("b")).rewrite_message(Suffix("!")));

        let mut query = String::from("x");
        set.rewrite_query(&message(), &mut query);
        assert_eq!(query, "xab");

        let mut text = String::from("hi");
        set.rewrite_message(&message(), &mut text);
        assert_eq!(text, "hi!");
    }

    #[test]
    fn test_empty_hook_set() {
        let mut set = HookSet::new();
        set.extend(&ModuleHooks::new());
        assert!(set.is_empty());
    }
}
