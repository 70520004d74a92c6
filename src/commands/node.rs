//! Command node definitions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::CommandHandler;

/// Index of a node inside a [`CommandTree`](super::CommandTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The synthetic root every module subtree hangs from.
    pub const ROOT: Self = Self(0);

    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// What happens when a node is selected.
#[derive(Clone)]
pub enum NodeAction {
    /// Runs a handler.
    Leaf(Arc<dyn CommandHandler>),
    /// Only groups sub-commands; selecting it shows their usage.
    Branch,
}

impl fmt::Debug for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("Leaf"),
            Self::Branch => f.write_str("Branch"),
        }
    }
}

/// Declarative description of a command subtree, supplied by a module.
///
/// ```
/// use guild_command_router::commands::CommandSpec;
///
/// let spec = CommandSpec::new("alias")
///     .description("Manage command aliases")
///     .child(CommandSpec::new("list").description("List aliases"));
/// assert_eq!(spec.trigger(), "alias");
/// ```
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub(crate) trigger: String,
    pub(crate) description: String,
    pub(crate) usage: String,
    pub(crate) default_permission: bool,
    pub(crate) owner_only: bool,
    pub(crate) accepts_parameters: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) action: NodeAction,
    pub(crate) children: Vec<CommandSpec>,
}

impl CommandSpec {
    /// Starts a branch with the given trigger. Nodes are usable by everyone
    /// and take no parameters until configured otherwise.
    #[must_use]
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            description: String::new(),
            usage: String::new(),
            default_permission: true,
            owner_only: false,
            accepts_parameters: false,
            timeout: None,
            action: NodeAction::Branch,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Whether the command is allowed when no override applies.
    #[must_use]
    pub const fn default_permission(mut self, allowed: bool) -> Self {
        self.default_permission = allowed;
        self
    }

    /// Only the bot owner may run this command; overrides are ignored.
    #[must_use]
    pub const fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    /// Text after the trigger is passed to the handler instead of being
    /// treated as a misspelled sub-command.
    #[must_use]
    pub const fn accepts_parameters(mut self) -> Self {
        self.accepts_parameters = true;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.action = NodeAction::Leaf(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn shared_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.action = NodeAction::Leaf(handler);
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }
}

/// A node stored in the command tree arena.
#[derive(Debug, Clone)]
pub struct CommandNode {
    pub(crate) trigger: String,
    pub(crate) description: String,
    pub(crate) usage: String,
    pub(crate) default_permission: bool,
    pub(crate) owner_only: bool,
    pub(crate) accepts_parameters: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) action: NodeAction,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl CommandNode {
    pub(crate) fn root() -> Self {
        Self::detached(CommandSpec::new(""))
    }

    /// Copies a spec's own settings; children are linked separately.
    pub(crate) fn detached(spec: CommandSpec) -> Self {
        Self {
            trigger: spec.trigger,
            description: spec.description,
            usage: spec.usage,
            default_permission: spec.default_permission,
            owner_only: spec.owner_only,
            accepts_parameters: spec.accepts_parameters,
            timeout: spec.timeout,
            action: spec.action,
            children: Vec::new(),
            parent: None,
        }
    }

    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    #[must_use]
    pub const fn default_permission(&self) -> bool {
        self.default_permission
    }

    #[must_use]
    pub const fn owner_only(&self) -> bool {
        self.owner_only
    }

    #[must_use]
    pub const fn accepts_parameters(&self) -> bool {
        self.accepts_parameters
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub const fn action(&self) -> &NodeAction {
        &self.action
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.action, NodeAction::Leaf(_))
    }
}
