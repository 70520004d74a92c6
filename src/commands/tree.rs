//! Command tree arena and its assembly-time validation.

use std::collections::HashMap;

use thiserror::Error;

use super::matcher::strip_trigger;
use super::node::{CommandNode, CommandSpec, NodeAction, NodeId};

/// Structural problems found while assembling the command tree.
///
/// All of them are fatal: the process must not start serving with a tree that
/// failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Duplicate trigger '{trigger}' under '{parent}'")]
    DuplicateTrigger { parent: String, trigger: String },

    #[error("Trigger '{shorter}' overlaps sibling '{longer}' under '{parent}'")]
    OverlappingTriggers {
        parent: String,
        shorter: String,
        longer: String,
    },

    #[error("Command '{path}' is already registered elsewhere")]
    AlreadyParented { path: String },

    #[error("Attaching '{path}' would create a cycle")]
    Cycle { path: String },

    #[error("Command '{path}' has neither a handler nor sub-commands")]
    EmptyNode { path: String },

    #[error("Command with an empty trigger under '{parent}' cannot have sub-commands")]
    EmptyTriggerWithChildren { parent: String },

    #[error("Trigger '{trigger}' under '{parent}' contains stray whitespace")]
    MalformedTrigger { parent: String, trigger: String },

    #[error("Command '{trigger}' was inserted but never attached to the tree")]
    Detached { trigger: String },

    #[error("Unknown node id {0}")]
    UnknownNode(usize),
}

/// Assembles a [`CommandTree`]. Parent links are set exactly once.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<CommandNode>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode::root()],
        }
    }

    /// Inserts a spec and its descendants as a detached subtree.
    ///
    /// The returned node has no parent until passed to [`attach`](Self::attach).
    pub fn insert(&mut self, spec: CommandSpec) -> Result<NodeId, TreeError> {
        self.insert_under(spec, "")
    }

    fn insert_under(&mut self, mut spec: CommandSpec, parent_path: &str) -> Result<NodeId, TreeError> {
        let path = join_path(parent_path, &spec.trigger);
        let children = std::mem::take(&mut spec.children);

        if canonical_trigger(&spec.trigger) != spec.trigger {
            return Err(TreeError::MalformedTrigger {
                parent: display_path(parent_path),
                trigger: spec.trigger,
            });
        }
        if matches!(spec.action, NodeAction::Branch) && children.is_empty() {
            return Err(TreeError::EmptyNode { path });
        }
        if spec.trigger.is_empty() && !children.is_empty() {
            return Err(TreeError::EmptyTriggerWithChildren {
                parent: display_path(parent_path),
            });
        }

        let id = NodeId::new(self.nodes.len());
        self.nodes.push(CommandNode::detached(spec));

        for child in children {
            let child_id = self.insert_under(child, &path)?;
            self.attach(id, child_id)?;
        }

        Ok(id)
    }

    /// Links `child` under `parent`, checking it against its new siblings.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if parent.index() >= self.nodes.len() {
            return Err(TreeError::UnknownNode(parent.index()));
        }
        let Some(node) = self.nodes.get(child.index()) else {
            return Err(TreeError::UnknownNode(child.index()));
        };

        if child == NodeId::ROOT || node.parent.is_some() {
            return Err(TreeError::AlreadyParented {
                path: self.path(child),
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle {
                path: self.path(child),
            });
        }

        let trigger = node.trigger.as_str();
        for &sibling in &self.nodes[parent.index()].children {
            let existing = self.nodes[sibling.index()].trigger.as_str();

            if existing.eq_ignore_ascii_case(trigger) {
                return Err(TreeError::DuplicateTrigger {
                    parent: display_path(&self.path(parent)),
                    trigger: trigger.to_owned(),
                });
            }
            if let Some((shorter, longer)) = overlap(existing, trigger) {
                return Err(TreeError::OverlappingTriggers {
                    parent: display_path(&self.path(parent)),
                    shorter: shorter.to_owned(),
                    longer: longer.to_owned(),
                });
            }
        }

        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Finishes assembly. Every inserted node must be reachable from the root.
    pub fn build(self) -> Result<CommandTree, TreeError> {
        if let Some(orphan) = self
            .nodes
            .iter()
            .skip(1)
            .find(|node| node.parent.is_none())
        {
            return Err(TreeError::Detached {
                trigger: orphan.trigger.clone(),
            });
        }

        let mut tree = CommandTree {
            nodes: self.nodes,
            index: HashMap::new(),
        };
        for (_, id) in tree.walk() {
            let key = canonical_path(&tree.path(id));
            tree.index.entry(key).or_insert(id);
        }
        Ok(tree)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes[node.index()].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn path(&self, id: NodeId) -> String {
        path_of(&self.nodes, id)
    }
}

/// The immutable command hierarchy, shared read-only after startup.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    index: HashMap<String, NodeId>,
}

impl CommandTree {
    #[must_use]
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the node for an id produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.index()]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&CommandNode> {
        self.nodes.get(id.index())
    }

    /// Space-joined triggers from the root down to `id`.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        path_of(&self.nodes, id)
    }

    /// Nodes from the first level below the root down to `id`, inclusive.
    #[must_use]
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.filter(|&node| node != NodeId::ROOT) {
            chain.push(node);
            current = self.get(node).and_then(CommandNode::parent);
        }
        chain.reverse();
        chain
    }

    /// Looks a command up by its path, ignoring ASCII case and extra spaces.
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let key = canonical_path(path);
        if key.is_empty() {
            return None;
        }
        self.index.get(&key).copied()
    }

    /// Depth-first pre-order listing of every node below the root with its depth.
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> = self
            .node(NodeId::ROOT)
            .children
            .iter()
            .rev()
            .map(|&id| (0, id))
            .collect();

        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            stack.extend(
                self.node(id)
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (depth + 1, child)),
            );
        }
        out
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

fn path_of(nodes: &[CommandNode], id: NodeId) -> String {
    let mut triggers = Vec::new();
    let mut current = nodes.get(id.index());

    while let Some(node) = current {
        if !node.trigger.is_empty() {
            triggers.push(node.trigger.as_str());
        }
        current = node.parent.and_then(|parent| nodes.get(parent.index()));
    }

    triggers.reverse();
    triggers.join(" ")
}

fn join_path(parent: &str, trigger: &str) -> String {
    match (parent.is_empty(), trigger.is_empty()) {
        (true, _) => trigger.to_owned(),
        (false, true) => parent.to_owned(),
        (false, false) => format!("{parent} {trigger}"),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_owned()
    } else {
        path.to_owned()
    }
}

/// Collapses whitespace runs to single spaces and trims the ends.
fn canonical_trigger(trigger: &str) -> String {
    trigger.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_path(path: &str) -> String {
    canonical_trigger(path).to_ascii_lowercase()
}

/// Returns `(shorter, longer)` when one trigger would match as a word prefix of the other.
fn overlap<'a>(a: &'a str, b: &'a str) -> Option<(&'a str, &'a str)> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if strip_trigger(a, b).is_some() {
        Some((a, b))
    } else if strip_trigger(b, a).is_some() {
        Some((b, a))
    } else {
        None
    }
}
