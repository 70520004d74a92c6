//! Decides whether an actor may use a command.
//!
//! Resolution order:
//! 1. the bot owner may use everything;
//! 2. owner-only commands are denied to everyone else;
//! 3. among the overrides for the command's path held by the guild's default
//!    role or by any of the actor's roles, the one on the highest-ranked role
//!    decides, and a deny beats an allow on equal rank;
//! 4. without any override the command's default permission applies.

use std::iter;

use crate::commands::{CommandNode, CommandTree, NodeId};
use crate::gateway::{Actor, GuildId, Role, RoleId, UserId};

use super::OverrideTable;

/// Guild side of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildScope {
    pub guild_id: GuildId,
    /// The implicit lowest-ranked role every member holds.
    pub default_role: Role,
}

/// Everything about the invoking actor a permission check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionContext {
    pub owner_id: UserId,
    pub actor: Actor,
    pub guild: Option<GuildScope>,
}

impl PermissionContext {
    /// Context for a direct message; no overrides can apply.
    #[must_use]
    pub const fn direct(owner_id: UserId, actor_id: UserId) -> Self {
        Self {
            owner_id,
            actor: Actor::new(actor_id, Vec::new()),
            guild: None,
        }
    }

    #[must_use]
    pub const fn in_guild(owner_id: UserId, actor: Actor, guild_id: GuildId, default_role: Role) -> Self {
        Self {
            owner_id,
            actor,
            guild: Some(GuildScope {
                guild_id,
                default_role,
            }),
        }
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.actor.id == self.owner_id
    }
}

/// What decided a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Owner,
    OwnerOnly,
    Override { role_id: RoleId, rank: i64 },
    Default,
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub source: DecisionSource,
}

impl PermissionDecision {
    const fn new(allowed: bool, source: DecisionSource) -> Self {
        Self { allowed, source }
    }
}

/// Resolves the permission of `node`, whose path is `path`.
#[must_use]
pub fn resolve(
    node: &CommandNode,
    path: &str,
    context: &PermissionContext,
    overrides: &OverrideTable,
) -> PermissionDecision {
    if context.is_owner() {
        return PermissionDecision::new(true, DecisionSource::Owner);
    }
    if node.owner_only() {
        return PermissionDecision::new(false, DecisionSource::OwnerOnly);
    }

    if let Some(scope) = &context.guild {
        let winner = iter::once(&scope.default_role)
            .chain(context.actor.roles.iter())
            .filter_map(|role| {
                overrides
                    .get(scope.guild_id, role.id, path)
                    .map(|allow| (role, allow))
            })
            .max_by(|(a, a_allow), (b, b_allow)| {
                a.rank
                    .cmp(&b.rank)
                    .then_with(|| b_allow.cmp(a_allow))
                    .then_with(|| b.id.cmp(&a.id))
            });

        if let Some((role, allow)) = winner {
            return PermissionDecision::new(
                allow,
                DecisionSource::Override {
                    role_id: role.id,
                    rank: role.rank,
                },
            );
        }
    }

    PermissionDecision::new(node.default_permission(), DecisionSource::Default)
}

/// Permission checks against one tree, actor and override snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    tree: &'a CommandTree,
    context: &'a PermissionContext,
    overrides: &'a OverrideTable,
}

impl<'a> PermissionResolver<'a> {
    #[must_use]
    pub const fn new(
        tree: &'a CommandTree,
        context: &'a PermissionContext,
        overrides: &'a OverrideTable,
    ) -> Self {
        Self {
            tree,
            context,
            overrides,
        }
    }

    #[must_use]
    pub fn check(&self, id: NodeId) -> PermissionDecision {
        resolve(self.tree.node(id), &self.tree.path(id), self.context, self.overrides)
    }

    #[must_use]
    pub fn allows(&self, id: NodeId) -> bool {
        self.check(id).allowed
    }
}
