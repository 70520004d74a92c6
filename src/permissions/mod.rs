//! Role-based command permissions.

mod overrides;
mod resolver;

pub use overrides::{OverrideEntry, OverrideTable};
pub use resolver::{
    DecisionSource, GuildScope, PermissionContext, PermissionDecision, PermissionResolver, resolve,
};
