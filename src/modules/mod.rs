//! Modules contribute commands and hooks; the manager wires them together.

pub mod builtin;
mod hooks;
mod lifecycle;

pub use hooks::{
    HookError, HookSet, ModuleHooks, PresenceHook, QueryRewriteHook, StartupHook, TeardownHook,
    TriggerRewriteHook,
};
pub use lifecycle::{
    LifecycleError, Module, ModuleManager, ModuleState, StartedModules, TeardownFailure,
};
