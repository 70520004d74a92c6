//! Module registration, startup and teardown.
//!
//! Startup is all-or-nothing: every module's command subtree is validated and
//! wired under the root before any startup hook runs, and the first failure
//! aborts the whole startup.

use std::fmt;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::hooks::{HookError, HookSet, ModuleHooks};
use crate::commands::{CommandSpec, CommandTree, NodeId, TreeBuilder, TreeError};
use crate::runtime::Services;

/// A unit of functionality: one root-level command subtree plus hooks.
pub trait Module: Send + Sync {
    /// Unique module name, used in logs and errors.
    fn name(&self) -> &str;

    /// The subtree this module mounts under the root.
    fn command(&self) -> CommandSpec;

    fn hooks(&self) -> ModuleHooks {
        ModuleHooks::new()
    }
}

/// Where a module is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Unregistered,
    Validating,
    Started,
    TearingDown,
    Stopped,
    Failed,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unregistered => "unregistered",
            Self::Validating => "validating",
            Self::Started => "started",
            Self::TearingDown => "tearing down",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Module '{module}' failed validation: {source}")]
    Validation { module: String, source: TreeError },

    #[error("Startup hook of module '{module}' failed: {source}")]
    StartupHook { module: String, source: HookError },

    #[error("Module '{0}' is already registered")]
    DuplicateModule(String),

    #[error("Modules have already been started")]
    AlreadyStarted,
}

/// A teardown hook that failed during shutdown.
#[derive(Debug)]
pub struct TeardownFailure {
    pub module: String,
    pub error: HookError,
}

/// The outcome of a successful startup.
#[derive(Debug)]
pub struct StartedModules {
    pub tree: CommandTree,
    pub hooks: HookSet,
}

struct Registered {
    name: String,
    module: Box<dyn Module>,
    hooks: ModuleHooks,
    state: ModuleState,
}

/// Owns the registered modules and drives them through their lifecycle.
#[derive(Default)]
pub struct ModuleManager {
    modules: Vec<Registered>,
}

impl ModuleManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module. Registration order is startup order.
    pub fn register(&mut self, module: impl Module + 'static) -> Result<(), LifecycleError> {
        self.register_boxed(Box::new(module))
    }

    pub fn register_boxed(&mut self, module: Box<dyn Module>) -> Result<(), LifecycleError> {
        let name = module.name().to_owned();
        if self.modules.iter().any(|m| m.name == name) {
            return Err(LifecycleError::DuplicateModule(name));
        }

        debug!("Registered module '{}'", name);
        let hooks = module.hooks();
        self.modules.push(Registered {
            name,
            module,
            hooks,
            state: ModuleState::Unregistered,
        });
        Ok(())
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<ModuleState> {
        self.modules.iter().find(|m| m.name == name).map(|m| m.state)
    }

    /// Every module with its state, in registration order.
    #[must_use]
    pub fn states(&self) -> Vec<(&str, ModuleState)> {
        self.modules.iter().map(|m| (m.name.as_str(), m.state)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Validates and assembles the command tree, then runs startup hooks.
    ///
    /// If a startup hook fails, modules that already started are torn down
    /// before the error is returned.
    pub async fn start(&mut self, services: &Services) -> Result<StartedModules, LifecycleError> {
        if self
            .modules
            .iter()
            .any(|m| m.state != ModuleState::Unregistered)
        {
            return Err(LifecycleError::AlreadyStarted);
        }

        let tree = match self.assemble() {
            Ok(tree) => tree,
            Err(e) => {
                error!("{}", e);
                self.mark_pending(ModuleState::Failed);
                return Err(e);
            }
        };
        info!("Command tree assembled ({} nodes, {} modules)", tree.len(), self.modules.len());

        for index in 0..self.modules.len() {
            if let Some(hook) = self.modules[index].hooks.startup.clone()
                && let Err(source) = hook.on_startup(services).await
            {
                let module = self.modules[index].name.clone();
                error!("Startup hook of module '{}' failed: {}", module, source);
                self.modules[index].state = ModuleState::Failed;
                self.shutdown().await;
                self.mark_pending(ModuleState::Failed);
                return Err(LifecycleError::StartupHook { module, source });
            }
            self.modules[index].state = ModuleState::Started;
            debug!("Module '{}' started", self.modules[index].name);
        }

        let mut hooks = HookSet::new();
        for module in &self.modules {
            hooks.extend(&module.hooks);
        }

        Ok(StartedModules { tree, hooks })
    }

    /// Runs teardown hooks in reverse registration order.
    ///
    /// Failures are logged and collected; they never stop the remaining
    /// modules from tearing down.
    pub async fn shutdown(&mut self) -> Vec<TeardownFailure> {
        let mut failures = Vec::new();

        for module in self
            .modules
            .iter_mut()
            .rev()
            .filter(|m| m.state == ModuleState::Started)
        {
            module.state = ModuleState::TearingDown;
            if let Some(hook) = module.hooks.teardown.clone()
                && let Err(error) = hook.on_teardown().await
            {
                warn!("Teardown hook of module '{}' failed: {}", module.name, error);
                failures.push(TeardownFailure {
                    module: module.name.clone(),
                    error,
                });
            }
            module.state = ModuleState::Stopped;
            debug!("Module '{}' stopped", module.name);
        }

        failures
    }

    fn assemble(&mut self) -> Result<CommandTree, LifecycleError> {
        let mut builder = TreeBuilder::new();

        for module in &mut self.modules {
            module.state = ModuleState::Validating;
            let validation = |source| LifecycleError::Validation {
                module: module.name.clone(),
                source,
            };

            let id = builder.insert(module.module.command()).map_err(validation)?;
            builder.attach(NodeId::ROOT, id).map_err(validation)?;
        }

        builder.build().map_err(|source| LifecycleError::Validation {
            module: "<tree>".to_owned(),
            source,
        })
    }

    /// Moves every module that has not reached a final state to `state`.
    fn mark_pending(&mut self, state: ModuleState) {
        for module in &mut self.modules {
            if matches!(module.state, ModuleState::Unregistered | ModuleState::Validating) {
                module.state = state;
            }
        }
    }
}

impl fmt::Debug for ModuleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleManager")
            .field("modules", &self.states())
            .finish()
    }
}
