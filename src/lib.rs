//! Guild Command Router Library
//!
//! A chat bot framework that decides, for every inbound message, which
//! registered command handles it and whether its author may run it.
//!
//! This crate provides the core functionality for:
//! - Detecting messages addressed to the bot and expanding guild aliases
//! - Matching queries against a validated command tree
//! - Resolving role-based permission overrides
//! - Running commands with per-command timeouts
//! - Wiring modules, their commands and their hooks through a lifecycle

pub mod commands;
pub mod config;
pub mod gateway;
pub mod modules;
pub mod permissions;
pub mod runtime;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
