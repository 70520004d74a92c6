//! Configuration module for the command router.
//!
//! The bot's identity is required and read from the environment; everything
//! else falls back to defaults.

mod settings;

pub use settings::{BotIdentity, BotSettings, ConfigError};
