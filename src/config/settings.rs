//! Bot identity and runtime settings.

use std::path::PathBuf;
use std::time::Duration;

use crate::gateway::UserId;

/// Who the bot is and who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotIdentity {
    /// The privileged account that bypasses every permission check.
    pub owner_id: UserId,

    /// The bot's own account, used to recognise mentions.
    pub bot_user_id: UserId,
}

impl BotIdentity {
    #[must_use]
    pub const fn new(owner_id: UserId, bot_user_id: UserId) -> Self {
        Self {
            owner_id,
            bot_user_id,
        }
    }

    /// Creates the identity from environment variables.
    ///
    /// Expects `BOT_OWNER_ID` and `BOT_USER_ID` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let owner_id = required_id(&get, "BOT_OWNER_ID")?;
        let bot_user_id = required_id(&get, "BOT_USER_ID")?;
        Ok(Self::new(owner_id, bot_user_id))
    }
}

fn required_id(get: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<UserId, ConfigError> {
    let value = get(name).ok_or(ConfigError::MissingEnvVar(name))?;
    value
        .trim()
        .parse()
        .map(UserId)
        .map_err(|_| ConfigError::InvalidId { name, value })
}

/// Runtime settings with sensible defaults.
///
/// Log filtering is not part of the settings: `RUST_LOG` is read directly by
/// the subscriber's `EnvFilter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// Path to the JSON document holding overrides, aliases and triggers.
    pub data_path: PathBuf,

    /// Execution bound for commands that do not set their own.
    pub command_timeout_secs: u64,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("router_data.json")
}

const fn default_command_timeout() -> u64 {
    30
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            data_path: get("BOT_DATA_PATH").map_or_else(default_data_path, PathBuf::from),
            command_timeout_secs: get("COMMAND_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or_else(default_command_timeout),
        }
    }

    /// Default execution bound as a [`Duration`].
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid {name} '{value}' (must be a numeric user id)")]
    InvalidId { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = BotSettings::default();
        assert_eq!(settings.data_path, PathBuf::from("router_data.json"));
        assert_eq!(settings.command_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_settings_from_vars() {
        let settings = BotSettings::from_vars(vars(&[
            ("BOT_DATA_PATH", "/tmp/router.json"),
            ("COMMAND_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(settings.data_path, PathBuf::from("/tmp/router.json"));
        assert_eq!(settings.command_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_unset_vars_give_defaults() {
        let settings = BotSettings::from_vars(vars(&[("RUST_LOG", "debug")]));
        assert_eq!(settings, BotSettings::default());
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let zero = BotSettings::from_vars(vars(&[("COMMAND_TIMEOUT_SECS", "0")]));
        let junk = BotSettings::from_vars(vars(&[("COMMAND_TIMEOUT_SECS", "soon")]));
        assert_eq!(zero.command_timeout_secs, 30);
        assert_eq!(junk.command_timeout_secs, 30);
    }

    #[test]
    fn test_identity_from_vars() {
        let identity = BotIdentity::from_vars(vars(&[("BOT_OWNER_ID", "42"), ("BOT_USER_ID", " 7 ")])).unwrap();
        assert_eq!(identity, BotIdentity::new(UserId(42), UserId(7)));
    }

    #[test]
    fn test_identity_errors() {
        let missing = BotIdentity::from_vars(vars(&[("BOT_OWNER_ID", "42")]));
        assert!(matches!(missing, Err(ConfigError::MissingEnvVar("BOT_USER_ID"))));

        let invalid = BotIdentity::from_vars(vars(&[("BOT_OWNER_ID", "me"), ("BOT_USER_ID", "7")]));
        assert!(matches!(
            invalid,
            Err(ConfigError::InvalidId { name: "BOT_OWNER_ID", .. })
        ));
    }
}
