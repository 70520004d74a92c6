//! Values produced by command handlers.

use std::fmt;

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command did what was asked.
    pub success: bool,

    /// Response message to show the user. May be empty for silent commands.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates a successful result with nothing to say.
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "✓" } else { "✗" };
        if self.message.is_empty() {
            write!(f, "{mark}")
        } else {
            write!(f, "{mark} {}", self.message)
        }
    }
}
