//! Argument parsing shared by the administrative commands.

use crate::commands::{CommandContext, HandlerError, NodeId};
use crate::gateway::{GuildId, RoleId};

/// Splits off the first whitespace-separated word.
pub(super) fn split_word(args: &str) -> Option<(&str, &str)> {
    let args = args.trim();
    if args.is_empty() {
        return None;
    }
    Some(match args.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (args, ""),
    })
}

/// Parses a role mention (`<@&id>`), a raw role id or `everyone`.
pub(super) fn parse_role(token: &str, guild_id: GuildId) -> Option<RoleId> {
    if token.eq_ignore_ascii_case("everyone") || token.eq_ignore_ascii_case("@everyone") {
        return Some(RoleId::everyone(guild_id));
    }
    let digits = token
        .strip_prefix("<@&")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(token);
    digits.parse().ok().map(RoleId)
}

/// Resolves a command path typed by a user to a node of the tree.
///
/// Returns the node together with its canonical path, which is what gets
/// stored so records match regardless of the case the user typed.
pub(super) fn resolve_path(ctx: &CommandContext<'_>, path: &str) -> Result<(NodeId, String), HandlerError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(HandlerError::Usage("Missing command path".to_owned()));
    }

    match ctx.tree.find_path(path) {
        Some(node) if node != ctx.tree.root() => Ok((node, ctx.tree.path(node))),
        _ => Err(HandlerError::Usage(format!("Unknown command `{path}`"))),
    }
}

/// Renders a role for replies.
pub(super) fn role_label(role_id: RoleId, guild_id: GuildId) -> String {
    if role_id == RoleId::everyone(guild_id) {
        "@everyone".to_owned()
    } else {
        format!("<@&{role_id}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_word() {
        assert_eq!(split_word("  mod   pr add "), Some(("mod", "pr add")));
        assert_eq!(split_word("alone"), Some(("alone", "")));
        assert_eq!(split_word("   "), None);
    }

    #[test]
    fn test_parse_role_forms() {
        let guild = GuildId(9);
        assert_eq!(parse_role("<@&55>", guild), Some(RoleId(55)));
        assert_eq!(parse_role("55", guild), Some(RoleId(55)));
        assert_eq!(parse_role("@everyone", guild), Some(RoleId(9)));
        assert_eq!(parse_role("Everyone", guild), Some(RoleId(9)));
        assert_eq!(parse_role("<@55>", guild), None);
        assert_eq!(parse_role("moderators", guild), None);
    }

    #[test]
    fn test_role_label() {
        assert_eq!(role_label(RoleId(9), GuildId(9)), "@everyone");
        assert_eq!(role_label(RoleId(3), GuildId(9)), "<@&3>");
    }
}
