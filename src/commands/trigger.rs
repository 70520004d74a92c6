//! Detects whether a message addresses the bot and strips the prefix that did.

use std::collections::HashMap;

use crate::gateway::{ChannelKind, GuildId, UserId};
use crate::store::TriggerRecord;

/// Returns the command query carried by `text`, or `None` when the message is
/// not addressed to the bot.
///
/// Direct messages are always addressed to the bot and keep their full text.
/// In guild channels the text must start with the bot's mention or with the
/// guild's custom trigger. Nickname mentions (`<@!id>`) count as mentions.
#[must_use]
pub fn normalize(
    text: &str,
    channel: &ChannelKind,
    bot_user_id: UserId,
    custom_trigger: Option<&str>,
) -> Option<String> {
    let text = text.trim();

    if channel.is_direct() {
        return Some(text.to_owned());
    }

    let rest = strip_mention(text, bot_user_id).or_else(|| {
        custom_trigger
            .filter(|trigger| !trigger.is_empty())
            .and_then(|trigger| text.strip_prefix(trigger))
    })?;

    Some(rest.trim_start().to_owned())
}

/// Strips a leading `<@id>` or `<@!id>` mention of `user_id`. The rest of the
/// text is left untouched.
#[must_use]
pub fn strip_mention(text: &str, user_id: UserId) -> Option<&str> {
    let rest = text.strip_prefix("<@")?;
    let rest = rest.strip_prefix('!').unwrap_or(rest);
    rest.strip_prefix(user_id.to_string().as_str())?
        .strip_prefix('>')
}

/// Custom per-guild triggers, indexed for lookup.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    by_guild: HashMap<GuildId, String>,
}

impl TriggerTable {
    #[must_use]
    pub fn from_records(records: &[TriggerRecord]) -> Self {
        Self {
            by_guild: records
                .iter()
                .map(|record| (record.guild_id, record.trigger.clone()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, guild_id: GuildId) -> Option<&str> {
        self.by_guild.get(&guild_id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_guild.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_guild.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChannelId;

    const BOT: UserId = UserId(99);

    fn guild_channel() -> ChannelKind {
        ChannelKind::Guild {
            guild_id: GuildId(1),
            channel_id: ChannelId(2),
        }
    }

    #[test]
    fn test_direct_message_is_always_triggered() {
        let dm = ChannelKind::Direct(ChannelId(3));
        assert_eq!(normalize("  help me ", &dm, BOT, None), Some("help me".to_owned()));
        assert_eq!(
            normalize("<@99> help", &dm, BOT, None),
            Some("<@99> help".to_owned())
        );
    }

    #[test]
    fn test_mention_prefix_is_stripped() {
        assert_eq!(
            normalize("  <@99>   pr add x", &guild_channel(), BOT, None),
            Some("pr add x".to_owned())
        );
    }

    #[test]
    fn test_nickname_mention_is_canonicalized() {
        assert_eq!(
            normalize("<@!99> help", &guild_channel(), BOT, None),
            Some("help".to_owned())
        );
    }

    #[test]
    fn test_mentions_in_arguments_are_kept_verbatim() {
        assert_eq!(
            normalize("<@!99> ban <@!55> <@55>", &guild_channel(), BOT, None),
            Some("ban <@!55> <@55>".to_owned())
        );
    }

    #[test]
    fn test_strip_mention_needs_exact_id() {
        assert_eq!(strip_mention("<@99> x", BOT), Some(" x"));
        assert_eq!(strip_mention("<@!99>", BOT), Some(""));
        assert_eq!(strip_mention("<@990> x", BOT), None);
        assert_eq!(strip_mention("<@&99> x", BOT), None);
    }

    #[test]
    fn test_bare_mention_yields_empty_query() {
        assert_eq!(normalize("<@99>", &guild_channel(), BOT, None), Some(String::new()));
    }

    #[test]
    fn test_custom_trigger_is_stripped() {
        assert_eq!(
            normalize("!help", &guild_channel(), BOT, Some("!")),
            Some("help".to_owned())
        );
        assert_eq!(
            normalize("<@99> help", &guild_channel(), BOT, Some("!")),
            Some("help".to_owned())
        );
    }

    #[test]
    fn test_unaddressed_message_is_ignored() {
        assert_eq!(normalize("help", &guild_channel(), BOT, None), None);
        assert_eq!(normalize("hi <@99>", &guild_channel(), BOT, None), None);
        assert_eq!(normalize("<@98> help", &guild_channel(), BOT, None), None);
        assert_eq!(normalize("help", &guild_channel(), BOT, Some("")), None);
    }

    #[test]
    fn test_trigger_table_lookup() {
        let table = TriggerTable::from_records(&[TriggerRecord::new(GuildId(1), "!")]);
        assert_eq!(table.get(GuildId(1)), Some("!"));
        assert_eq!(table.get(GuildId(2)), None);
        assert_eq!(table.len(), 1);
    }
}
