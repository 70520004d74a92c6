//! Guild-scoped aliases expanded in front of the query before matching.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::gateway::GuildId;
use crate::store::AliasRecord;

/// One alias and the command path it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
}

/// Aliases grouped per guild, longest alias first.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    by_guild: HashMap<GuildId, Vec<AliasEntry>>,
}

impl AliasTable {
    #[must_use]
    pub fn from_records(records: &[AliasRecord]) -> Self {
        let mut by_guild: HashMap<GuildId, Vec<AliasEntry>> = HashMap::new();
        for record in records {
            by_guild.entry(record.guild_id).or_default().push(AliasEntry {
                alias: record.alias.clone(),
                target: record.command_path.clone(),
                created_at: record.created_at,
            });
        }
        for entries in by_guild.values_mut() {
            entries.sort_by(|a, b| {
                (Reverse(a.alias.len()), &a.alias).cmp(&(Reverse(b.alias.len()), &b.alias))
            });
        }
        Self { by_guild }
    }

    #[must_use]
    pub fn for_guild(&self, guild_id: GuildId) -> &[AliasEntry] {
        self.by_guild.get(&guild_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Expands the first alias of `guild_id` found at the head of `query`.
    #[must_use]
    pub fn rewrite(&self, guild_id: GuildId, query: &str) -> Option<String> {
        rewrite_alias(query, self.for_guild(guild_id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_guild.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replaces the first alias that prefixes `query` on a word boundary.
///
/// Returns `None` when no alias applies. The expansion is applied once; the
/// rewritten text is never scanned for aliases again.
#[must_use]
pub fn rewrite_alias(query: &str, aliases: &[AliasEntry]) -> Option<String> {
    aliases.iter().find_map(|entry| {
        let rest = query.strip_prefix(entry.alias.as_str())?;
        (rest.is_empty() || rest.starts_with(char::is_whitespace))
            .then(|| format!("{}{rest}", entry.target))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(alias: &str, target: &str) -> AliasEntry {
        AliasEntry {
            alias: alias.to_owned(),
            target: target.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_alias_expands_at_head() {
        let aliases = [entry("pa", "pr add")];
        assert_eq!(
            rewrite_alias("pa @SomeRole", &aliases),
            Some("pr add @SomeRole".to_owned())
        );
        assert_eq!(rewrite_alias("pa", &aliases), Some("pr add".to_owned()));
    }

    #[test]
    fn test_alias_respects_word_boundary() {
        let aliases = [entry("ord", "order list")];
        assert_eq!(rewrite_alias("order 5", &aliases), None);
        assert_eq!(rewrite_alias("x ord", &aliases), None);
    }

    #[test]
    fn test_alias_applies_once() {
        let aliases = [entry("a", "a b")];
        assert_eq!(rewrite_alias("a", &aliases), Some("a b".to_owned()));
        assert_eq!(rewrite_alias("a b", &aliases), Some("a b b".to_owned()));
    }

    #[test]
    fn test_table_prefers_longest_alias() {
        let table = AliasTable::from_records(&[
            AliasRecord::new(GuildId(1), "p", "ping"),
            AliasRecord::new(GuildId(1), "p a", "pr add"),
            AliasRecord::new(GuildId(2), "p a", "other"),
        ]);
        assert_eq!(table.rewrite(GuildId(1), "p a x"), Some("pr add x".to_owned()));
        assert_eq!(table.rewrite(GuildId(1), "p"), Some("ping".to_owned()));
        assert_eq!(table.rewrite(GuildId(3), "p"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_table_is_scoped_per_guild() {
        let table = AliasTable::from_records(&[AliasRecord::new(GuildId(1), "h", "help")]);
        assert_eq!(table.for_guild(GuildId(1)).len(), 1);
        assert!(table.for_guild(GuildId(2)).is_empty());
    }
}
