//! Override lookup table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::gateway::{GuildId, RoleId};
use crate::store::OverrideRecord;

/// A single override as shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub role_id: RoleId,
    pub command_path: String,
    pub allow: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Decision {
    allow: bool,
    created_at: DateTime<Utc>,
}

/// Overrides indexed by guild, command path and role.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    by_guild: HashMap<GuildId, HashMap<String, HashMap<RoleId, Decision>>>,
}

impl OverrideTable {
    #[must_use]
    pub fn from_records(records: &[OverrideRecord]) -> Self {
        let mut by_guild: HashMap<GuildId, HashMap<String, HashMap<RoleId, Decision>>> = HashMap::new();
        for record in records {
            by_guild
                .entry(record.guild_id)
                .or_default()
                .entry(record.command_path.clone())
                .or_default()
                .insert(
                    record.role_id,
                    Decision {
                        allow: record.allow,
                        created_at: record.created_at,
                    },
                );
        }
        Self { by_guild }
    }

    /// The explicit decision for `role_id` on `command_path`, if one exists.
    #[must_use]
    pub fn get(&self, guild_id: GuildId, role_id: RoleId, command_path: &str) -> Option<bool> {
        self.by_guild
            .get(&guild_id)?
            .get(command_path)?
            .get(&role_id)
            .map(|decision| decision.allow)
    }

    /// Every override of a guild, sorted by command path then role.
    #[must_use]
    pub fn for_guild(&self, guild_id: GuildId) -> Vec<OverrideEntry> {
        let Some(paths) = self.by_guild.get(&guild_id) else {
            return Vec::new();
        };

        let mut entries: Vec<OverrideEntry> = paths
            .iter()
            .flat_map(|(path, roles)| {
                roles.iter().map(move |(&role_id, decision)| OverrideEntry {
                    role_id,
                    command_path: path.clone(),
                    allow: decision.allow,
                    created_at: decision.created_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            (&a.command_path, a.role_id).cmp(&(&b.command_path, b.role_id))
        });
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_guild
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_scoped_by_guild() {
        let table = OverrideTable::from_records(&[
            OverrideRecord::new(GuildId(1), RoleId(2), "pr add", true),
            OverrideRecord::new(GuildId(3), RoleId(2), "pr add", false),
        ]);

        assert_eq!(table.get(GuildId(1), RoleId(2), "pr add"), Some(true));
        assert_eq!(table.get(GuildId(3), RoleId(2), "pr add"), Some(false));
        assert_eq!(table.get(GuildId(1), RoleId(9), "pr add"), None);
        assert_eq!(table.get(GuildId(1), RoleId(2), "pr"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_for_guild_is_sorted() {
        let table = OverrideTable::from_records(&[
            OverrideRecord::new(GuildId(1), RoleId(7), "pr del", false),
            OverrideRecord::new(GuildId(1), RoleId(9), "pr add", true),
            OverrideRecord::new(GuildId(1), RoleId(2), "pr add", false),
        ]);

        let listed: Vec<(String, RoleId)> = table
            .for_guild(GuildId(1))
            .into_iter()
            .map(|e| (e.command_path, e.role_id))
            .collect();
        assert_eq!(
            listed,
            [
                ("pr add".to_owned(), RoleId(2)),
                ("pr add".to_owned(), RoleId(9)),
                ("pr del".to_owned(), RoleId(7)),
            ]
        );
        assert!(table.for_guild(GuildId(5)).is_empty());
    }
}
