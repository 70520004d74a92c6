//! Recursive command lookup.
//!
//! Siblings are tried in declaration order and the first one whose trigger
//! matches wins. Overlapping sibling triggers are rejected when the tree is
//! assembled, so at most one sibling can match any given query.

use super::{CommandTree, NodeId};

/// A node selected by [`find_command`] and the query text it did not consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMatch<'q> {
    pub node: NodeId,
    pub remainder: &'q str,
}

/// Searches the children of `from` for the deepest node matching `query`.
///
/// `authorized` is consulted for every node with a non-empty trigger; a node
/// the actor may not use is treated as not matching, so its siblings are
/// still tried. A node is only returned when it consumed the whole query or
/// accepts parameters, so a misspelled sub-command is never passed to its
/// parent as an argument.
pub fn find_command<'q, F>(
    tree: &CommandTree,
    from: NodeId,
    query: &'q str,
    authorized: &F,
) -> Option<CommandMatch<'q>>
where
    F: Fn(NodeId) -> bool,
{
    for &child_id in tree.node(from).children() {
        let child = tree.node(child_id);

        let Some(rest) = strip_trigger(child.trigger(), query) else {
            continue;
        };
        if !child.trigger().is_empty() && !authorized(child_id) {
            continue;
        }

        if let Some(deeper) = find_command(tree, child_id, rest, authorized) {
            return Some(deeper);
        }
        if rest.is_empty() || child.accepts_parameters() {
            return Some(CommandMatch {
                node: child_id,
                remainder: rest,
            });
        }
    }

    None
}

/// Strips `trigger` from the start of `query` at a word boundary.
///
/// An empty trigger only matches an empty query. Comparison ignores ASCII case.
#[must_use]
pub fn strip_trigger<'q>(trigger: &str, query: &'q str) -> Option<&'q str> {
    if trigger.is_empty() {
        return query.is_empty().then_some(query);
    }

    let head = query.get(..trigger.len())?;
    if !head.eq_ignore_ascii_case(trigger) {
        return None;
    }

    let rest = &query[trigger.len()..];
    if rest.is_empty() {
        Some(rest)
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::commands::{CommandSpec, TreeBuilder};
    use crate::test_support::StaticReply;

    fn leaf(trigger: &str) -> CommandSpec {
        CommandSpec::new(trigger).handler(StaticReply("ok"))
    }

    fn build(specs: Vec<CommandSpec>) -> CommandTree {
        let mut builder = TreeBuilder::new();
        for spec in specs {
            let id = builder.insert(spec).unwrap();
            builder.attach(NodeId::ROOT, id).unwrap();
        }
        builder.build().unwrap()
    }

    fn sample_tree() -> CommandTree {
        build(vec![
            leaf(""),
            leaf("order").accepts_parameters(),
            CommandSpec::new("pr").child(leaf("add").accepts_parameters()).child(leaf("del")),
            leaf("clean").child(leaf("all")),
            leaf("purge").accepts_parameters().child(leaf("bots")),
        ])
    }

    fn allow_all(_: NodeId) -> bool {
        true
    }

    fn matched_path(tree: &CommandTree, query: &str) -> Option<(String, String)> {
        find_command(tree, tree.root(), query, &allow_all)
            .map(|m| (tree.path(m.node), m.remainder.to_owned()))
    }

    #[test]
    fn test_strip_trigger() {
        assert_eq!(strip_trigger("pr", "pr add"), Some("add"));
        assert_eq!(strip_trigger("pr", "PR   add"), Some("add"));
        assert_eq!(strip_trigger("pr", "pr"), Some(""));
        assert_eq!(strip_trigger("pr", "prune"), None);
        assert_eq!(strip_trigger("pr", "p"), None);
        assert_eq!(strip_trigger("", ""), Some(""));
        assert_eq!(strip_trigger("", "x"), None);
        assert_eq!(strip_trigger("é", "éa"), None);
        assert_eq!(strip_trigger("ab", "aé"), None);
    }

    #[test]
    fn test_every_leaf_path_matches_itself() {
        let tree = sample_tree();
        for (_, id) in tree.walk() {
            let path = tree.path(id);
            if path.is_empty() {
                continue;
            }
            let found = find_command(&tree, tree.root(), &path, &allow_all).unwrap();
            assert_eq!(found.node, id, "path '{path}'");
            assert_eq!(found.remainder, "");
        }
    }

    #[test]
    fn test_empty_query_matches_bare_mention_command() {
        let tree = sample_tree();
        let found = find_command(&tree, tree.root(), "", &allow_all).unwrap();
        assert_eq!(tree.node(found.node).trigger(), "");
    }

    #[test]
    fn test_trigger_respects_word_boundary() {
        let tree = sample_tree();
        assert_eq!(matched_path(&tree, "ordering 5"), None);
        assert_eq!(
            matched_path(&tree, "order 5"),
            Some(("order".to_owned(), "5".to_owned()))
        );
    }

    #[test]
    fn test_descends_into_subcommand_with_remainder() {
        let tree = sample_tree();
        assert_eq!(
            matched_path(&tree, "pr add @SomeRole"),
            Some(("pr add".to_owned(), "@SomeRole".to_owned()))
        );
    }

    #[test]
    fn test_branch_alone_matches_when_fully_consumed() {
        let tree = sample_tree();
        assert_eq!(
            matched_path(&tree, "pr"),
            Some(("pr".to_owned(), String::new()))
        );
    }

    #[test]
    fn test_unknown_subcommand_without_parameters_does_not_match() {
        let tree = sample_tree();
        assert_eq!(matched_path(&tree, "clean xyz"), None);
        assert_eq!(matched_path(&tree, "pr del extra"), None);
    }

    #[test]
    fn test_unknown_subcommand_becomes_parameter_when_accepted() {
        let tree = sample_tree();
        assert_eq!(
            matched_path(&tree, "purge xyz"),
            Some(("purge".to_owned(), "xyz".to_owned()))
        );
        assert_eq!(
            matched_path(&tree, "purge bots"),
            Some(("purge bots".to_owned(), String::new()))
        );
    }

    #[test]
    fn test_unauthorized_node_is_skipped() {
        let tree = sample_tree();
        let add = tree.find_path("pr add").unwrap();
        let denied: HashSet<NodeId> = [add].into_iter().collect();
        let found = find_command(&tree, tree.root(), "pr add @SomeRole", &|id| {
            !denied.contains(&id)
        });
        assert_eq!(found, None);
    }

    #[test]
    fn test_unauthorized_node_falls_back_to_sibling() {
        let tree = build(vec![
            CommandSpec::new("a").child(leaf("x")),
            leaf("b"),
        ]);
        let a = tree.find_path("a").unwrap();
        let found = find_command(&tree, tree.root(), "b", &|id| id != a).unwrap();
        assert_eq!(tree.path(found.node), "b");
        assert_eq!(find_command(&tree, tree.root(), "a x", &|id| id != a), None);
    }

    #[test]
    fn test_similar_siblings_do_not_shadow_each_other() {
        let tree = build(vec![
            leaf("stat").accepts_parameters(),
            leaf("Stats").accepts_parameters(),
        ]);
        let found = find_command(&tree, tree.root(), "stats now", &allow_all).unwrap();
        assert_eq!(tree.node(found.node).trigger(), "Stats");
        let found = find_command(&tree, tree.root(), "STAT now", &allow_all).unwrap();
        assert_eq!(tree.node(found.node).trigger(), "stat");
    }
}
