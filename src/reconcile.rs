//! Keyed enter/update/exit reconciliation against a persistent scene graph.
//!
//! Every chart binds keyed data items to a parent node's children instead of
//! rebuilding its subtree: items without a matching node enter, items with a
//! match update the existing node in place (same identity), and nodes whose
//! key no longer appears exit. Matching is by semantic key, never by array
//! index, so reordered input does not destroy and recreate nodes. Within one
//! pass, enter nodes are constructed first, updates run second, and exit
//! removal happens last. Identity is scoped to the parent, so the full key
//! path determines a node across nesting levels, and removing a parent drops
//! its whole subtree.

use std::collections::HashSet;

use crate::error::Result;
use crate::scene::SceneNode;

/// Counts of the three reconciliation sets for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Nodes created for keys absent from the previous render.
    pub entered: usize,
    /// Existing nodes mutated in place.
    pub updated: usize,
    /// Nodes removed because their key vanished from the data.
    pub exited: usize,
}

/// Reconcile `items` against the keyed children of `parent`.
///
/// `key` extracts each item's stable key. `enter` constructs the node
/// skeleton for a new key (the reconciler assigns the key itself), and
/// `update` applies data-dependent attributes to a matched node; it is the
/// caller's job to route entered nodes through the same attribute logic so
/// both sets end up consistent. Unkeyed children of `parent` (static
/// structure) are left untouched.
///
/// # Errors
///
/// An error from either closure aborts the remaining work for this pass and
/// propagates; mutations already applied stay in place, since each item's
/// subtree is independently reconcilable.
pub fn reconcile<T>(
    parent: &mut SceneNode,
    items: &[T],
    key: impl Fn(&T) -> &str,
    mut enter: impl FnMut(&T) -> Result<SceneNode>,
    mut update: impl FnMut(&T, &mut SceneNode) -> Result<()>,
) -> Result<ReconcileStats> {
    let existing: HashSet<String> =
        parent.child_keys().iter().map(|k| (*k).to_string()).collect();

    let mut stats = ReconcileStats::default();
    let mut entered: Vec<SceneNode> = Vec::new();
    let mut incoming: HashSet<&str> = HashSet::with_capacity(items.len());
    let mut pending_updates: Vec<&T> = Vec::new();

    // Enter: construct nodes for unseen keys before any update runs.
    for item in items {
        let item_key = key(item);
        if !incoming.insert(item_key) {
            // Duplicate key in the same pass: the later item wins by
            // updating the node entered for the first occurrence.
            pending_updates.push(item);
            continue;
        }

        if existing.contains(item_key) {
            pending_updates.push(item);
        } else {
            let mut node = enter(item)?;
            node.set_key(item_key);
            entered.push(node);
            stats.entered += 1;
        }
    }

    // Update: mutate matched nodes in place, preserving identity.
    for item in pending_updates {
        let item_key = key(item);
        if let Some(node) = parent.child_by_key_mut(item_key) {
            update(item, node)?;
            stats.updated += 1;
        } else if let Some(node) = entered.iter_mut().find(|n| n.key() == Some(item_key)) {
            update(item, node)?;
            stats.updated += 1;
        }
    }

    // Exit: drop keyed children whose key vanished; subtrees go with them.
    let before = parent.children().len();
    parent
        .children_mut()
        .retain(|child| child.key().map_or(true, |k| incoming.contains(k)));
    stats.exited = before - parent.children().len();

    for node in entered {
        parent.push(node);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::scene::NodeKind;

    fn render_keys(parent: &mut SceneNode, keys: &[&str]) -> ReconcileStats {
        let items: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        reconcile(
            parent,
            &items,
            |k| k.as_str(),
            |_| Ok(SceneNode::new(NodeKind::Transform)),
            |k, node| {
                node.set_attr("generation", k.clone());
                Ok(())
            },
        )
        .unwrap()
    }

    #[test]
    fn test_initial_render_enters_everything() {
        let mut parent = SceneNode::new(NodeKind::Group);
        let stats = render_keys(&mut parent, &["a", "b", "c"]);
        assert_eq!(stats, ReconcileStats { entered: 3, updated: 0, exited: 0 });
        assert_eq!(parent.child_keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_enter_update_exit_sets() {
        let mut parent = SceneNode::new(NodeKind::Group);
        render_keys(&mut parent, &["a", "b", "c"]);

        // Mark surviving nodes so we can prove they are not recreated.
        parent.child_by_key_mut("b").unwrap().set_attr("marker", "kept");
        parent.child_by_key_mut("c").unwrap().set_attr("marker", "kept");

        let stats = render_keys(&mut parent, &["b", "c", "d"]);
        assert_eq!(stats, ReconcileStats { entered: 1, updated: 2, exited: 1 });

        assert!(parent.child_by_key("a").is_none());
        assert_eq!(parent.child_by_key("b").unwrap().attr("marker"), Some("kept"));
        assert_eq!(parent.child_by_key("c").unwrap().attr("marker"), Some("kept"));
        assert!(parent.child_by_key("d").is_some());
    }

    #[test]
    fn test_reorder_does_not_recreate() {
        let mut parent = SceneNode::new(NodeKind::Group);
        render_keys(&mut parent, &["a", "b"]);
        parent.child_by_key_mut("a").unwrap().set_attr("marker", "kept");

        let stats = render_keys(&mut parent, &["b", "a"]);
        assert_eq!(stats, ReconcileStats { entered: 0, updated: 2, exited: 0 });
        assert_eq!(parent.child_by_key("a").unwrap().attr("marker"), Some("kept"));
    }

    #[test]
    fn test_idempotent_re_render() {
        let mut once = SceneNode::new(NodeKind::Group);
        render_keys(&mut once, &["a", "b"]);

        let mut twice = once.clone();
        let stats = render_keys(&mut twice, &["a", "b"]);
        assert_eq!(stats, ReconcileStats { entered: 0, updated: 2, exited: 0 });

        // Updates rewrite the same attributes, so the trees stay equal.
        render_keys(&mut once, &["a", "b"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_static_children_untouched() {
        let mut parent = SceneNode::new(NodeKind::Group);
        parent.push(SceneNode::new(NodeKind::Shape)); // unkeyed axis line etc.
        render_keys(&mut parent, &["a"]);
        let stats = render_keys(&mut parent, &[]);
        assert_eq!(stats.exited, 1);
        assert_eq!(parent.children().len(), 1);
        assert_eq!(parent.children()[0].kind(), NodeKind::Shape);
    }

    #[test]
    fn test_exit_cascades_descendants() {
        let mut parent = SceneNode::new(NodeKind::Group);
        let items = vec!["a".to_string()];
        reconcile(
            &mut parent,
            &items,
            |k| k.as_str(),
            |_| {
                Ok(SceneNode::new(NodeKind::Transform)
                    .with_child(SceneNode::new(NodeKind::Shape)))
            },
            |_, _| Ok(()),
        )
        .unwrap();
        assert_eq!(parent.node_count(), 3);

        render_keys(&mut parent, &[]);
        assert_eq!(parent.node_count(), 1);
    }

    #[test]
    fn test_duplicate_key_enters_once() {
        let mut parent = SceneNode::new(NodeKind::Group);
        let stats = render_keys(&mut parent, &["a", "a"]);
        assert_eq!(stats.entered, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(parent.children().len(), 1);
    }

    #[test]
    fn test_error_aborts_but_keeps_prior_mutations() {
        let mut parent = SceneNode::new(NodeKind::Group);
        render_keys(&mut parent, &["a", "b"]);

        let items = vec!["a".to_string(), "b".to_string()];
        let mut calls = 0;
        let result = reconcile(
            &mut parent,
            &items,
            |k| k.as_str(),
            |_| Ok(SceneNode::new(NodeKind::Transform)),
            |_, node| {
                calls += 1;
                if calls == 2 {
                    return Err(Error::Rendering("encoder failed".to_string()));
                }
                node.set_attr("touched", "yes");
                Ok(())
            },
        );

        assert!(result.is_err());
        // First update landed, exit phase never ran.
        assert_eq!(parent.child_by_key("a").unwrap().attr("touched"), Some("yes"));
        assert_eq!(parent.children().len(), 2);
    }
}
