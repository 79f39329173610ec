//! Tests for the node tree.

use super::*;

fn sample_tree() -> Tree {
    // a
    // ├─ a1
    // │  └─ a1x
    // └─ a2
    // b (lazy)
    Tree::from_specs(vec![
        NodeSpec::new("a").with_key("a").with_children(vec![
            NodeSpec::new("a1")
                .with_key("a1")
                .with_children(vec![NodeSpec::new("a1x").with_key("a1x")]),
            NodeSpec::new("a2").with_key("a2"),
        ]),
        NodeSpec::new("b").with_key("b").lazy(),
    ])
    .expect("valid tree")
}

fn id(tree: &Tree, key: &str) -> NodeId {
    tree.find_by_key(key).expect("key exists")
}

fn keys(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|i| tree.get(*i).expect("node").key().to_string())
        .collect()
}

mod construction {
    use super::*;

    #[test]
    fn builds_levels_and_parents() {
        let tree = sample_tree();
        let a1x = id(&tree, "a1x");

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.get(a1x).map(|n| n.level()), Some(2));
        assert_eq!(
            tree.get(a1x).and_then(|n| n.parent()),
            Some(id(&tree, "a1"))
        );
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = Tree::from_specs(vec![
            NodeSpec::new("x").with_key("same"),
            NodeSpec::new("y").with_key("same"),
        ]);
        assert_eq!(
            result.err(),
            Some(TreeError::DuplicateKey {
                key: "same".to_string()
            })
        );
    }

    #[test]
    fn failed_add_leaves_tree_unchanged() {
        let mut tree = sample_tree();
        let b = id(&tree, "b");

        let result = tree.add_children(
            Some(b),
            vec![NodeSpec::new("new"), NodeSpec::new("dup").with_key("a2")],
        );

        assert!(result.is_err());
        assert_eq!(tree.len(), 5);
        assert!(tree.get(b).map(|n| n.children().is_empty()).unwrap_or(false));
    }

    #[test]
    fn missing_keys_are_generated_uniquely() {
        let tree = Tree::from_specs(vec![NodeSpec::new("x"), NodeSpec::new("y")])
            .expect("valid tree");
        let k0 = tree.get(tree.roots()[0]).map(|n| n.key().to_string());
        let k1 = tree.get(tree.roots()[1]).map(|n| n.key().to_string());
        assert_ne!(k0, k1);
    }

    #[test]
    fn lazy_node_with_children_is_loaded() {
        let tree = Tree::from_specs(vec![NodeSpec::new("p")
            .lazy()
            .with_children(vec![NodeSpec::new("c")])])
        .expect("valid tree");
        assert!(!tree.get(tree.roots()[0]).map(|n| n.is_lazy()).unwrap_or(true));
    }

    #[test]
    fn foreign_id_is_unknown() {
        let tree = sample_tree();
        assert_eq!(
            tree.node(NodeId::new(99)).err(),
            Some(TreeError::UnknownNode(NodeId::new(99)))
        );
    }
}

mod visibility {
    use super::*;

    #[test]
    fn collapsed_tree_shows_roots_only() {
        let tree = sample_tree();
        assert_eq!(keys(&tree, &tree.visible_nodes(false)), vec!["a", "b"]);
    }

    #[test]
    fn expand_all_shows_loaded_descendants_in_order() {
        let mut tree = sample_tree();
        let changed = tree.set_expanded_all(true);

        assert_eq!(changed.len(), 2);
        assert_eq!(
            keys(&tree, &tree.visible_nodes(false)),
            vec!["a", "a1", "a1x", "a2", "b"]
        );
    }

    #[test]
    fn hidden_nodes_skip_their_subtree() {
        let mut tree = sample_tree();
        tree.set_expanded_all(true);
        let a1 = id(&tree, "a1");
        tree.set_hidden(a1, true).expect("known node");

        assert_eq!(
            keys(&tree, &tree.visible_nodes(false)),
            vec!["a", "a2", "b"]
        );
        assert_eq!(tree.visible_nodes(true).len(), 5);
    }

    #[test]
    fn reachable_requires_expanded_ancestors() {
        let mut tree = sample_tree();
        let a1x = id(&tree, "a1x");
        assert!(!tree.is_reachable(a1x));

        tree.set_expanded_all(true);
        assert!(tree.is_reachable(a1x));
        assert!(tree.is_descendant_of(a1x, id(&tree, "a")));
    }
}

mod selection {
    use super::*;

    #[test]
    fn cascade_checks_descendants_and_marks_parent_partial() {
        let mut tree = sample_tree();
        let a1 = id(&tree, "a1");

        let changed = tree
            .set_selection(a1, Selection::Checked, true)
            .expect("known node");

        assert_eq!(changed.len(), 3);
        assert_eq!(
            tree.get(id(&tree, "a1x")).map(|n| n.selection()),
            Some(Selection::Checked)
        );
        assert_eq!(
            tree.get(id(&tree, "a")).map(|n| n.selection()),
            Some(Selection::Partial)
        );
    }

    #[test]
    fn checking_all_children_checks_parent() {
        let mut tree = sample_tree();
        tree.set_selection(id(&tree, "a1"), Selection::Checked, true)
            .expect("known node");
        tree.set_selection(id(&tree, "a2"), Selection::Checked, true)
            .expect("known node");

        assert_eq!(
            tree.get(id(&tree, "a")).map(|n| n.selection()),
            Some(Selection::Checked)
        );
    }

    #[test]
    fn without_cascade_only_the_node_changes() {
        let mut tree = sample_tree();
        let changed = tree
            .set_selection(id(&tree, "a"), Selection::Checked, false)
            .expect("known node");

        assert_eq!(changed, vec![id(&tree, "a")]);
        assert_eq!(
            tree.get(id(&tree, "a1")).map(|n| n.selection()),
            Some(Selection::Unchecked)
        );
    }

    #[test]
    fn recompute_derives_parent_state_from_children() {
        let mut tree = Tree::from_specs(vec![NodeSpec::new("p").with_children(vec![
            NodeSpec {
                selected: true,
                ..NodeSpec::new("c1")
            },
            NodeSpec::new("c2"),
        ])])
        .expect("valid tree");

        tree.recompute_selection();

        assert_eq!(
            tree.get(tree.roots()[0]).map(|n| n.selection()),
            Some(Selection::Partial)
        );
    }
}
