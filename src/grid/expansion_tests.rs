//! Tests for expansion, lazy loading, selection and filtering.

use super::*;
use crate::grid::fixtures::{grid_with, grid_with_options, key, nested};
use crate::grid::{ActivateOptions, GridOptions};
use crate::nav::NavigationPolicy;

fn grid() -> TreeGrid {
    grid_with(nested(), NavigationPolicy::default())
}

fn children(names: &[&str]) -> Vec<NodeSpec> {
    names
        .iter()
        .map(|name| NodeSpec::new(*name).with_key(*name))
        .collect()
}

mod lazy_loading {
    use super::*;

    #[test]
    fn expanding_a_lazy_node_requests_a_load() {
        let mut grid = grid();
        let b = key(&grid, "b");

        assert_eq!(grid.set_expanded(b, true), Ok(true));

        let node = grid.tree().node(b).expect("exists");
        assert_eq!(node.status(), NodeStatus::Loading);
        assert_eq!(node.load_generation(), 1);
        assert!(node.is_expanded());
        assert_eq!(
            grid.take_events(),
            vec![GridEvent::LoadRequested {
                node: b,
                generation: 1,
                origin: Origin::Api,
            }]
        );
    }

    #[test]
    fn resolved_children_become_visible() {
        let mut grid = grid();
        let b = key(&grid, "b");
        grid.set_expanded(b, true).expect("known node");
        grid.take_events();

        assert_eq!(grid.resolve_lazy_load(b, 1, Ok(children(&["b1", "b2"]))), Ok(true));

        let node = grid.tree().node(b).expect("exists");
        assert_eq!(node.status(), NodeStatus::Ok);
        assert!(!node.is_lazy());
        let order: Vec<&str> = grid
            .visible_nodes()
            .iter()
            .map(|id| grid.tree().node(*id).expect("exists").key())
            .collect();
        assert_eq!(order, vec!["a", "b", "b1", "b2", "c"]);
        assert!(grid.take_events().contains(&GridEvent::Expanded {
            node: b,
            expanded: true,
            origin: Origin::Api,
        }));
    }

    #[test]
    fn empty_result_marks_no_data() {
        let mut grid = grid();
        let b = key(&grid, "b");
        grid.set_expanded(b, true).expect("known node");

        grid.resolve_lazy_load(b, 1, Ok(Vec::new())).expect("known node");

        let node = grid.tree().node(b).expect("exists");
        assert_eq!(node.status(), NodeStatus::NoData);
        assert!(!node.is_lazy());
    }

    #[test]
    fn failed_load_collapses_and_can_be_retried() {
        let mut grid = grid();
        let b = key(&grid, "b");
        grid.set_expanded(b, true).expect("known node");

        let applied = grid.resolve_lazy_load(b, 1, Err(LoadError::new("timeout")));

        assert_eq!(applied, Ok(true));
        let node = grid.tree().node(b).expect("exists");
        assert_eq!(node.status(), NodeStatus::Error);
        assert_eq!(node.status_message(), Some("timeout"));
        assert!(!node.is_expanded());
        assert!(node.is_lazy());

        grid.set_expanded(b, true).expect("known node");
        let node = grid.tree().node(b).expect("exists");
        assert_eq!(node.status(), NodeStatus::Loading);
        assert_eq!(node.load_generation(), 2);
    }

    #[test]
    fn collapse_during_load_discards_the_result() {
        let mut grid = grid();
        let b = key(&grid, "b");
        grid.set_expanded(b, true).expect("known node");
        grid.set_expanded(b, false).expect("known node");

        let applied = grid.resolve_lazy_load(b, 1, Ok(children(&["late"])));

        assert_eq!(applied, Ok(false));
        let node = grid.tree().node(b).expect("exists");
        assert_eq!(node.status(), NodeStatus::Ok);
        assert!(node.children().is_empty());
        assert!(grid.tree().find_by_key("late").is_none());
    }

    #[test]
    fn only_the_latest_generation_applies() {
        let mut grid = grid();
        let b = key(&grid, "b");
        grid.set_expanded(b, true).expect("known node");
        grid.set_expanded(b, false).expect("known node");
        grid.set_expanded(b, true).expect("known node");

        assert_eq!(grid.tree().node(b).expect("exists").load_generation(), 3);
        assert_eq!(grid.resolve_lazy_load(b, 1, Ok(children(&["old"]))), Ok(false));
        assert_eq!(grid.resolve_lazy_load(b, 3, Ok(children(&["new"]))), Ok(true));
        assert!(grid.tree().find_by_key("old").is_none());
        assert!(grid.tree().find_by_key("new").is_some());
    }

    #[test]
    fn checked_parent_passes_selection_to_loaded_children() {
        let mut grid = grid();
        let b = key(&grid, "b");
        grid.set_selected(b, Selection::Checked).expect("known node");
        grid.set_expanded(b, true).expect("known node");

        grid.resolve_lazy_load(b, 1, Ok(children(&["b1", "b2"])))
            .expect("known node");

        for name in ["b1", "b2"] {
            let node = grid.tree().node(key(&grid, name)).expect("exists");
            assert_eq!(node.selection(), Selection::Checked, "{name}");
        }
    }
}

mod expansion {
    use super::*;

    #[test]
    fn collapsing_moves_active_node_out_of_the_hidden_subtree() {
        let mut grid = grid();
        let a1x = key(&grid, "a1x");
        let a = key(&grid, "a");
        grid.set_active_node(Some(a1x), ActivateOptions::default())
            .expect("known node");
        grid.take_events();

        grid.set_expanded(a, false).expect("known node");

        assert_eq!(grid.active_node(), Some(a));
        assert_eq!(grid.visible_nodes().len(), 3);
        assert!(grid.take_events().contains(&GridEvent::ActiveNodeChanged {
            node: Some(a),
            previous: Some(a1x),
            activated: true,
            origin: Origin::Api,
        }));
    }

    #[test]
    fn collapse_then_expand_restores_visible_order() {
        let mut grid = grid();
        let a = key(&grid, "a");
        grid.set_expanded(a, true).expect("known node");
        grid.set_expanded(key(&grid, "a1"), true).expect("known node");
        let before = grid.visible_nodes().to_vec();

        grid.set_expanded(a, false).expect("known node");
        grid.set_expanded(a, true).expect("known node");

        assert_eq!(grid.visible_nodes(), before.as_slice());
    }

    #[test]
    fn leaves_do_not_expand() {
        let mut grid = grid();
        let c = key(&grid, "c");

        assert_eq!(grid.set_expanded(c, true), Ok(false));
        assert!(grid.take_events().is_empty());
        assert!(!grid.needs_flush());
    }

    #[test]
    fn expand_all_skips_unloaded_nodes() {
        let mut grid = grid();

        assert_eq!(grid.expand_all(), 2);

        assert_eq!(grid.visible_nodes().len(), 6);
        let b = grid.tree().node(key(&grid, "b")).expect("exists");
        assert_eq!(b.load_generation(), 0);
        assert_eq!(grid.expand_all(), 0);
    }

    #[test]
    fn collapse_all_moves_active_node_to_its_root() {
        let mut grid = grid();
        grid.set_active_node(Some(key(&grid, "a1x")), ActivateOptions::default())
            .expect("known node");

        assert_eq!(grid.collapse_all(), 2);

        assert_eq!(grid.active_node(), Some(key(&grid, "a")));
        assert_eq!(grid.visible_nodes().len(), 3);
    }

    #[test]
    fn expansion_schedules_a_rebuild() {
        let mut grid = grid();
        grid.set_expanded(key(&grid, "a"), true).expect("known node");

        let report = grid.on_tick().expect("structure flush");
        assert!(report.rebuild);
        assert_eq!(report.rows_rendered, 5);
    }
}

mod selection {
    use super::*;

    #[test]
    fn cascade_updates_descendants_and_ancestors() {
        let mut grid = grid();
        let (a, a1, a1x) = (key(&grid, "a"), key(&grid, "a1"), key(&grid, "a1x"));

        assert_eq!(grid.set_selected(a1x, Selection::Checked), Ok(true));

        let selection = |id| grid.tree().node(id).expect("exists").selection();
        assert_eq!(selection(a1x), Selection::Checked);
        assert_eq!(selection(a1), Selection::Checked);
        assert_eq!(selection(a), Selection::Partial);
        assert_eq!(
            grid.take_events(),
            vec![GridEvent::SelectionChanged {
                node: a1x,
                selection: Selection::Checked,
                changed: vec![a1x, a1, a],
                origin: Origin::Api,
            }]
        );
    }

    #[test]
    fn toggling_a_partial_parent_checks_the_subtree() {
        let mut grid = grid();
        let a = key(&grid, "a");
        grid.set_selected(key(&grid, "a2"), Selection::Checked)
            .expect("known node");

        grid.toggle_selected(a).expect("known node");

        for name in ["a", "a1", "a1x", "a2"] {
            let node = grid.tree().node(key(&grid, name)).expect("exists");
            assert_eq!(node.selection(), Selection::Checked, "{name}");
        }
    }

    #[test]
    fn without_cascade_only_the_node_changes() {
        let mut grid = grid_with_options(
            nested(),
            GridOptions {
                cascade_select: false,
                ..GridOptions::default()
            },
        );
        let a = key(&grid, "a");

        grid.set_selected(a, Selection::Checked).expect("known node");

        let a1 = grid.tree().node(key(&grid, "a1")).expect("exists");
        assert_eq!(a1.selection(), Selection::Unchecked);
        assert!(matches!(
            grid.take_events().as_slice(),
            [GridEvent::SelectionChanged { changed, .. }] if changed == &vec![a]
        ));
    }

    #[test]
    fn unchanged_value_emits_nothing() {
        let mut grid = grid();
        let c = key(&grid, "c");
        assert_eq!(grid.set_selected(c, Selection::Unchecked), Ok(false));
        assert!(grid.take_events().is_empty());
    }

    #[test]
    fn space_toggles_the_active_node() {
        let mut grid = grid();
        let c = key(&grid, "c");
        grid.set_active_node(Some(c), ActivateOptions::default())
            .expect("known node");

        grid.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char(' '),
            crossterm::event::KeyModifiers::NONE,
        ));

        assert_eq!(
            grid.tree().node(c).expect("exists").selection(),
            Selection::Checked
        );
    }
}

mod filtering {
    use super::*;

    #[test]
    fn hidden_nodes_leave_the_visible_sequence() {
        let mut grid = grid();
        let c = key(&grid, "c");

        assert_eq!(grid.set_hidden(c, true), Ok(true));
        assert_eq!(grid.visible_nodes().len(), 2);
        assert_eq!(grid.set_hidden(c, true), Ok(false));

        grid.set_hidden(c, false).expect("known node");
        assert_eq!(grid.visible_nodes().len(), 3);
    }

    #[test]
    fn hiding_the_active_node_moves_it_to_the_row_above() {
        let mut grid = grid();
        let (a, b, c) = (key(&grid, "a"), key(&grid, "b"), key(&grid, "c"));
        grid.set_active_node(Some(b), ActivateOptions::default())
            .expect("known node");

        grid.set_hidden(b, true).expect("known node");
        grid.on_tick();
        assert_eq!(grid.active_node(), Some(a));

        assert!(grid.navigate(Action::Down, None));
        assert_eq!(grid.active_node(), Some(c));
    }

    #[test]
    fn hiding_the_first_active_row_moves_down() {
        let mut grid = grid();
        let (a, b) = (key(&grid, "a"), key(&grid, "b"));
        grid.set_active_node(Some(a), ActivateOptions::default())
            .expect("known node");
        grid.take_events();

        grid.set_hidden(a, true).expect("known node");

        assert_eq!(grid.active_node(), Some(b));
        assert!(grid.take_events().iter().any(|e| matches!(
            e,
            GridEvent::ActiveNodeChanged { node: Some(n), previous: Some(p), .. }
                if *n == b && *p == a
        )));
    }

    #[test]
    fn hiding_an_ancestor_skips_its_subtree() {
        let mut grid = grid();
        let (a, a2, b) = (key(&grid, "a"), key(&grid, "a2"), key(&grid, "b"));
        grid.set_expanded(a, true).expect("known node");
        grid.set_active_node(Some(a2), ActivateOptions::default())
            .expect("known node");

        grid.set_hidden(a, true).expect("known node");

        assert_eq!(grid.active_node(), Some(b));
    }

    #[test]
    fn hiding_another_row_keeps_the_active_node() {
        let mut grid = grid();
        let (a, c) = (key(&grid, "a"), key(&grid, "c"));
        grid.set_active_node(Some(c), ActivateOptions::default())
            .expect("known node");

        grid.set_hidden(a, true).expect("known node");

        assert_eq!(grid.active_node(), Some(c));
    }
}
