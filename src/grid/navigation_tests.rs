//! Tests for modes, key dispatch and inline editing.

use super::*;
use crate::grid::fixtures::{columns, flat, grid_with, key, nested};
use crate::grid::GridOptions;
use crate::model::{NodeSpec, NodeTypeDefinition, NodeTypeRegistry, Tree};
use serde_json::json;

fn press(grid: &mut TreeGrid, code: KeyCode) -> bool {
    grid.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn press_ctrl(grid: &mut TreeGrid, code: KeyCode) -> bool {
    grid.handle_key(KeyEvent::new(code, KeyModifiers::CONTROL))
}

fn activate(grid: &mut TreeGrid, name: &str) {
    let node = key(grid, name);
    grid.set_active_node(Some(node), ActivateOptions::default())
        .expect("known node");
    grid.take_events();
}

fn mode_changes(events: &[GridEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GridEvent::ModeChanged { .. }))
        .count()
}

mod row_mode {
    use super::*;

    #[test]
    fn arrow_right_on_collapsed_parent_expands_instead_of_entering_cells() {
        let mut grid = grid_with(nested(), NavigationPolicy::StartRowAllowCell);
        activate(&mut grid, "a");

        assert!(press(&mut grid, KeyCode::Right));

        let a = key(&grid, "a");
        assert_eq!(grid.mode(), NavigationMode::Row);
        assert!(grid.tree().node(a).expect("exists").is_expanded());
        assert_eq!(grid.visible_nodes().len(), 5);
        let events = grid.take_events();
        assert_eq!(mode_changes(&events), 0);
        assert!(events.contains(&GridEvent::Expanded {
            node: a,
            expanded: true,
            origin: Origin::User,
        }));
    }

    #[test]
    fn enter_activates_without_toggling_expansion() {
        let mut grid = grid_with(nested(), NavigationPolicy::RowOnly);
        activate(&mut grid, "a");

        assert!(press(&mut grid, KeyCode::Enter));

        let a = key(&grid, "a");
        assert!(!grid.tree().node(a).expect("exists").is_expanded());
        assert_eq!(grid.visible_nodes().len(), 3);
        assert_eq!(grid.active_node(), Some(a));
        let events = grid.take_events();
        assert!(events.contains(&GridEvent::ActiveNodeChanged {
            node: Some(a),
            previous: Some(a),
            activated: true,
            origin: Origin::User,
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GridEvent::Expanded { .. })));
    }

    #[test]
    fn arrow_right_on_expanded_node_enters_cells_when_allowed() {
        let mut grid = grid_with(nested(), NavigationPolicy::StartRowAllowCell);
        grid.set_expanded(key(&grid, "a"), true).expect("known node");
        activate(&mut grid, "a");

        press(&mut grid, KeyCode::Right);

        assert_eq!(grid.mode(), NavigationMode::CellNav);
        assert_eq!(grid.active_column(), 0);
    }

    #[test]
    fn arrow_right_on_expanded_node_moves_to_first_child_when_row_only() {
        let mut grid = grid_with(nested(), NavigationPolicy::RowOnly);
        grid.set_expanded(key(&grid, "a"), true).expect("known node");
        activate(&mut grid, "a");

        press(&mut grid, KeyCode::Right);

        assert_eq!(grid.mode(), NavigationMode::Row);
        assert_eq!(grid.active_node(), Some(key(&grid, "a1")));
    }

    #[test]
    fn arrow_left_climbs_and_collapses() {
        let mut grid = grid_with(nested(), NavigationPolicy::RowOnly);
        activate(&mut grid, "a1x");
        let a1 = key(&grid, "a1");

        press(&mut grid, KeyCode::Left);
        assert_eq!(grid.active_node(), Some(a1));

        press(&mut grid, KeyCode::Left);
        assert_eq!(grid.active_node(), Some(a1), "collapse keeps the node");
        assert!(!grid.tree().node(a1).expect("exists").is_expanded());

        press(&mut grid, KeyCode::Left);
        assert_eq!(grid.active_node(), Some(key(&grid, "a")));
    }

    #[test]
    fn first_movement_lands_on_first_row() {
        let mut grid = grid_with(flat(30), NavigationPolicy::default());

        assert!(press(&mut grid, KeyCode::Down));

        let n0 = key(&grid, "n0");
        assert_eq!(grid.active_node(), Some(n0));
        assert_eq!(
            grid.take_events(),
            vec![GridEvent::ActiveNodeChanged {
                node: Some(n0),
                previous: None,
                activated: true,
                origin: Origin::User,
            }]
        );

        press(&mut grid, KeyCode::Down);
        assert_eq!(grid.active_node(), Some(key(&grid, "n1")));
    }

    #[test]
    fn control_movement_moves_without_activating() {
        let mut grid = grid_with(flat(30), NavigationPolicy::default());
        activate(&mut grid, "n0");

        press_ctrl(&mut grid, KeyCode::Down);

        let events = grid.take_events();
        assert!(matches!(
            events.as_slice(),
            [GridEvent::ActiveNodeChanged { activated: false, .. }]
        ));
        assert_eq!(grid.active_node(), Some(key(&grid, "n1")));
    }

    #[test]
    fn paging_and_jumps_scroll_the_active_row_into_view() {
        let mut grid = grid_with(flat(100), NavigationPolicy::default());
        activate(&mut grid, "n0");

        press(&mut grid, KeyCode::PageDown);
        assert_eq!(grid.active_node(), Some(key(&grid, "n10")));
        assert_eq!(grid.viewport().scroll_top(), 1);

        press_ctrl(&mut grid, KeyCode::End);
        assert_eq!(grid.active_node(), Some(key(&grid, "n99")));
        assert_eq!(grid.viewport().scroll_top(), 90);

        grid.on_tick().expect("scroll flush");
        assert_eq!(grid.viewport().range(), crate::render::RowRange::new(85, 100));
    }

    #[test]
    fn unbound_keys_are_not_handled() {
        let mut grid = grid_with(flat(3), NavigationPolicy::default());
        assert!(!press(&mut grid, KeyCode::Char('q')));
        assert!(grid.take_events().is_empty());
    }
}

mod cell_modes {
    use super::*;

    #[test]
    fn left_at_title_column_returns_to_row_mode_exactly_once() {
        let mut grid = grid_with(nested(), NavigationPolicy::StartRowAllowCell);
        activate(&mut grid, "c");

        press(&mut grid, KeyCode::Right);
        assert_eq!(grid.mode(), NavigationMode::CellNav);
        grid.take_events();

        assert!(press(&mut grid, KeyCode::Left));
        assert_eq!(grid.mode(), NavigationMode::Row);

        // A root leaf in row mode has nowhere to go.
        assert!(!press(&mut grid, KeyCode::Left));
        assert_eq!(grid.mode(), NavigationMode::Row);
        assert_eq!(mode_changes(&grid.take_events()), 1);
    }

    #[test]
    fn cell_only_policy_blocks_leaving_the_title_column() {
        let mut grid = grid_with(nested(), NavigationPolicy::CellOnly);
        activate(&mut grid, "c");

        press(&mut grid, KeyCode::Left);
        press(&mut grid, KeyCode::Esc);

        assert_eq!(grid.mode(), NavigationMode::CellNav);
        assert_eq!(mode_changes(&grid.take_events()), 0);
    }

    #[test]
    fn columns_move_within_bounds() {
        let mut grid = grid_with(nested(), NavigationPolicy::CellOnly);
        activate(&mut grid, "c");

        press(&mut grid, KeyCode::Right);
        assert_eq!(grid.active_column(), 1);
        press(&mut grid, KeyCode::Right);
        assert_eq!(grid.active_column(), 1);
        press(&mut grid, KeyCode::Home);
        assert_eq!(grid.active_column(), 0);
        press(&mut grid, KeyCode::End);
        assert_eq!(grid.active_column(), 1);
    }

    #[test]
    fn vertical_movement_keeps_the_column() {
        let mut grid = grid_with(flat(5), NavigationPolicy::CellOnly);
        activate(&mut grid, "n0");
        grid.set_column(1);

        press(&mut grid, KeyCode::Down);

        assert_eq!(grid.active_node(), Some(key(&grid, "n1")));
        assert_eq!(grid.active_column(), 1);
    }

    #[test]
    fn set_column_clamps() {
        let mut grid = grid_with(flat(5), NavigationPolicy::CellOnly);
        assert!(grid.set_column(9));
        assert_eq!(grid.active_column(), 1);
        assert!(!grid.set_column(1));
    }

    #[test]
    fn policy_change_leaves_forbidden_mode() {
        let mut grid = grid_with(flat(5), NavigationPolicy::StartCellAllowRow);

        grid.set_navigation_mode(NavigationPolicy::RowOnly);

        assert_eq!(grid.mode(), NavigationMode::Row);
        assert_eq!(
            grid.take_events(),
            vec![GridEvent::ModeChanged {
                from: NavigationMode::CellNav,
                to: NavigationMode::Row,
                origin: Origin::Api,
            }]
        );
        assert!(!grid.enter_mode(NavigationMode::CellNav));
    }
}

mod editing {
    use super::*;

    fn editable_grid() -> TreeGrid {
        let tree = Tree::from_specs(vec![
            NodeSpec::new("report")
                .with_key("r")
                .with_type("file")
                .with_data("size", 3),
            NodeSpec::new("notes").with_key("n").with_data("size", 7),
        ])
        .expect("valid tree");
        let mut types = NodeTypeRegistry::new();
        types.register(
            "file",
            NodeTypeDefinition::default().with_editable("size", InputKind::Number),
        );
        let options = GridOptions {
            navigation: NavigationPolicy::CellOnly,
            ..GridOptions::default()
        };
        let mut grid = TreeGrid::new(tree, columns(), options)
            .expect("valid columns")
            .with_node_types(types);
        grid.set_viewport_size(40, 10).expect("resolvable width");
        grid.on_tick();
        grid
    }

    fn activate_cell(grid: &mut TreeGrid, name: &str, column: usize) {
        let node = key(grid, name);
        grid.set_active_node(
            Some(node),
            ActivateOptions {
                column: Some(column),
                ..ActivateOptions::default()
            },
        )
        .expect("known node");
        grid.take_events();
    }

    #[test]
    fn number_edit_commits_on_enter() {
        let mut grid = editable_grid();
        activate_cell(&mut grid, "r", 1);

        press(&mut grid, KeyCode::F(2));
        assert_eq!(grid.mode(), NavigationMode::CellEdit);
        assert_eq!(grid.edit().map(|e| e.value.as_str()), Some("3"));

        press(&mut grid, KeyCode::Char('4'));
        press(&mut grid, KeyCode::Char('x'));
        assert_eq!(grid.edit().map(|e| e.value.as_str()), Some("34"));

        press(&mut grid, KeyCode::Enter);

        let r = key(&grid, "r");
        assert_eq!(grid.mode(), NavigationMode::CellNav);
        assert_eq!(grid.edit(), None);
        assert_eq!(grid.tree().node(r).expect("exists").data()["size"], json!(34));
        assert!(grid.take_events().contains(&GridEvent::EditCommitted {
            node: r,
            column: 1,
            value: "34".to_string(),
            origin: Origin::User,
        }));
    }

    #[test]
    fn escape_discards_the_edit() {
        let mut grid = editable_grid();
        activate_cell(&mut grid, "r", 1);

        press(&mut grid, KeyCode::F(2));
        press(&mut grid, KeyCode::Char('9'));
        press(&mut grid, KeyCode::Esc);

        let r = key(&grid, "r");
        assert_eq!(grid.mode(), NavigationMode::CellNav);
        assert_eq!(grid.tree().node(r).expect("exists").data()["size"], json!(3));
    }

    #[test]
    fn columns_without_an_input_are_not_editable() {
        let mut grid = editable_grid();
        activate_cell(&mut grid, "n", 1);

        press(&mut grid, KeyCode::F(2));

        assert_eq!(grid.mode(), NavigationMode::CellNav);
        assert_eq!(grid.edit(), None);
    }

    #[test]
    fn enter_on_expandable_title_edits_the_title() {
        let mut grid = grid_with(nested(), NavigationPolicy::CellOnly);
        activate(&mut grid, "a");

        press(&mut grid, KeyCode::Enter);
        assert_eq!(grid.mode(), NavigationMode::CellEdit);

        press(&mut grid, KeyCode::Backspace);
        press(&mut grid, KeyCode::Char('z'));
        press(&mut grid, KeyCode::Enter);

        let a = key(&grid, "a");
        assert_eq!(grid.tree().node(a).expect("exists").title(), "z");
    }

    #[test]
    fn moving_to_another_row_commits() {
        let mut grid = grid_with(flat(3), NavigationPolicy::CellOnly);
        activate(&mut grid, "n1");

        press(&mut grid, KeyCode::F(2));
        press(&mut grid, KeyCode::Char('!'));
        press(&mut grid, KeyCode::Up);

        let n1 = key(&grid, "n1");
        assert_eq!(grid.active_node(), Some(key(&grid, "n0")));
        assert_eq!(grid.mode(), NavigationMode::CellNav);
        assert_eq!(grid.tree().node(n1).expect("exists").title(), "node 1!");
    }

    #[test]
    fn row_only_policy_never_edits() {
        let mut grid = grid_with(flat(3), NavigationPolicy::RowOnly);
        activate(&mut grid, "n1");

        assert!(!grid.start_edit());
        assert!(!grid.enter_mode(NavigationMode::CellEdit));
    }
}

mod api {
    use super::*;

    #[test]
    fn set_active_node_reveals_collapsed_ancestors() {
        let mut grid = grid_with(nested(), NavigationPolicy::default());
        let a1x = key(&grid, "a1x");

        assert_eq!(
            grid.set_active_node(Some(a1x), ActivateOptions::default()),
            Ok(true)
        );

        assert!(grid.visible_nodes().contains(&a1x));
        assert!(grid.tree().node(key(&grid, "a")).expect("exists").is_expanded());
        assert!(grid.tree().node(key(&grid, "a1")).expect("exists").is_expanded());
    }

    #[test]
    fn set_active_node_rejects_foreign_ids() {
        let mut grid = grid_with(nested(), NavigationPolicy::default());
        let foreign = NodeId::new(99);
        assert_eq!(
            grid.set_active_node(Some(foreign), ActivateOptions::default()),
            Err(TreeError::UnknownNode(foreign))
        );
    }

    #[test]
    fn clearing_the_active_node() {
        let mut grid = grid_with(nested(), NavigationPolicy::default());
        activate(&mut grid, "c");

        assert_eq!(grid.set_active_node(None, ActivateOptions::default()), Ok(true));
        assert_eq!(grid.active_node(), None);
    }

    #[test]
    fn batch_matches_one_by_one_with_flushes_between() {
        let actions = [
            Action::Down,
            Action::Down,
            Action::Right,
            Action::Right,
            Action::Left,
            Action::Down,
            Action::Expand,
            Action::PageDown,
            Action::Up,
            Action::ToggleSelect,
        ];
        let mut batched = grid_with(nested(), NavigationPolicy::StartRowAllowCell);
        let mut stepped = grid_with(nested(), NavigationPolicy::StartRowAllowCell);

        batched.navigate_batch(&actions);
        for action in actions {
            stepped.navigate(action, None);
            stepped.on_tick();
        }

        assert_eq!(batched.nav(), stepped.nav());
        assert_eq!(batched.visible_nodes(), stepped.visible_nodes());
    }
}
