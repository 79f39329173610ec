//! Grids shared by the grid tests.

use super::{GridOptions, TreeGrid};
use crate::layout::ColumnDef;
use crate::model::{NodeId, NodeSpec, Tree};
use crate::nav::NavigationPolicy;

pub(crate) fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::title_column("Name"),
        ColumnDef::new("size", "Size").with_width("10px"),
    ]
}

/// `count` top-level leaves keyed `n0..`, with `size = i`.
pub(crate) fn flat(count: usize) -> Vec<NodeSpec> {
    (0..count)
        .map(|i| {
            NodeSpec::new(format!("node {i}"))
                .with_key(format!("n{i}"))
                .with_data("size", i as u64)
        })
        .collect()
}

/// ```text
/// a
/// ├── a1
/// │   └── a1x
/// └── a2
/// b   (lazy)
/// c
/// ```
pub(crate) fn nested() -> Vec<NodeSpec> {
    vec![
        NodeSpec::new("a").with_key("a").with_children(vec![
            NodeSpec::new("a1")
                .with_key("a1")
                .with_children(vec![NodeSpec::new("a1x").with_key("a1x")]),
            NodeSpec::new("a2").with_key("a2"),
        ]),
        NodeSpec::new("b").with_key("b").lazy(),
        NodeSpec::new("c").with_key("c"),
    ]
}

/// A 40x10 grid, flushed once with events drained.
pub(crate) fn grid_with(specs: Vec<NodeSpec>, policy: NavigationPolicy) -> TreeGrid {
    grid_with_options(
        specs,
        GridOptions {
            navigation: policy,
            ..GridOptions::default()
        },
    )
}

pub(crate) fn grid_with_options(specs: Vec<NodeSpec>, options: GridOptions) -> TreeGrid {
    let tree = Tree::from_specs(specs).expect("valid tree");
    let mut grid = TreeGrid::new(tree, columns(), options).expect("valid columns");
    grid.set_viewport_size(40, 10).expect("resolvable width");
    grid.on_tick();
    grid.take_events();
    grid
}

pub(crate) fn key(grid: &TreeGrid, key: &str) -> NodeId {
    grid.tree().find_by_key(key).expect("key exists")
}
