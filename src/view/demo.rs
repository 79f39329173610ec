//! Demo data: generated trees, node types and JSON loading.

use crate::layout::ColumnDef;
use crate::model::{AppError, InputKind, NodeSpec, NodeTypeDefinition, NodeTypeRegistry};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Children per generated folder.
const FANOUT: usize = 6;

/// Children returned by a lazy load.
const LAZY_CHILDREN: usize = 5;

/// Deepest level at which lazily loaded children are lazy again.
const MAX_LAZY_LEVEL: usize = 6;

/// Columns of the generated tree.
pub fn demo_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::title_column("Name").with_width(3.0),
        ColumnDef::new("kind", "Kind").with_width("10px"),
        ColumnDef::new("size", "Size").with_width("8px"),
        ColumnDef::new("notes", "Notes")
            .with_width(2.0)
            .with_min_width("8px"),
    ]
}

/// Node types of the generated tree.
///
/// Documents have editable size and notes; sections span all columns and
/// have no checkbox.
pub fn demo_types() -> NodeTypeRegistry {
    let mut types = NodeTypeRegistry::new();
    types.register("folder", NodeTypeDefinition::default().with_class("folder"));
    types.register(
        "doc",
        NodeTypeDefinition::default()
            .with_icon("doc")
            .with_editable("size", InputKind::Number)
            .with_editable("notes", InputKind::Text),
    );
    types.register(
        "section",
        NodeTypeDefinition::default()
            .with_icon("section")
            .with_colspan(true)
            .with_checkbox(false),
    );
    types
}

/// Generate about `nodes` nodes nested at most `depth` levels deep.
///
/// Every fourth folder is lazy and gets its children from
/// [`lazy_children`]. Output is deterministic.
pub fn demo_tree(nodes: usize, depth: usize) -> Vec<NodeSpec> {
    let mut budget = nodes;
    let mut roots = Vec::new();
    let mut index = 0;
    while budget > 0 {
        let key = format!("r{index}");
        if index % 10 == 0 {
            budget -= 1;
            roots.push(
                NodeSpec::new(format!("Section {}", index / 10 + 1))
                    .with_key(key)
                    .with_type("section"),
            );
        } else {
            roots.push(generate(&key, 0, depth.max(1), &mut budget));
        }
        index += 1;
    }
    roots
}

fn generate(key: &str, level: usize, depth: usize, budget: &mut usize) -> NodeSpec {
    *budget = budget.saturating_sub(1);
    let ordinal = key
        .rsplit(['.', 'r'])
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);
    let is_folder = level + 1 < depth && ordinal % 3 != 2;
    if !is_folder {
        return document(key, ordinal);
    }
    let spec = NodeSpec::new(format!("Folder {key}"))
        .with_key(key)
        .with_type("folder")
        .with_data("kind", "folder");
    if ordinal % 4 == 3 {
        return spec.lazy();
    }
    let mut children = Vec::new();
    for i in 0..FANOUT {
        if *budget == 0 {
            break;
        }
        children.push(generate(&format!("{key}.{i}"), level + 1, depth, budget));
    }
    spec.with_children(children)
}

fn document(key: &str, ordinal: usize) -> NodeSpec {
    NodeSpec::new(format!("Document {key}"))
        .with_key(key)
        .with_type("doc")
        .with_data("kind", "doc")
        .with_data("size", (ordinal as u64 + 1) * 128)
        .with_data("notes", "")
}

/// Children delivered for the lazy node `key` at `level`.
pub fn lazy_children(key: &str, level: usize) -> Vec<NodeSpec> {
    (0..LAZY_CHILDREN)
        .map(|i| {
            let child = format!("{key}.{i}");
            if i == 0 && level < MAX_LAZY_LEVEL {
                NodeSpec::new(format!("Folder {child}"))
                    .with_key(child)
                    .with_type("folder")
                    .with_data("kind", "folder")
                    .lazy()
            } else {
                document(&child, i)
            }
        })
        .collect()
}

/// Read node specs from a JSON array.
///
/// # Errors
///
/// Returns [`AppError::Data`] if the file cannot be read or parsed.
pub fn load_specs(path: &Path) -> Result<Vec<NodeSpec>, AppError> {
    load_json(path)
}

/// Read column declarations from a JSON array.
///
/// # Errors
///
/// Returns [`AppError::Data`] if the file cannot be read or parsed.
pub fn load_columns(path: &Path) -> Result<Vec<ColumnDef>, AppError> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let data_error = |reason: String| AppError::Data {
        path: path.to_path_buf(),
        reason,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| data_error(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| data_error(e.to_string()))
}
