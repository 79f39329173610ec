//! Cell content source.

use crate::layout::ColumnDef;
use crate::model::{Node, RenderError};
use serde_json::Value;

/// Supplies the text of a data cell.
///
/// Implementations may fail per cell. A failure marks the whole row as
/// errored without stopping the rest of the flush.
pub trait CellSource {
    /// Text for `column` of `node`.
    fn cell_text(&self, node: &Node, column: &ColumnDef) -> Result<String, RenderError>;
}

/// Reads cell values from the node's data map by column id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCellSource;

impl CellSource for DataCellSource {
    fn cell_text(&self, node: &Node, column: &ColumnDef) -> Result<String, RenderError> {
        Ok(node
            .data()
            .get(&column.id)
            .map(value_text)
            .unwrap_or_default())
    }
}

/// Display text for a JSON value.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => if *b { "✓" } else { "✗" }.to_string(),
        other => other.to_string(),
    }
}

impl<F> CellSource for F
where
    F: Fn(&Node, &ColumnDef) -> Result<String, RenderError>,
{
    fn cell_text(&self, node: &Node, column: &ColumnDef) -> Result<String, RenderError> {
        self(node, column)
    }
}
