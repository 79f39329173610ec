//! Node type registry.
//!
//! A type definition maps a node type name to presentation options. Options
//! are either fixed or computed from the node, and are resolved once per
//! row render into a plain [`ResolvedNodeType`].

use super::node::Node;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Boolean option that may depend on the node.
#[derive(Clone, Copy)]
pub enum BoolOption {
    /// Same value for every node of the type.
    Fixed(bool),
    /// Computed per node.
    Resolver(fn(&Node) -> bool),
}

impl BoolOption {
    /// Evaluate the option for a node.
    pub fn resolve(&self, node: &Node) -> bool {
        match self {
            Self::Fixed(value) => *value,
            Self::Resolver(f) => f(node),
        }
    }
}

impl Default for BoolOption {
    fn default() -> Self {
        Self::Fixed(false)
    }
}

impl From<bool> for BoolOption {
    fn from(value: bool) -> Self {
        Self::Fixed(value)
    }
}

impl fmt::Debug for BoolOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Kind of embedded input control in an editable cell.
///
/// The kind decides which keys the input keeps and which ones go back to
/// grid navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    /// Single-line text.
    Text,
    /// Numeric spinner.
    Number,
    /// Checkbox.
    Checkbox,
    /// Hyperlink.
    Link,
    /// Radio button group.
    Radiobutton,
    /// Drop-down with one value.
    SelectOne,
    /// List with several values.
    SelectMultiple,
}

/// Presentation options for one node type.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeDefinition {
    /// Icon name, overriding the default folder/document icon.
    pub icon: Option<String>,
    /// Extra row classes.
    pub classes: Vec<String>,
    /// Title spans the full row width and data cells are skipped.
    pub colspan: BoolOption,
    /// Checkbox visibility, overriding the grid default.
    pub checkbox: Option<BoolOption>,
    /// Editable columns by column id.
    pub editable: HashMap<String, InputKind>,
}

impl NodeTypeDefinition {
    /// Set the icon name.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the colspan option.
    pub fn with_colspan(mut self, colspan: impl Into<BoolOption>) -> Self {
        self.colspan = colspan.into();
        self
    }

    /// Set the checkbox option.
    pub fn with_checkbox(mut self, checkbox: impl Into<BoolOption>) -> Self {
        self.checkbox = Some(checkbox.into());
        self
    }

    /// Add a row class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Make a column editable with the given input kind.
    pub fn with_editable(mut self, column: impl Into<String>, kind: InputKind) -> Self {
        self.editable.insert(column.into(), kind);
        self
    }
}

/// Options for one node after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedNodeType {
    /// Icon name, if the type overrides it.
    pub icon: Option<String>,
    /// Extra row classes.
    pub classes: Vec<String>,
    /// Whether the title spans the full row.
    pub colspan: bool,
    /// Whether a checkbox is drawn.
    pub checkbox: bool,
}

/// Registry of node type definitions keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeRegistry {
    types: HashMap<String, NodeTypeDefinition>,
}

impl NodeTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a type.
    pub fn register(&mut self, name: impl Into<String>, definition: NodeTypeDefinition) {
        self.types.insert(name.into(), definition);
    }

    /// Look up a type definition by name.
    pub fn get(&self, name: &str) -> Option<&NodeTypeDefinition> {
        self.types.get(name)
    }

    /// Definition for a node's type, if it has a registered one.
    pub fn definition_for(&self, node: &Node) -> Option<&NodeTypeDefinition> {
        node.node_type().and_then(|name| self.types.get(name))
    }

    /// Resolve presentation options for a node.
    ///
    /// `default_checkbox` applies when the type does not decide.
    pub fn resolve(&self, node: &Node, default_checkbox: bool) -> ResolvedNodeType {
        let Some(def) = self.definition_for(node) else {
            return ResolvedNodeType {
                checkbox: default_checkbox,
                ..ResolvedNodeType::default()
            };
        };
        ResolvedNodeType {
            icon: def.icon.clone(),
            classes: def.classes.clone(),
            colspan: def.colspan.resolve(node),
            checkbox: def
                .checkbox
                .map_or(default_checkbox, |option| option.resolve(node)),
        }
    }

    /// Input kind for a node's cell, if that column is editable.
    pub fn editable_input(&self, node: &Node, column_id: &str) -> Option<InputKind> {
        self.definition_for(node)
            .and_then(|def| def.editable.get(column_id).copied())
    }
}
