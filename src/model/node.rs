//! Node records and the per-node state they carry.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Position of a node inside its [`Tree`](super::tree::Tree) arena.
///
/// Ids are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a node id from a raw arena index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw arena index.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tri-state checkbox value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Not selected.
    #[default]
    Unchecked,
    /// Selected.
    Checked,
    /// Some but not all descendants are selected.
    Partial,
}

impl Selection {
    /// Value after a user toggle. Partial always becomes checked.
    pub fn toggled(self) -> Self {
        match self {
            Self::Checked => Self::Unchecked,
            Self::Unchecked | Self::Partial => Self::Checked,
        }
    }

    /// Whether the checkbox is fully checked.
    pub fn is_checked(self) -> bool {
        self == Self::Checked
    }

    /// Combine child values into the parent's value.
    ///
    /// Returns `None` for an empty iterator.
    pub fn aggregate(values: impl IntoIterator<Item = Selection>) -> Option<Self> {
        let mut result = None;
        for value in values {
            result = match (result, value) {
                (None, v) => Some(v),
                (Some(a), b) if a == b => Some(a),
                _ => return Some(Self::Partial),
            };
        }
        result
    }
}

/// Load and content status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStatus {
    /// Content is available.
    #[default]
    Ok,
    /// Children are being fetched.
    Loading,
    /// Last load failed.
    Error,
    /// Load succeeded but returned no children.
    NoData,
}

/// A node in the tree arena.
///
/// Structural fields are owned by the tree. Use [`Tree`](super::tree::Tree)
/// operations to change them so parent links stay consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) key: String,
    pub(crate) title: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) level: usize,
    pub(crate) expanded: bool,
    pub(crate) selected: Selection,
    pub(crate) status: NodeStatus,
    pub(crate) status_message: Option<String>,
    pub(crate) lazy: bool,
    pub(crate) hidden: bool,
    pub(crate) node_type: Option<String>,
    pub(crate) data: Map<String, Value>,
    pub(crate) load_generation: u64,
}

impl Node {
    /// Unique key within the tree.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parent node, `None` for top-level nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in display order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Depth below the top level (top-level nodes are 0).
    pub fn level(&self) -> usize {
        self.level
    }

    /// Whether children are shown.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Checkbox value.
    pub fn selection(&self) -> Selection {
        self.selected
    }

    /// Load status.
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// Message attached to an error status.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Whether children still have to be fetched.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Whether a filter currently hides the node.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Name of the node type used for registry lookups.
    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    /// Per-column data values.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Generation of the most recent lazy load request.
    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    /// Whether the node has loaded children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether expanding would show something: loaded children or a pending lazy load.
    pub fn is_expandable(&self) -> bool {
        self.has_children() || self.lazy
    }

    /// Neither children nor a pending lazy load.
    pub fn is_leaf(&self) -> bool {
        !self.is_expandable()
    }
}

/// Serialized description of a node and its subtree.
///
/// Unknown fields are collected into [`NodeSpec::data`] and become cell
/// values keyed by column id.
///
/// ```
/// use treegrid::model::NodeSpec;
///
/// let spec: NodeSpec = serde_json::from_str(
///     r#"{"title": "Invoices", "lazy": true, "size": 42}"#,
/// ).unwrap();
/// assert!(spec.lazy);
/// assert_eq!(spec.data["size"], 42);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Unique key. Generated when omitted.
    #[serde(default)]
    pub key: Option<String>,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Child specs.
    #[serde(default)]
    pub children: Vec<NodeSpec>,

    /// Start expanded.
    #[serde(default)]
    pub expanded: bool,

    /// Children are fetched on first expansion.
    #[serde(default)]
    pub lazy: bool,

    /// Node type name.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,

    /// Start with the checkbox checked.
    #[serde(default)]
    pub selected: bool,

    /// Remaining fields, used as cell values.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl NodeSpec {
    /// Create a spec with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set an explicit key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the child specs.
    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }

    /// Mark the node as lazily loaded.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Start the node expanded.
    pub fn expanded(mut self) -> Self {
        self.expanded = true;
        self
    }

    /// Set the node type name.
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Add a cell value.
    pub fn with_data(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(column.into(), value.into());
        self
    }
}
