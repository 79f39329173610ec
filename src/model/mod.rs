//! Domain model types.
//!
//! The node tree, node type definitions, navigation actions and errors.

pub mod action;
pub mod error;
pub mod node;
pub mod node_type;
pub mod tree;

pub use action::Action;
pub use error::{AppError, LayoutError, LoadError, RenderError, TreeError};
pub use node::{Node, NodeId, NodeSpec, NodeStatus, Selection};
pub use node_type::{BoolOption, InputKind, NodeTypeDefinition, NodeTypeRegistry, ResolvedNodeType};
pub use tree::Tree;

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
