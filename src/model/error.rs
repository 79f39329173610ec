//! Error types for the tree grid.
//!
//! Errors are grouped by the layer that raises them and compose via `?`
//! and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the demo binary
//!   - [`LayoutError`] - Column declarations that cannot be resolved
//!   - [`TreeError`] - Structural problems in the node tree
//!   - [`ConfigError`](crate::config::ConfigError) - Configuration file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!   - `std::io::Error` - Terminal failures
//!
//! # Recovery Strategy
//!
//! [`RenderError`] and [`LoadError`] are **non-fatal**. A row whose content
//! fails to render is shown in error status and the flush continues. A lazy
//! load that fails puts its node in error status and collapses it.

use crate::model::node::NodeId;
use thiserror::Error;

/// Top-level error returned from the demo binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Column declarations could not be resolved.
    #[error("Column layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// Node data could not be assembled into a tree.
    #[error("Tree construction failed: {0}")]
    Tree(#[from] TreeError),

    /// Configuration file could not be loaded.
    #[error("Configuration failed: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Node data file could not be read or parsed.
    #[error("Failed to load node data from {path}: {reason}")]
    Data {
        /// Path of the data file.
        path: std::path::PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Column declarations that cannot be turned into geometry.
///
/// Raised at layout-resolution time, before any geometry is replaced. The
/// previously resolved geometry stays in effect.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// No columns were declared.
    #[error("At least one column is required")]
    NoColumns,

    /// Two columns share the same identifier.
    #[error("Duplicate column id {id:?}")]
    DuplicateColumnId {
        /// The repeated identifier.
        id: String,
    },

    /// The `*` title column is declared somewhere other than first.
    #[error("Title column \"*\" must be the first column, found at index {index}")]
    MisplacedTitleColumn {
        /// Position where the title column was found.
        index: usize,
    },

    /// Width declaration is neither a weight nor an absolute size.
    #[error("Invalid width {value:?} for column {column:?}")]
    InvalidWidth {
        /// Column identifier.
        column: String,
        /// The declared width.
        value: String,
    },

    /// Minimum width declaration is not an absolute size.
    #[error("Invalid minimum width {value:?} for column {column:?}")]
    InvalidMinWidth {
        /// Column identifier.
        column: String,
        /// The declared minimum.
        value: String,
    },

    /// Container width is zero, so no geometry exists.
    #[error("Cannot resolve columns against a container of width 0")]
    UnresolvableWidth,
}

/// Structural problems in the node tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Node key is already used elsewhere in the tree.
    #[error("Duplicate node key {key:?}")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// Node id does not belong to this tree.
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Column index is outside the declared columns.
    #[error("Column index {index} out of range (have {count} columns)")]
    ColumnOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of declared columns.
        count: usize,
    },
}

/// Content for one row could not be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to render column {column:?}: {reason}")]
pub struct RenderError {
    /// Column identifier.
    pub column: String,
    /// Reason for failure.
    pub reason: String,
}

impl RenderError {
    /// Create a render error for a column.
    pub fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// A lazy child load failed on the host side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LoadError {
    /// Message shown as the node's status tooltip.
    pub message: String,
}

impl LoadError {
    /// Create a load error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
