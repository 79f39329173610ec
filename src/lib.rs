//! treegrid
//!
//! A virtualized tree grid: a hierarchical list of nodes shown as rows
//! with optional data columns, of which only the rows near the scrolled
//! window are materialized.
//!
//! - [`model`] holds the node tree and node type definitions.
//! - [`layout`] resolves column widths and title cell regions.
//! - [`render`] coalesces change requests and materializes viewport rows.
//! - [`nav`] is the row/cell/edit navigation state machine.
//! - [`input`] maps keys to commands and filters keys inside editors.
//! - [`grid`] ties these together behind [`grid::TreeGrid`].
//! - [`view`] is the ratatui demo shell (impure).

pub mod config;
pub mod grid;
pub mod input;
pub mod layout;
pub mod logging;
pub mod model;
pub mod nav;
pub mod render;
pub mod view;
