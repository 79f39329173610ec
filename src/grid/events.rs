//! Notifications queued by the grid for its host.

use crate::model::{NodeId, Selection};
use crate::nav::NavigationMode;
use crate::render::FlushReport;

/// Who triggered a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Keyboard or pointer input.
    User,
    /// A call from the host program.
    Api,
}

/// Something the host may want to react to.
///
/// Drained with [`TreeGrid::take_events`](super::TreeGrid::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Navigation mode changed.
    ModeChanged {
        /// Mode before the change.
        from: NavigationMode,
        /// Mode after the change.
        to: NavigationMode,
        /// Trigger.
        origin: Origin,
    },
    /// The active node changed.
    ActiveNodeChanged {
        /// New active node.
        node: Option<NodeId>,
        /// Previously active node.
        previous: Option<NodeId>,
        /// Whether the move activated the node or only moved the cursor.
        activated: bool,
        /// Trigger.
        origin: Origin,
    },
    /// The active column changed.
    ColumnChanged {
        /// Active node at the time.
        node: Option<NodeId>,
        /// New column index.
        column: usize,
        /// Trigger.
        origin: Origin,
    },
    /// A flush applied pending changes to the viewport.
    FlushCompleted {
        /// What was rendered.
        report: FlushReport,
        /// Applied synchronously rather than on a tick.
        immediate: bool,
        /// Trigger.
        origin: Origin,
    },
    /// A lazy node needs its children.
    ///
    /// Answer with [`TreeGrid::resolve_lazy_load`](super::TreeGrid::resolve_lazy_load).
    LoadRequested {
        /// Node to load.
        node: NodeId,
        /// Generation the answer must carry.
        generation: u64,
        /// Trigger.
        origin: Origin,
    },
    /// A node was expanded or collapsed.
    Expanded {
        /// Node.
        node: NodeId,
        /// New state.
        expanded: bool,
        /// Trigger.
        origin: Origin,
    },
    /// Checkbox values changed.
    SelectionChanged {
        /// Node the user or host toggled.
        node: NodeId,
        /// Its new value.
        selection: Selection,
        /// Every node whose value changed, including cascaded ones.
        changed: Vec<NodeId>,
        /// Trigger.
        origin: Origin,
    },
    /// An inline editor opened.
    EditStarted {
        /// Node.
        node: NodeId,
        /// Column.
        column: usize,
        /// Trigger.
        origin: Origin,
    },
    /// An inline edit was applied.
    EditCommitted {
        /// Node.
        node: NodeId,
        /// Column.
        column: usize,
        /// Value written.
        value: String,
        /// Trigger.
        origin: Origin,
    },
    /// An inline edit was discarded.
    EditCancelled {
        /// Node.
        node: NodeId,
        /// Column.
        column: usize,
        /// Trigger.
        origin: Origin,
    },
}
