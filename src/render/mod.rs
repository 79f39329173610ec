//! Change scheduling and viewport rendering.

pub mod cell;
pub mod row;
pub mod scheduler;
pub mod viewport;

pub use cell::{CellSource, DataCellSource};
pub use row::{
    CellElement, ElementId, Expander, HeaderCell, HeaderElement, RenderContext, RowClasses,
    RowElement, RowUpdates,
};
pub use scheduler::{ChangeKind, ChangeScheduler, ChangeScope, FlushPlan, SchedulerStats};
pub use viewport::{
    compute_row_range, FlushReport, PoolStats, RowRange, Viewport, ViewportConfig,
    DEFAULT_PREFETCH_ROWS, DEFAULT_ROW_HEIGHT,
};
