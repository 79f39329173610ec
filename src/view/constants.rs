//! Layout and timing constants for the demo TUI.

use std::time::Duration;

/// Height of the column header in lines.
pub const HEADER_HEIGHT: u16 = 1;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Event poll timeout, one display refresh.
///
/// Each timeout runs one [`TreeGrid::on_tick`](crate::grid::TreeGrid::on_tick).
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Simulated latency of a lazy load.
pub const LAZY_LOAD_DELAY: Duration = Duration::from_millis(400);

/// Rows moved per mouse wheel notch.
pub const WHEEL_ROWS: i64 = 3;

/// Width used when the terminal reports zero columns.
pub const FALLBACK_WIDTH: u16 = 80;
