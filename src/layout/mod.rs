//! Geometry: column widths and title cell parts.

pub mod columns;
pub mod regions;

pub use columns::{
    resolve_columns, validate_columns, ColumnDef, ColumnGeometry, ColumnLayout, ColumnWidth,
    SizeValue, DEFAULT_MIN_WIDTH, TITLE_COLUMN_ID,
};
pub use regions::{NodeRegion, TitleMetrics, TitleSpans};
