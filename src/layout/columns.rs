//! Column width resolution.
//!
//! Columns declare either an absolute width (`"120px"`) or a relative
//! weight (`2`, `"2"`, `"*"`). Absolute columns are placed first; the
//! remaining container width is split between weighted columns in
//! proportion to their weights, honoring each column's minimum. The
//! resolved widths always sum to the container width.

use crate::model::LayoutError;
use serde::Deserialize;
use std::collections::HashSet;

/// Minimum column width when none is declared.
pub const DEFAULT_MIN_WIDTH: u32 = 4;

/// Identifier of the title column.
pub const TITLE_COLUMN_ID: &str = "*";

/// Raw width value as written in a column declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    /// Bare number.
    Number(f64),
    /// Text such as `"120px"`, `"2"` or `"*"`.
    Text(String),
}

impl From<f64> for SizeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SizeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl std::fmt::Display for SizeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// Column declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Unique column id. `"*"` marks the title column.
    pub id: String,
    /// Header text.
    #[serde(default)]
    pub title: String,
    /// Declared width. Defaults to a weight of 1.
    #[serde(default)]
    pub width: Option<SizeValue>,
    /// Declared minimum width. Defaults to [`DEFAULT_MIN_WIDTH`].
    #[serde(default)]
    pub min_width: Option<SizeValue>,
    /// Extra cell classes.
    #[serde(default)]
    pub classes: Option<String>,
}

impl ColumnDef {
    /// Create a weight-1 column.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            width: None,
            min_width: None,
            classes: None,
        }
    }

    /// The default title column.
    pub fn title_column(title: impl Into<String>) -> Self {
        Self::new(TITLE_COLUMN_ID, title)
    }

    /// Set the declared width.
    pub fn with_width(mut self, width: impl Into<SizeValue>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set the declared minimum width.
    pub fn with_min_width(mut self, min_width: impl Into<SizeValue>) -> Self {
        self.min_width = Some(min_width.into());
        self
    }

    /// Whether this is the title column.
    pub fn is_title(&self) -> bool {
        self.id == TITLE_COLUMN_ID
    }
}

/// Parsed width of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Absolute width in cells.
    Fixed(u32),
    /// Share of the remaining width.
    Weight(f64),
}

/// Parsed declaration used by the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    /// Declared width.
    pub width: ColumnWidth,
    /// Minimum width.
    pub min_width: u32,
}

/// Resolved geometry of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Column id.
    pub id: String,
    /// Width in cells.
    pub width: u32,
    /// Left edge relative to the container.
    pub offset: u32,
    /// Fraction of the total weight, `0.0` for absolute columns.
    pub share: f64,
}

/// Resolved geometry of all columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnGeometry {
    columns: Vec<ColumnLayout>,
    container_width: u32,
}

impl ColumnGeometry {
    /// Per-column geometry in declaration order.
    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    /// Geometry of one column.
    pub fn get(&self, index: usize) -> Option<&ColumnLayout> {
        self.columns.get(index)
    }

    /// Container width the geometry was resolved against.
    pub fn container_width(&self) -> u32 {
        self.container_width
    }

    /// Sum of resolved widths.
    pub fn total_width(&self) -> u32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Whether nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column under a horizontal position.
    pub fn column_at(&self, x: u32) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| x >= c.offset && x < c.offset + c.width)
    }
}

/// Parse a width declaration.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidWidth`] for non-positive weights and
/// unparseable text.
pub fn parse_width(column: &str, value: Option<&SizeValue>) -> Result<ColumnWidth, LayoutError> {
    let invalid = || LayoutError::InvalidWidth {
        column: column.to_string(),
        value: value.map(ToString::to_string).unwrap_or_default(),
    };
    let weight = |w: f64| {
        if w.is_finite() && w > 0.0 {
            Ok(ColumnWidth::Weight(w))
        } else {
            Err(invalid())
        }
    };
    match value {
        None => Ok(ColumnWidth::Weight(1.0)),
        Some(SizeValue::Number(n)) => weight(*n),
        Some(SizeValue::Text(text)) => {
            let text = text.trim();
            if text == "*" {
                Ok(ColumnWidth::Weight(1.0))
            } else if let Some(px) = text.strip_suffix("px") {
                px.trim()
                    .parse::<u32>()
                    .map(ColumnWidth::Fixed)
                    .map_err(|_| invalid())
            } else {
                text.parse::<f64>().map_err(|_| invalid()).and_then(weight)
            }
        }
    }
}

/// Parse a minimum width declaration.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidMinWidth`] for negative or unparseable values.
pub fn parse_min_width(column: &str, value: Option<&SizeValue>) -> Result<u32, LayoutError> {
    let invalid = || LayoutError::InvalidMinWidth {
        column: column.to_string(),
        value: value.map(ToString::to_string).unwrap_or_default(),
    };
    match value {
        None => Ok(DEFAULT_MIN_WIDTH),
        Some(SizeValue::Number(n)) if n.is_finite() && *n >= 0.0 => Ok(n.round() as u32),
        Some(SizeValue::Number(_)) => Err(invalid()),
        Some(SizeValue::Text(text)) => {
            let text = text.trim();
            text.strip_suffix("px")
                .unwrap_or(text)
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid())
        }
    }
}

/// Validate declarations and parse their sizes.
///
/// # Errors
///
/// - [`LayoutError::NoColumns`] for an empty list
/// - [`LayoutError::DuplicateColumnId`] for repeated ids
/// - [`LayoutError::MisplacedTitleColumn`] if `"*"` is not first
/// - width parsing errors from [`parse_width`] and [`parse_min_width`]
pub fn validate_columns(columns: &[ColumnDef]) -> Result<Vec<ColumnSpec>, LayoutError> {
    if columns.is_empty() {
        return Err(LayoutError::NoColumns);
    }
    let mut ids = HashSet::new();
    let mut specs = Vec::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        if !ids.insert(column.id.as_str()) {
            return Err(LayoutError::DuplicateColumnId {
                id: column.id.clone(),
            });
        }
        if column.is_title() && index != 0 {
            return Err(LayoutError::MisplacedTitleColumn { index });
        }
        specs.push(ColumnSpec {
            width: parse_width(&column.id, column.width.as_ref())?,
            min_width: parse_min_width(&column.id, column.min_width.as_ref())?,
        });
    }
    Ok(specs)
}

/// Resolve column geometry for a container width.
///
/// # Errors
///
/// Returns the validation errors of [`validate_columns`], and
/// [`LayoutError::UnresolvableWidth`] for a zero-width container.
pub fn resolve_columns(
    columns: &[ColumnDef],
    container_width: u32,
) -> Result<ColumnGeometry, LayoutError> {
    let specs = validate_columns(columns)?;
    let widths = resolve_widths(&specs, container_width)?;
    let weight_total: f64 = specs
        .iter()
        .filter_map(|s| match s.width {
            ColumnWidth::Weight(w) => Some(w),
            ColumnWidth::Fixed(_) => None,
        })
        .sum();

    let mut offset = 0;
    let layouts = columns
        .iter()
        .zip(specs.iter())
        .zip(widths)
        .map(|((column, spec), width)| {
            let share = match spec.width {
                ColumnWidth::Weight(w) if weight_total > 0.0 => w / weight_total,
                _ => 0.0,
            };
            let layout = ColumnLayout {
                id: column.id.clone(),
                width,
                offset,
                share,
            };
            offset += width;
            layout
        })
        .collect();

    Ok(ColumnGeometry {
        columns: layouts,
        container_width,
    })
}

/// Resolve parsed specs into integer widths summing to `container_width`.
///
/// # Errors
///
/// Returns [`LayoutError::UnresolvableWidth`] for a zero-width container.
pub fn resolve_widths(specs: &[ColumnSpec], container_width: u32) -> Result<Vec<u32>, LayoutError> {
    if container_width == 0 {
        return Err(LayoutError::UnresolvableWidth);
    }
    if specs.is_empty() {
        return Err(LayoutError::NoColumns);
    }
    let total = f64::from(container_width);
    let mut widths = vec![0.0; specs.len()];

    let mut fixed_sum = 0.0;
    for (width, spec) in widths.iter_mut().zip(specs) {
        if let ColumnWidth::Fixed(px) = spec.width {
            *width = f64::from(px.max(spec.min_width));
            fixed_sum += *width;
        }
    }

    distribute_flexible(specs, (total - fixed_sum).max(0.0), &mut widths);

    if widths.iter().sum::<f64>() > total {
        shrink_to_fit(specs, total, &mut widths);
    }

    Ok(integerize(specs, &widths, container_width))
}

/// Split `remaining` between weighted columns.
///
/// Columns whose share falls below their minimum are frozen at the
/// minimum and the rest is redistributed. Each pass freezes at least one
/// column or terminates, so the loop is bounded by the column count.
fn distribute_flexible(specs: &[ColumnSpec], remaining: f64, widths: &mut [f64]) {
    let flexible: Vec<(usize, f64)> = specs
        .iter()
        .enumerate()
        .filter_map(|(i, s)| match s.width {
            ColumnWidth::Weight(w) => Some((i, w)),
            ColumnWidth::Fixed(_) => None,
        })
        .collect();
    let mut frozen = vec![false; specs.len()];

    for _ in 0..=flexible.len() {
        let frozen_sum: f64 = flexible
            .iter()
            .filter(|(i, _)| frozen[*i])
            .map(|(i, _)| f64::from(specs[*i].min_width))
            .sum();
        let open: Vec<(usize, f64)> = flexible
            .iter()
            .copied()
            .filter(|(i, _)| !frozen[*i])
            .collect();
        let weight_sum: f64 = open.iter().map(|(_, w)| w).sum();
        if weight_sum <= 0.0 {
            break;
        }
        let available = (remaining - frozen_sum).max(0.0);

        let mut froze_any = false;
        for (i, weight) in open {
            let share = available * weight / weight_sum;
            let min = f64::from(specs[i].min_width);
            if share < min {
                frozen[i] = true;
                widths[i] = min;
                froze_any = true;
            } else {
                widths[i] = share;
            }
        }
        if !froze_any {
            break;
        }
    }
}

/// Remove the excess over `total` from columns in proportion to their
/// slack above the minimum. When the minimums alone exceed the container,
/// widths are scaled down from the minimums instead.
fn shrink_to_fit(specs: &[ColumnSpec], total: f64, widths: &mut [f64]) {
    let excess = widths.iter().sum::<f64>() - total;
    let slack: Vec<f64> = widths
        .iter()
        .zip(specs)
        .map(|(w, s)| (w - f64::from(s.min_width)).max(0.0))
        .collect();
    let slack_sum: f64 = slack.iter().sum();

    if slack_sum > 0.0 && slack_sum >= excess {
        for (width, s) in widths.iter_mut().zip(&slack) {
            *width -= excess * s / slack_sum;
        }
        return;
    }

    let min_sum: f64 = specs.iter().map(|s| f64::from(s.min_width)).sum();
    let count = widths.len() as f64;
    for (width, spec) in widths.iter_mut().zip(specs) {
        *width = if min_sum > 0.0 {
            f64::from(spec.min_width) * total / min_sum
        } else {
            total / count
        };
    }
}

/// Floor every width and give the remainder to the last column.
fn integerize(specs: &[ColumnSpec], widths: &[f64], container_width: u32) -> Vec<u32> {
    const EPSILON: f64 = 1e-6;
    let mut result: Vec<u32> = widths
        .iter()
        .map(|w| (w + EPSILON).floor().max(0.0) as u32)
        .collect();
    let sum: u64 = result.iter().map(|w| u64::from(*w)).sum();
    let target = u64::from(container_width);

    if sum <= target {
        if let Some(last) = result.last_mut() {
            *last += (target - sum) as u32;
        }
        return result;
    }

    // Rounding overshoot: take it back from the rightmost columns,
    // preferring those above their minimum.
    let mut over = sum - target;
    for respect_min in [true, false] {
        for (width, spec) in result.iter_mut().zip(specs).rev() {
            if over == 0 {
                break;
            }
            let floor = if respect_min { spec.min_width } else { 0 };
            let take = u64::from(width.saturating_sub(floor)).min(over);
            *width -= take as u32;
            over -= take;
        }
    }
    result
}

#[cfg(test)]
#[path = "columns_tests.rs"]
mod tests;
