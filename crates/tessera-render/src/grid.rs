//! Row/column composition of badge fragments.
//!
//! Items fill the grid row-major (`index = row * cols + col`). Each column is as wide as its
//! widest item, every row is `row_height` tall, and a fixed gap separates neighbouring rows
//! and columns (none after the last one).

use crate::resize::{position, resize};
use std::fmt::Write as _;
use tessera_core::utils::fmt_length;
use tessera_core::{BadgeConfig, Error, GridSpec, Result, SVG_NAMESPACE, VectorFragment};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub row_height: f64,
    pub gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from_config(&BadgeConfig::default())
    }
}

impl LayoutOptions {
    pub fn from_config(config: &BadgeConfig) -> Self {
        Self {
            row_height: config.row_height,
            gap: config.gap,
        }
    }
}

/// Resolves the row and column counts for `items` and validates the resulting shape.
///
/// Unspecified counts are inferred (one row when neither is given). The grid must hold every
/// item and must be compact: exactly `ceil(items / cols)` rows. A single row never has more
/// columns than items, so trailing empty columns add no width.
pub fn resolve_shape(spec: &GridSpec, items: usize) -> Result<(usize, usize)> {
    if items == 0 {
        return Err(Error::NoFragments);
    }

    let rows = spec.rows.filter(|&r| r > 0);
    let cols = spec.cols.filter(|&c| c > 0);
    let (rows, cols) = match (rows, cols) {
        (None, None) => (1, items),
        (Some(rows), None) => (rows, items.div_ceil(rows)),
        (None, Some(cols)) => (items.div_ceil(cols), cols),
        (Some(rows), Some(cols)) => (rows, cols),
    };

    if rows.saturating_mul(cols) < items {
        return Err(Error::GridTooSmall { rows, cols, items });
    }
    let required_rows = items.div_ceil(cols);
    if rows != required_rows {
        return Err(Error::GridShapeInvalid {
            rows,
            cols,
            items,
            required_rows,
        });
    }
    Ok((rows, cols.min(items)))
}

/// Geometry of a composite, derived from the grid spec and the ordered cell widths.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayout {
    pub rows: usize,
    pub cols: usize,
    pub column_widths: Vec<f64>,
    pub column_offsets: Vec<f64>,
    pub row_offsets: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

impl CompositeLayout {
    pub fn compute(spec: &GridSpec, widths: &[f64], options: &LayoutOptions) -> Result<Self> {
        let (rows, cols) = resolve_shape(spec, widths.len())?;

        let mut column_widths = vec![0.0_f64; cols];
        for (index, &w) in widths.iter().enumerate() {
            let col = index % cols;
            column_widths[col] = column_widths[col].max(w);
        }

        let mut width = 0.0;
        let mut column_offsets = Vec::with_capacity(cols);
        for (j, &w) in column_widths.iter().enumerate() {
            column_offsets.push(width);
            width += w;
            if j + 1 < cols {
                width += options.gap;
            }
        }

        let mut height = 0.0;
        let mut row_offsets = Vec::with_capacity(rows);
        for i in 0..rows {
            row_offsets.push(height);
            height += options.row_height;
            if i + 1 < rows {
                height += options.gap;
            }
        }

        Ok(Self {
            rows,
            cols,
            column_widths,
            column_offsets,
            row_offsets,
            width,
            height,
        })
    }

    /// Top-left corner of the cell holding item `index`.
    pub fn cell_origin(&self, index: usize) -> Option<(f64, f64)> {
        let row = index / self.cols;
        let col = index % self.cols;
        Some((*self.column_offsets.get(col)?, *self.row_offsets.get(row)?))
    }
}

/// Target width of every cell at row height: square when `fit`, natural aspect otherwise.
pub fn cell_widths(fragments: &[VectorFragment], fit: bool, options: &LayoutOptions) -> Vec<f64> {
    fragments
        .iter()
        .map(|fragment| {
            if fit {
                options.row_height
            } else {
                fragment.width_at_height(options.row_height)
            }
        })
        .collect()
}

/// Composes `fragments` into one SVG document. Nothing is emitted unless every fragment can
/// be placed.
pub fn layout(
    fragments: &[VectorFragment],
    spec: &GridSpec,
    options: &LayoutOptions,
) -> Result<String> {
    let widths = cell_widths(fragments, spec.fit, options);
    let grid = CompositeLayout::compute(spec, &widths, options)?;
    tracing::debug!(
        items = fragments.len(),
        rows = grid.rows,
        cols = grid.cols,
        width = grid.width,
        height = grid.height,
        "resolved badge grid"
    );

    let mut cells = Vec::with_capacity(fragments.len());
    for (index, (fragment, &w)) in fragments.iter().zip(&widths).enumerate() {
        let Some((x, y)) = grid.cell_origin(index) else {
            return Err(Error::GridTooSmall {
                rows: grid.rows,
                cols: grid.cols,
                items: fragments.len(),
            });
        };
        let resized = resize(fragment.markup(), w, options.row_height)?;
        cells.push(position(&resized, x, y)?);
    }

    let w = fmt_length(grid.width);
    let h = fmt_length(grid.height);
    let mut out = String::with_capacity(cells.iter().map(String::len).sum::<usize>() + 128);
    let _ = writeln!(
        out,
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    for cell in &cells {
        out.push_str(cell.trim());
        out.push('\n');
    }
    out.push_str("</svg>\n");
    Ok(out)
}

/// Sizes a single badge for output at row height, keeping its natural aspect ratio.
pub fn render_single(fragment: &VectorFragment, options: &LayoutOptions) -> Result<String> {
    let width = fragment.width_at_height(options.row_height);
    resize(fragment.markup(), width, options.row_height)
}
