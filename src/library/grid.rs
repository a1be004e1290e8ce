// Fixed-column thumbnail grid geometry.

use std::collections::BTreeSet;

use super::traits::LayoutGeometry;
use crate::geometry::rect::{Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub item_size: Size,
    /// Gap between neighbouring cells, both horizontally and vertically.
    pub spacing: f64,
    pub item_count: usize,
}

impl GridLayout {
    pub fn new(columns: usize, item_size: Size, spacing: f64, item_count: usize) -> Self {
        Self {
            columns: columns.max(1),
            item_size,
            spacing,
            item_count,
        }
    }

    /// Square cells that fill `width` with `columns` cells and `spacing` between them.
    pub fn fitting_width(width: f64, columns: usize, spacing: f64, item_count: usize) -> Self {
        let columns = columns.max(1);
        let side = (width - spacing * (columns - 1) as f64) / columns as f64;
        Self::new(columns, Size::new(side, side), spacing, item_count)
    }

    fn row_pitch(&self) -> f64 {
        self.item_size.height + self.spacing
    }

    fn column_pitch(&self) -> f64 {
        self.item_size.width + self.spacing
    }

    pub fn row_count(&self) -> usize {
        (self.item_count + self.columns - 1) / self.columns
    }

    pub fn content_size(&self) -> Size {
        let rows = self.row_count();
        let height = if rows == 0 {
            0.0
        } else {
            rows as f64 * self.row_pitch() - self.spacing
        };
        Size::new(
            self.columns as f64 * self.column_pitch() - self.spacing,
            height,
        )
    }

    pub fn frame_for_index(&self, index: usize) -> Rect {
        let row = index / self.columns;
        let column = index % self.columns;
        Rect::new(
            column as f64 * self.column_pitch(),
            row as f64 * self.row_pitch(),
            self.item_size.width,
            self.item_size.height,
        )
    }
}

impl LayoutGeometry for GridLayout {
    fn indices_for_rect(&self, rect: Rect) -> BTreeSet<usize> {
        let mut indices = BTreeSet::new();
        let rows = self.row_count();
        if rect.is_empty() || rows == 0 || self.row_pitch() <= 0.0 {
            return indices;
        }

        let first_row = (rect.min_y() / self.row_pitch()).floor().max(0.0) as usize;
        let last_row = ((rect.max_y() / self.row_pitch()).floor().max(0.0) as usize).min(rows - 1);
        if first_row > last_row {
            return indices;
        }

        for row in first_row..=last_row {
            for column in 0..self.columns {
                let index = row * self.columns + column;
                if index >= self.item_count {
                    break;
                }
                if self.frame_for_index(index).intersects(&rect) {
                    indices.insert(index);
                }
            }
        }
        indices
    }
}
