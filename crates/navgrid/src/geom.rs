use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        Vec2 {
            x: other.x - self.x,
            y: other.y - self.y,
        }
        .length()
    }
}

/// Discrete grid coordinate.
///
/// Signed so that conversions from screen space can represent cells left of
/// or above the map until [`crate::clamp_to_grid`] folds them back in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub column: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    pub fn offset(self, d_column: i32, d_row: i32) -> Self {
        Self {
            column: self.column.saturating_add(d_column),
            row: self.row.saturating_add(d_row),
        }
    }

    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.column
            .abs_diff(other.column)
            .saturating_add(self.row.abs_diff(other.row))
    }

    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// True when `other` is exactly one orthogonal step away.
    pub fn is_orthogonally_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from((column, row): (i32, i32)) -> Self {
        Self { column, row }
    }
}
