use crate::geom::{Cell, Vec2};

use super::{CameraTransform, Viewport};

/// Float error allowed when a tile corner is mapped to screen and back, in
/// units of `f32::EPSILON` at the operand's magnitude.
const GRID_SNAP_ULPS: f32 = 16.0;

pub fn screen_to_world(screen: Vec2, camera: CameraTransform) -> Vec2 {
    debug_assert!(camera.scale > 0.0, "camera scale must be positive");
    Vec2 {
        x: (screen.x - camera.offset.x) / camera.scale,
        y: (screen.y - camera.offset.y) / camera.scale,
    }
}

pub fn world_to_screen(world: Vec2, camera: CameraTransform) -> Vec2 {
    Vec2 {
        x: world.x * camera.scale + camera.offset.x,
        y: world.y * camera.scale + camera.offset.y,
    }
}

/// Floor division of each axis by `tile_size`, forgiving float error just
/// below a tile boundary. Non-finite input lands on the saturated `i32`
/// range and is expected to be clamped afterwards.
pub fn world_to_grid(world: Vec2, tile_size: f32) -> Cell {
    debug_assert!(tile_size > 0.0, "tile size must be positive");
    Cell {
        column: floor_to_i32(world.x / tile_size),
        row: floor_to_i32(world.y / tile_size),
    }
}

/// World position of the cell's top-left corner.
pub fn grid_to_world(cell: Cell, tile_size: f32) -> Vec2 {
    Vec2 {
        x: cell.column as f32 * tile_size,
        y: cell.row as f32 * tile_size,
    }
}

pub fn grid_to_screen(cell: Cell, tile_size: f32, camera: CameraTransform) -> Vec2 {
    world_to_screen(grid_to_world(cell, tile_size), camera)
}

/// Folds a cell into `[0, width-1] x [0, height-1]`. A zero-sized axis
/// clamps to 0, which the grid still treats as out of bounds.
pub fn clamp_to_grid(cell: Cell, width: u32, height: u32) -> Cell {
    Cell {
        column: clamp_axis(cell.column, width),
        row: clamp_axis(cell.row, height),
    }
}

fn clamp_axis(value: i32, len: u32) -> i32 {
    let max = i32::try_from(len).unwrap_or(i32::MAX).saturating_sub(1).max(0);
    value.clamp(0, max)
}

fn floor_to_i32(tiles: f32) -> i32 {
    if !tiles.is_finite() {
        // NaN becomes 0 and infinities saturate.
        return tiles as i32;
    }
    let tolerance = tiles.abs().max(1.0) * GRID_SNAP_ULPS * f32::EPSILON;
    (tiles + tolerance).floor() as i32
}

/// Inclusive cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub min: Cell,
    pub max: Cell,
}

impl CellRect {
    pub fn contains(&self, cell: Cell) -> bool {
        cell.column >= self.min.column
            && cell.column <= self.max.column
            && cell.row >= self.min.row
            && cell.row <= self.max.row
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.row..=self.max.row).flat_map(move |row| {
            (self.min.column..=self.max.column).map(move |column| Cell::new(column, row))
        })
    }
}

/// Grid geometry for converting pointer and camera positions into cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    tile_size: f32,
    width: u32,
    height: u32,
}

impl CoordinateTransformer {
    pub fn new(tile_size: f32, width: u32, height: u32) -> Self {
        debug_assert!(tile_size > 0.0, "tile size must be positive");
        Self {
            tile_size,
            width,
            height,
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pointer position to an in-bounds cell; the result is always a legal
    /// index for a non-empty grid.
    pub fn get_tile_coordinates(&self, mouse: Vec2, camera: CameraTransform) -> Cell {
        let world = screen_to_world(mouse, camera);
        clamp_to_grid(
            world_to_grid(world, self.tile_size),
            self.width,
            self.height,
        )
    }

    pub fn cell_center_world(&self, cell: Cell) -> Vec2 {
        let origin = grid_to_world(cell, self.tile_size);
        Vec2 {
            x: origin.x + self.tile_size * 0.5,
            y: origin.y + self.tile_size * 0.5,
        }
    }

    pub fn cell_to_screen(&self, cell: Cell, camera: CameraTransform) -> Vec2 {
        grid_to_screen(cell, self.tile_size, camera)
    }

    /// Cells at least partly covered by the viewport, clamped to the map.
    pub fn visible_cells(&self, camera: CameraTransform, viewport: Viewport) -> Option<CellRect> {
        if self.width == 0 || self.height == 0 || viewport.width == 0 || viewport.height == 0 {
            return None;
        }

        let top_left = screen_to_world(Vec2::ZERO, camera);
        let bottom_right = screen_to_world(
            Vec2::new(viewport.width as f32, viewport.height as f32),
            camera,
        );
        let raw_min = world_to_grid(top_left, self.tile_size);
        let raw_max = Cell {
            column: floor_to_i32((bottom_right.x / self.tile_size).ceil() - 1.0),
            row: floor_to_i32((bottom_right.y / self.tile_size).ceil() - 1.0),
        };

        let column_limit = self.width as i32 - 1;
        let row_limit = self.height as i32 - 1;
        let min = Cell::new(raw_min.column.max(0), raw_min.row.max(0));
        let max = Cell::new(
            raw_max.column.min(column_limit),
            raw_max.row.min(row_limit),
        );
        if min.column > max.column || min.row > max.row {
            return None;
        }
        Some(CellRect { min, max })
    }
}
