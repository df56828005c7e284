mod frame;

use serde::{Deserialize, Serialize};

use crate::camera::{CameraTransform, CellRect, CoordinateTransformer, Viewport};
use crate::geom::Cell;
use crate::grid::WalkabilityGrid;

pub use frame::RgbaFrame;

pub const GRID_LINE_COLOR: [u8; 4] = [128, 128, 128, 255];
pub const BLOCKED_TINT_COLOR: [u8; 4] = [90, 62, 40, 110];
pub const VALID_MOVE_COLOR: [u8; 4] = [0, 255, 0, 100];
pub const PATH_COLOR: [u8; 4] = [255, 196, 0, 120];
pub const PATH_END_COLOR: [u8; 4] = [255, 120, 0, 170];
pub const CURSOR_COLOR: [u8; 4] = [0, 0, 255, 255];
const CURSOR_OUTLINE_PX: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub show_grid: bool,
    pub show_blocked: bool,
    /// Chebyshev radius in cells around the focus cell; `None` draws every
    /// visible cell.
    pub visible_radius: Option<u32>,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_blocked: true,
            visible_radius: None,
        }
    }
}

/// Per-frame inputs for the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayScene<'a> {
    pub path: &'a [Cell],
    pub cursor: Option<Cell>,
    pub valid_moves: &'a [Cell],
    pub focus: Option<Cell>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridOverlayRenderer {
    options: OverlayOptions,
}

impl GridOverlayRenderer {
    pub fn new(options: OverlayOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> OverlayOptions {
        self.options
    }

    /// Draws blocked tint, valid moves, path, grid lines and the cursor, in
    /// that order, onto `frame` using the given camera.
    pub fn draw(
        &self,
        frame: &mut RgbaFrame,
        grid: &WalkabilityGrid,
        transformer: &CoordinateTransformer,
        camera: CameraTransform,
        scene: &OverlayScene<'_>,
    ) {
        let viewport = Viewport {
            width: frame.width(),
            height: frame.height(),
        };
        let Some(visible) = transformer.visible_cells(camera, viewport) else {
            return;
        };
        let shown = |cell: Cell| visible.contains(cell) && self.within_radius(scene.focus, cell);

        if self.options.show_blocked {
            for cell in visible.cells().filter(|cell| shown(*cell)) {
                if grid.is_blocked(cell) {
                    let (l, t, r, b) = cell_screen_rect(transformer, camera, cell);
                    frame.fill_rect_blended(l, t, r, b, BLOCKED_TINT_COLOR);
                }
            }
        }

        for cell in scene.valid_moves.iter().copied().filter(|cell| shown(*cell)) {
            let (l, t, r, b) = cell_screen_rect(transformer, camera, cell);
            frame.fill_rect_blended(l, t, r, b, VALID_MOVE_COLOR);
        }

        let last_index = scene.path.len().saturating_sub(1);
        for (index, cell) in scene.path.iter().copied().enumerate() {
            if !shown(cell) {
                continue;
            }
            let color = if index == last_index {
                PATH_END_COLOR
            } else {
                PATH_COLOR
            };
            let (l, t, r, b) = cell_screen_rect(transformer, camera, cell);
            frame.fill_rect_blended(l, t, r, b, color);
        }

        if self.options.show_grid {
            draw_grid_lines(frame, transformer, camera, visible, |cell| {
                self.within_radius(scene.focus, cell)
            });
        }

        if let Some(cursor) = scene.cursor.filter(|cell| shown(*cell)) {
            let (l, t, r, b) = cell_screen_rect(transformer, camera, cursor);
            frame.draw_rect_outline(l, t, r - 1, b - 1, CURSOR_OUTLINE_PX, CURSOR_COLOR);
        }
    }

    fn within_radius(&self, focus: Option<Cell>, cell: Cell) -> bool {
        match (self.options.visible_radius, focus) {
            (Some(radius), Some(focus)) => focus.chebyshev_distance(cell) <= radius,
            _ => true,
        }
    }
}

fn draw_grid_lines<F>(
    frame: &mut RgbaFrame,
    transformer: &CoordinateTransformer,
    camera: CameraTransform,
    visible: CellRect,
    shown: F,
) where
    F: Fn(Cell) -> bool,
{
    for cell in visible.cells().filter(|cell| shown(*cell)) {
        let (l, t, r, b) = cell_screen_rect(transformer, camera, cell);
        frame.draw_rect_outline(l, t, r - 1, b - 1, 1, GRID_LINE_COLOR);
    }
}

/// Half-open pixel rectangle `[left, right) x [top, bottom)` of a cell.
fn cell_screen_rect(
    transformer: &CoordinateTransformer,
    camera: CameraTransform,
    cell: Cell,
) -> (i32, i32, i32, i32) {
    let top_left = transformer.cell_to_screen(cell, camera);
    let bottom_right = transformer.cell_to_screen(cell.offset(1, 1), camera);
    (
        snap_px(top_left.x),
        snap_px(top_left.y),
        snap_px(bottom_right.x),
        snap_px(bottom_right.y),
    )
}

fn snap_px(value: f32) -> i32 {
    value.floor() as i32
}
