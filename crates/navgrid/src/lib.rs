//! Tile-grid navigation for a top-down sea chart: walkability derived from
//! named map layers, cached A* routes, screen/world/grid transforms under a
//! zoomable camera, path following, and a software debug overlay.

mod camera;
mod geom;
mod grid;
mod movement;
mod overlay;
mod path;

pub use camera::{
    clamp_to_grid, grid_to_screen, grid_to_world, screen_to_world, world_to_grid,
    world_to_screen, CameraTransform, CellRect, CoordinateTransformer, Viewport, ZoomLimits,
    CAMERA_SCALE_DEFAULT,
};
pub use geom::{Cell, Vec2};
pub use grid::{
    GridError, LayerRule, LayerRules, MovementModel, TileLayer, WalkabilityGrid, ISLANDS_LAYER,
    SEA_LAYER, SHALLOW_SEA_LAYER,
};
pub use movement::{GridEntity, MovementController, MovementState, MovementStep};
pub use overlay::{
    GridOverlayRenderer, OverlayOptions, OverlayScene, RgbaFrame, BLOCKED_TINT_COLOR, CURSOR_COLOR,
    GRID_LINE_COLOR, PATH_COLOR, PATH_END_COLOR, VALID_MOVE_COLOR,
};
pub use path::{CachedPath, PathCacheStats, PathFinder, PathRequest};
