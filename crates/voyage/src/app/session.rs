use std::sync::Arc;

use navgrid::{
    CameraTransform, Cell, CoordinateTransformer, GridEntity, GridOverlayRenderer,
    MovementController, MovementState, MovementStep, OverlayScene, PathCacheStats, PathFinder,
    RgbaFrame, Vec2, Viewport, WalkabilityGrid, ZoomLimits,
};
use tracing::{debug, info, warn};

use super::config::VoyageConfig;
use super::tmx::MapLayers;

const SEA_BACKGROUND: [u8; 4] = [18, 52, 86, 255];

/// One ship on one chart: pointer input in, movement and overlay out.
pub(crate) struct Session {
    pathfinder: PathFinder,
    transformer: CoordinateTransformer,
    camera: CameraTransform,
    zoom_limits: ZoomLimits,
    viewport: Viewport,
    overlay: GridOverlayRenderer,
    ship: GridEntity,
    movement: MovementController,
    hover: Option<Cell>,
    hover_path: Vec<Cell>,
    arrivals: u32,
}

impl Session {
    pub(crate) fn new(map: &MapLayers, config: &VoyageConfig) -> Self {
        let grid = Arc::new(WalkabilityGrid::from_layers(
            map.width,
            map.height,
            &map.layers,
            &config.layer_rules,
        ));

        let tile_size = map.tile_width as f32;
        if tile_size != config.tile_size {
            warn!(
                configured = config.tile_size,
                map = tile_size,
                "tile_size_taken_from_map"
            );
        }

        let start = config
            .start_cell
            .unwrap_or_else(|| first_walkable_cell(&grid));
        if grid.is_blocked(start) {
            warn!(cell = ?start, "ship_starts_on_blocked_cell");
        }

        let mut session = Self {
            transformer: CoordinateTransformer::new(tile_size, grid.width(), grid.height()),
            pathfinder: PathFinder::new(grid).with_movement_model(config.movement_model),
            camera: CameraTransform::new(Vec2::ZERO, config.camera.scale),
            zoom_limits: config.camera.zoom_limits(),
            viewport: config.viewport,
            overlay: GridOverlayRenderer::new(config.overlay),
            ship: GridEntity::at_cell(start, tile_size),
            movement: MovementController::new(config.ship_speed_px_per_second, tile_size),
            hover: None,
            hover_path: Vec::new(),
            arrivals: 0,
        };
        session.follow_ship();
        info!(
            width = session.transformer.width(),
            height = session.transformer.height(),
            start = ?start,
            movement_model = ?config.movement_model,
            "session_started"
        );
        session
    }

    /// Updates the hover cell and its preview route from the ship.
    pub(crate) fn pointer_moved(&mut self, screen: Vec2) {
        let cell = self.transformer.get_tile_coordinates(screen, self.camera);
        self.hover = Some(cell);
        self.hover_path = self.pathfinder.find_path(self.ship.cell, cell);
    }

    /// Sends the ship toward the clicked cell. Returns whether a route was
    /// accepted.
    pub(crate) fn click(&mut self, screen: Vec2) -> bool {
        let target = self.transformer.get_tile_coordinates(screen, self.camera);
        self.hover = Some(target);
        let path = self.pathfinder.find_path(self.ship.cell, target);
        if path.is_empty() {
            info!(from = ?self.ship.cell, to = ?target, "no_route");
            return false;
        }
        debug!(to = ?target, steps = path.len(), "route_accepted");
        self.movement.set_path(path);
        true
    }

    pub(crate) fn zoom(&mut self, steps: i32) {
        self.camera.apply_zoom_steps(steps, &self.zoom_limits);
        self.follow_ship();
    }

    pub(crate) fn tick(&mut self, delta_seconds: f32) -> MovementStep {
        let step = self.movement.advance(&mut self.ship, delta_seconds);
        match step {
            MovementStep::Reached(cell) => debug!(?cell, "cell_reached"),
            MovementStep::Arrived(cell) => {
                self.arrivals = self.arrivals.saturating_add(1);
                info!(?cell, "arrived");
            }
            MovementStep::Idle | MovementStep::Moving => {}
        }
        self.follow_ship();
        step
    }

    pub(crate) fn valid_moves(&self) -> Vec<Cell> {
        let finder = &self.pathfinder;
        finder
            .grid()
            .walkable_neighbors(self.ship.cell, finder.movement_model())
    }

    /// Clears `frame` to open water and draws the navigation overlay.
    pub(crate) fn render(&self, frame: &mut RgbaFrame) {
        frame.clear(SEA_BACKGROUND);
        let active: Vec<Cell> = self.movement.remaining().copied().collect();
        let path = if self.movement.state() == MovementState::Following {
            active.as_slice()
        } else {
            self.hover_path.as_slice()
        };
        let valid_moves = self.valid_moves();
        let scene = OverlayScene {
            path,
            cursor: self.hover,
            valid_moves: &valid_moves,
            focus: Some(self.ship.cell),
        };
        self.overlay.draw(
            frame,
            self.pathfinder.grid(),
            &self.transformer,
            self.camera,
            &scene,
        );
    }

    /// Screen position of a cell's centre under the current camera.
    pub(crate) fn cell_center_screen(&self, cell: Cell) -> Vec2 {
        navgrid::world_to_screen(self.transformer.cell_center_world(cell), self.camera)
    }

    pub(crate) fn ship(&self) -> GridEntity {
        self.ship
    }

    pub(crate) fn camera(&self) -> CameraTransform {
        self.camera
    }

    pub(crate) fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn hover_path(&self) -> &[Cell] {
        &self.hover_path
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.movement.state() == MovementState::Idle
    }

    pub(crate) fn arrivals(&self) -> u32 {
        self.arrivals
    }

    pub(crate) fn cache_stats(&self) -> PathCacheStats {
        self.pathfinder.cache_stats()
    }

    fn follow_ship(&mut self) {
        let half_tile = self.transformer.tile_size() * 0.5;
        let center = Vec2::new(self.ship.position.x + half_tile, self.ship.position.y + half_tile);
        self.camera.follow(center, self.viewport);
    }
}

fn first_walkable_cell(grid: &WalkabilityGrid) -> Cell {
    (0..grid.height() as i32)
        .flat_map(|row| (0..grid.width() as i32).map(move |column| Cell::new(column, row)))
        .find(|cell| grid.is_walkable(*cell))
        .unwrap_or_default()
}
