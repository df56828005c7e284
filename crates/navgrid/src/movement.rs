use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::camera::grid_to_world;
use crate::geom::{Cell, Vec2};

/// Anything that sits on the grid: its discrete cell plus the continuous
/// world position (top-left corner of the tile it is drawn at).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntity {
    pub cell: Cell,
    pub position: Vec2,
}

impl GridEntity {
    pub fn at_cell(cell: Cell, tile_size: f32) -> Self {
        Self {
            cell,
            position: grid_to_world(cell, tile_size),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MovementState {
    #[default]
    Idle,
    Following,
}

/// Outcome of one [`MovementController::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementStep {
    Idle,
    Moving,
    Reached(Cell),
    Arrived(Cell),
}

/// Drains a path one cell at a time at a fixed speed.
///
/// When a tick's travel covers the remaining distance to the head cell the
/// entity snaps exactly onto that cell and the head is popped; leftover
/// travel is not carried into the next segment.
#[derive(Debug, Clone)]
pub struct MovementController {
    state: MovementState,
    path: VecDeque<Cell>,
    speed: f32,
    tile_size: f32,
}

impl MovementController {
    /// `speed` is in world pixels per second.
    pub fn new(speed: f32, tile_size: f32) -> Self {
        debug_assert!(tile_size > 0.0, "tile size must be positive");
        Self {
            state: MovementState::Idle,
            path: VecDeque::new(),
            speed,
            tile_size,
        }
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn remaining(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.path.iter()
    }

    pub fn destination(&self) -> Option<Cell> {
        self.path.back().copied()
    }

    /// Replaces any pending path. An empty path leaves the controller idle.
    pub fn set_path(&mut self, path: Vec<Cell>) {
        self.path = path.into();
        self.state = if self.path.is_empty() {
            MovementState::Idle
        } else {
            MovementState::Following
        };
        debug!(
            steps = self.path.len(),
            destination = ?self.destination(),
            state = ?self.state,
            "movement_path_set"
        );
    }

    pub fn cancel(&mut self) {
        self.path.clear();
        self.state = MovementState::Idle;
    }

    pub fn advance(&mut self, entity: &mut GridEntity, delta_seconds: f32) -> MovementStep {
        if self.state == MovementState::Idle {
            return MovementStep::Idle;
        }
        let Some(head) = self.path.front().copied() else {
            self.state = MovementState::Idle;
            return MovementStep::Idle;
        };

        let target = grid_to_world(head, self.tile_size);
        let dx = target.x - entity.position.x;
        let dy = target.y - entity.position.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let max_step = self.speed * delta_seconds.max(0.0);

        if max_step >= distance {
            entity.position = target;
            entity.cell = head;
            self.path.pop_front();
            trace!(cell = ?head, remaining = self.path.len(), "movement_cell_reached");
            if self.path.is_empty() {
                self.state = MovementState::Idle;
                return MovementStep::Arrived(head);
            }
            return MovementStep::Reached(head);
        }

        let inv_distance = distance.recip();
        entity.position = Vec2 {
            x: entity.position.x + dx * inv_distance * max_step,
            y: entity.position.y + dy * inv_distance * max_step,
        };
        MovementStep::Moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f32 = 64.0;

    fn approx_eq_vec2(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn idle_controller_does_not_move() {
        let mut controller = MovementController::new(200.0, TILE);
        let mut ship = GridEntity::at_cell(Cell::new(2, 2), TILE);
        let before = ship;
        assert_eq!(controller.advance(&mut ship, 1.0), MovementStep::Idle);
        assert_eq!(ship, before);
    }

    #[test]
    fn empty_path_stays_idle() {
        let mut controller = MovementController::new(200.0, TILE);
        controller.set_path(Vec::new());
        assert_eq!(controller.state(), MovementState::Idle);
    }

    #[test]
    fn partial_tick_advances_linearly_toward_head() {
        let mut controller = MovementController::new(32.0, TILE);
        let mut ship = GridEntity::at_cell(Cell::new(0, 0), TILE);
        controller.set_path(vec![Cell::new(1, 0)]);
        assert_eq!(controller.state(), MovementState::Following);

        assert_eq!(controller.advance(&mut ship, 0.5), MovementStep::Moving);
        assert!(approx_eq_vec2(ship.position, Vec2::new(16.0, 0.0)));
        assert_eq!(ship.cell, Cell::new(0, 0));
    }

    #[test]
    fn overshooting_tick_snaps_onto_the_cell() {
        let mut controller = MovementController::new(200.0, TILE);
        let mut ship = GridEntity {
            cell: Cell::new(0, 0),
            position: Vec2::new(60.0, 0.3),
        };
        controller.set_path(vec![Cell::new(1, 0), Cell::new(1, 1)]);
        assert_eq!(
            controller.advance(&mut ship, 0.1),
            MovementStep::Reached(Cell::new(1, 0))
        );
        assert_eq!(ship.position, Vec2::new(64.0, 0.0));
        assert_eq!(ship.cell, Cell::new(1, 0));
        assert_eq!(controller.remaining().len(), 1);
        assert_eq!(controller.state(), MovementState::Following);
    }

    #[test]
    fn draining_the_path_arrives_aligned_to_tile() {
        let path = vec![
            Cell::new(1, 0),
            Cell::new(2, 0),
            Cell::new(2, 1),
            Cell::new(2, 2),
            Cell::new(3, 2),
        ];
        let mut controller = MovementController::new(150.0, TILE);
        let mut ship = GridEntity::at_cell(Cell::new(0, 0), TILE);
        controller.set_path(path);
        assert_eq!(controller.destination(), Some(Cell::new(3, 2)));

        let dt = 1.0 / 60.0;
        let mut last = MovementStep::Moving;
        for _ in 0..10_000 {
            last = controller.advance(&mut ship, dt);
            if controller.state() == MovementState::Idle {
                break;
            }
        }
        assert_eq!(last, MovementStep::Arrived(Cell::new(3, 2)));
        assert_eq!(ship.cell, Cell::new(3, 2));
        assert_eq!(ship.position, Vec2::new(192.0, 128.0));
        assert_eq!(controller.remaining().len(), 0);
    }

    #[test]
    fn cancel_and_replace_paths() {
        let mut controller = MovementController::new(100.0, TILE);
        controller.set_path(vec![Cell::new(0, 1), Cell::new(0, 2)]);
        controller.cancel();
        assert_eq!(controller.state(), MovementState::Idle);
        assert_eq!(controller.destination(), None);

        controller.set_path(vec![Cell::new(1, 0)]);
        controller.set_path(vec![Cell::new(0, 1)]);
        assert_eq!(controller.destination(), Some(Cell::new(0, 1)));
        assert_eq!(controller.remaining().len(), 1);
    }

    #[test]
    fn negative_delta_does_not_move_backwards() {
        let mut controller = MovementController::new(100.0, TILE);
        let mut ship = GridEntity::at_cell(Cell::new(0, 0), TILE);
        controller.set_path(vec![Cell::new(1, 0)]);
        assert_eq!(controller.advance(&mut ship, -1.0), MovementStep::Moving);
        assert_eq!(ship.position, Vec2::new(0.0, 0.0));
    }
}
