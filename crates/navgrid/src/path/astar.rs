use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::geom::Cell;
use crate::grid::{MovementModel, WalkabilityGrid};

const EIGHT_WAY_STRAIGHT_COST: u32 = 10;
const EIGHT_WAY_DIAGONAL_COST: u32 = 14;

/// Field order is the pop order: lowest f, then lowest h, then oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f_cost: u32,
    h_cost: u32,
    insertion_order: u64,
    index: usize,
}

/// A* over the grid. Returns the steps after `start` through `goal`, or
/// `None` when the goal cannot be reached.
///
/// `start` itself may be blocked; every other cell on the route must be
/// walkable.
pub(crate) fn search(
    grid: &WalkabilityGrid,
    start: Cell,
    goal: Cell,
    model: MovementModel,
) -> Option<Vec<Cell>> {
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;
    if start_index == goal_index || grid.is_blocked(goal) {
        return None;
    }

    let node_count = grid.cell_count();
    let mut closed = vec![false; node_count];
    let mut best_g = vec![u32::MAX; node_count];
    let mut parent = vec![None::<usize>; node_count];
    let mut open = BinaryHeap::new();
    let mut next_insertion = 0u64;

    let start_h = heuristic(model, start, goal);
    open.push(Reverse(OpenNode {
        f_cost: start_h,
        h_cost: start_h,
        insertion_order: next_insertion,
        index: start_index,
    }));
    next_insertion = next_insertion.saturating_add(1);
    best_g[start_index] = 0;

    while let Some(Reverse(current)) = open.pop() {
        // Superseded entries stay queued; drop them here.
        if closed[current.index] {
            continue;
        }
        closed[current.index] = true;

        if current.index == goal_index {
            return reconstruct_path(grid, &parent, start_index, goal_index);
        }

        let current_cell = grid.cell_at(current.index);
        let current_g = best_g[current.index];
        for (d_column, d_row) in model.steps() {
            let neighbor = current_cell.offset(d_column, d_row);
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if closed[neighbor_index] || grid.is_blocked(neighbor) {
                continue;
            }

            let tentative_g = current_g.saturating_add(step_cost(model, d_column, d_row));
            if tentative_g >= best_g[neighbor_index] {
                continue;
            }

            best_g[neighbor_index] = tentative_g;
            parent[neighbor_index] = Some(current.index);
            let h_cost = heuristic(model, neighbor, goal);
            open.push(Reverse(OpenNode {
                f_cost: tentative_g.saturating_add(h_cost),
                h_cost,
                insertion_order: next_insertion,
                index: neighbor_index,
            }));
            next_insertion = next_insertion.saturating_add(1);
        }
    }

    None
}

fn reconstruct_path(
    grid: &WalkabilityGrid,
    parent: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> Option<Vec<Cell>> {
    let mut cursor = goal_index;
    let mut steps = Vec::new();
    while cursor != start_index {
        steps.push(grid.cell_at(cursor));
        cursor = parent.get(cursor).and_then(|value| *value)?;
    }
    steps.reverse();
    Some(steps)
}

fn step_cost(model: MovementModel, d_column: i32, d_row: i32) -> u32 {
    match model {
        MovementModel::FourWay => 1,
        MovementModel::EightWay if d_column != 0 && d_row != 0 => EIGHT_WAY_DIAGONAL_COST,
        MovementModel::EightWay => EIGHT_WAY_STRAIGHT_COST,
    }
}

fn heuristic(model: MovementModel, a: Cell, b: Cell) -> u32 {
    match model {
        MovementModel::FourWay => a.manhattan_distance(b),
        MovementModel::EightWay => {
            let dx = a.column.abs_diff(b.column);
            let dy = a.row.abs_diff(b.row);
            let diagonal = dx.min(dy);
            let straight = dx.max(dy) - diagonal;
            diagonal
                .saturating_mul(EIGHT_WAY_DIAGONAL_COST)
                .saturating_add(straight.saturating_mul(EIGHT_WAY_STRAIGHT_COST))
        }
    }
}
