mod astar;
mod cache;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::geom::Cell;
use crate::grid::{MovementModel, WalkabilityGrid};

pub use cache::{CachedPath, PathCacheStats, PathRequest};

use cache::PathCache;

/// A* search over a shared grid with a single-slot result cache.
///
/// Repeating the previous `(start, end)` returns the stored result without
/// searching again, including an empty "no route" result. Not meant to be
/// shared across threads without external synchronization.
#[derive(Debug, Clone)]
pub struct PathFinder {
    grid: Arc<WalkabilityGrid>,
    model: MovementModel,
    cache: PathCache,
}

impl PathFinder {
    pub fn new(grid: Arc<WalkabilityGrid>) -> Self {
        Self {
            grid,
            model: MovementModel::default(),
            cache: PathCache::default(),
        }
    }

    pub fn with_movement_model(mut self, model: MovementModel) -> Self {
        self.model = model;
        self
    }

    pub fn grid(&self) -> &Arc<WalkabilityGrid> {
        &self.grid
    }

    pub fn movement_model(&self) -> MovementModel {
        self.model
    }

    /// Steps from the cell after `start` through `end`. Empty when `start`
    /// equals `end`, either cell is off the grid, or no route exists.
    pub fn find_path(&mut self, start: Cell, end: Cell) -> Vec<Cell> {
        let request = PathRequest::new(start, end);
        if let Some(cached) = self.cache.lookup(request) {
            trace!(?start, ?end, steps = cached.len(), "path_cache_hit");
            return cached.to_vec();
        }

        let path = astar::search(&self.grid, start, end, self.model).unwrap_or_default();
        debug!(
            ?start,
            ?end,
            steps = path.len(),
            model = ?self.model,
            "path_computed"
        );
        self.cache.store(request, path.clone());
        path
    }

    pub fn cached(&self) -> Option<&CachedPath> {
        self.cache.entry()
    }

    pub fn cache_stats(&self) -> PathCacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder_for(rows: &[Vec<u8>]) -> PathFinder {
        PathFinder::new(Arc::new(WalkabilityGrid::from_matrix(rows).expect("grid")))
    }

    fn assert_walkable_chain(grid: &WalkabilityGrid, start: Cell, path: &[Cell]) {
        let mut previous = start;
        for cell in path {
            assert!(previous.is_orthogonally_adjacent(*cell), "{previous:?} -> {cell:?}");
            assert!(grid.is_walkable(*cell), "{cell:?} is blocked");
            previous = *cell;
        }
    }

    #[test]
    fn start_equal_to_end_is_empty() {
        let mut finder = PathFinder::new(Arc::new(WalkabilityGrid::open(4, 4)));
        assert!(finder.find_path(Cell::new(0, 0), Cell::new(0, 0)).is_empty());
        assert!(finder.find_path(Cell::new(2, 3), Cell::new(2, 3)).is_empty());

        let mut degenerate = PathFinder::new(Arc::new(WalkabilityGrid::open(0, 0)));
        assert!(degenerate
            .find_path(Cell::new(0, 0), Cell::new(0, 0))
            .is_empty());
    }

    #[test]
    fn ten_by_ten_open_grid_corner_to_corner() {
        let mut finder = PathFinder::new(Arc::new(WalkabilityGrid::open(10, 10)));
        let start = Cell::new(0, 0);
        let path = finder.find_path(start, Cell::new(9, 9));
        assert_eq!(path.len(), 18);
        assert_eq!(path.last(), Some(&Cell::new(9, 9)));
        assert_walkable_chain(finder.grid(), start, &path);
    }

    #[test]
    fn routes_through_the_only_gap_in_row_five() {
        let mut rows = vec![vec![0u8; 10]; 10];
        for column in 0..9 {
            rows[5][column] = 1;
        }
        let mut finder = finder_for(&rows);
        let start = Cell::new(0, 0);
        let path = finder.find_path(start, Cell::new(0, 9));
        assert!(path.contains(&Cell::new(9, 5)));
        assert_walkable_chain(finder.grid(), start, &path);
    }

    #[test]
    fn repeated_query_hits_cache_with_identical_result() {
        let mut rows = vec![vec![0u8; 8]; 8];
        rows[3][2] = 1;
        rows[3][3] = 1;
        rows[4][3] = 1;
        let mut finder = finder_for(&rows);

        let first = finder.find_path(Cell::new(0, 0), Cell::new(7, 6));
        let second = finder.find_path(Cell::new(0, 0), Cell::new(7, 6));
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(finder.cache_stats(), PathCacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn changed_end_does_not_reuse_previous_result() {
        let mut finder = PathFinder::new(Arc::new(WalkabilityGrid::open(6, 6)));
        let a = Cell::new(0, 0);
        let first = finder.find_path(a, Cell::new(5, 0));
        let second = finder.find_path(a, Cell::new(0, 5));
        assert_ne!(first, second);
        assert_eq!(second.last(), Some(&Cell::new(0, 5)));
        assert_eq!(finder.cache_stats().hits, 0);
        assert_eq!(
            finder.cached().map(|cached| cached.request),
            Some(PathRequest::new(a, Cell::new(0, 5)))
        );
    }

    #[test]
    fn unreachable_result_is_cached_as_empty() {
        let rows = vec![vec![0u8, 1, 0], vec![0, 1, 0], vec![0, 1, 0]];
        let mut finder = finder_for(&rows);
        assert!(finder.find_path(Cell::new(0, 0), Cell::new(2, 2)).is_empty());
        assert!(finder.find_path(Cell::new(0, 0), Cell::new(2, 2)).is_empty());
        assert_eq!(finder.cache_stats().hits, 1);
        let cached = finder.cached().expect("cached entry");
        assert!(cached.path.is_empty());
    }

    #[test]
    fn out_of_bounds_requests_return_empty() {
        let mut finder = PathFinder::new(Arc::new(WalkabilityGrid::open(5, 5)));
        assert!(finder.find_path(Cell::new(-3, 0), Cell::new(2, 2)).is_empty());
        assert!(finder.find_path(Cell::new(0, 0), Cell::new(2, 99)).is_empty());
    }

    #[test]
    fn every_reachable_pair_yields_adjacent_walkable_chain() {
        let rows = vec![
            vec![0u8, 0, 0, 1, 0, 0],
            vec![1, 1, 0, 1, 0, 1],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 1, 1, 1, 1, 0],
            vec![0, 0, 0, 1, 0, 0],
        ];
        let mut finder = finder_for(&rows);
        let grid = Arc::clone(finder.grid());
        let walkable: Vec<Cell> = (0..5)
            .flat_map(|row| (0..6).map(move |column| Cell::new(column, row)))
            .filter(|cell| grid.is_walkable(*cell))
            .collect();
        for start in &walkable {
            for end in &walkable {
                let path = finder.find_path(*start, *end);
                if start == end {
                    assert!(path.is_empty());
                    continue;
                }
                assert!(!path.is_empty(), "{start:?} -> {end:?} should connect");
                assert_eq!(path.last(), Some(end));
                assert!(path.len() as u32 >= start.manhattan_distance(*end));
                assert_walkable_chain(&grid, *start, &path);
            }
        }
    }

    #[test]
    fn eight_way_is_opt_in() {
        let grid = Arc::new(WalkabilityGrid::open(4, 4));
        let mut four = PathFinder::new(Arc::clone(&grid));
        let mut eight = PathFinder::new(grid).with_movement_model(MovementModel::EightWay);
        assert_eq!(four.movement_model(), MovementModel::FourWay);
        assert_eq!(four.find_path(Cell::new(0, 0), Cell::new(3, 3)).len(), 6);
        assert_eq!(eight.find_path(Cell::new(0, 0), Cell::new(3, 3)).len(), 3);
    }
}
