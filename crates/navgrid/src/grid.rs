use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::geom::Cell;

pub const SEA_LAYER: &str = "Sea";
pub const ISLANDS_LAYER: &str = "Islands";
pub const SHALLOW_SEA_LAYER: &str = "Shallow Sea";

static ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
static DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Which neighbors count as a single step.
///
/// `FourWay` is the canonical model. `EightWay` allows diagonal steps even
/// when both orthogonal corners are blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementModel {
    #[default]
    FourWay,
    EightWay,
}

impl MovementModel {
    pub fn steps(self) -> impl Iterator<Item = (i32, i32)> {
        let diagonals: &'static [(i32, i32)] = match self {
            MovementModel::FourWay => &[],
            MovementModel::EightWay => &DIAGONAL_STEPS,
        };
        ORTHOGONAL_STEPS.iter().chain(diagonals.iter()).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRule {
    Walkable,
    Blocking,
}

/// Maps layer names onto walkability writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerRules {
    pub walkable: Vec<String>,
    pub blocking: Vec<String>,
}

impl Default for LayerRules {
    fn default() -> Self {
        Self {
            walkable: vec![SEA_LAYER.to_string()],
            blocking: vec![ISLANDS_LAYER.to_string(), SHALLOW_SEA_LAYER.to_string()],
        }
    }
}

impl LayerRules {
    /// Blocking wins if a name is listed under both rules.
    pub fn classify(&self, layer_name: &str) -> Option<LayerRule> {
        if self.blocking.iter().any(|name| name == layer_name) {
            return Some(LayerRule::Blocking);
        }
        if self.walkable.iter().any(|name| name == layer_name) {
            return Some(LayerRule::Walkable);
        }
        None
    }
}

/// Owned layer record handed over by map readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub tiles: Vec<Cell>,
}

impl TileLayer {
    pub fn new(name: impl Into<String>, tiles: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            tiles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("cell ({column}, {row}) has value {value}, expected 0 (walkable) or 1 (blocked)")]
    InvalidCellValue { column: usize, row: usize, value: u8 },
}

/// Walkable/blocked occupancy, row-major, built once at map load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkabilityGrid {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
}

impl WalkabilityGrid {
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width as usize * height as usize],
        }
    }

    /// Applies the layers in order; later layers overwrite earlier writes to
    /// the same cell. Layers without a rule are ignored.
    pub fn build<I, N, T>(width: u32, height: u32, layers: I, rules: &LayerRules) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: IntoIterator<Item = Cell>,
    {
        let mut grid = Self::open(width, height);
        for (name, tiles) in layers {
            let name = name.as_ref();
            let Some(rule) = rules.classify(name) else {
                continue;
            };
            let blocked = rule == LayerRule::Blocking;
            let mut written = 0usize;
            let mut skipped = 0usize;
            for cell in tiles {
                match grid.index_of(cell) {
                    Some(index) => {
                        grid.blocked[index] = blocked;
                        written += 1;
                    }
                    None => skipped += 1,
                }
            }
            if skipped > 0 {
                warn!(
                    layer = name,
                    skipped, width, height, "layer_tiles_outside_map"
                );
            }
            debug!(layer = name, rule = ?rule, written, "layer_applied");
        }
        info!(
            width,
            height,
            blocked = grid.blocked_count(),
            "walkability_grid_built"
        );
        grid
    }

    pub fn from_layers(width: u32, height: u32, layers: &[TileLayer], rules: &LayerRules) -> Self {
        Self::build(
            width,
            height,
            layers
                .iter()
                .map(|layer| (layer.name.as_str(), layer.tiles.iter().copied())),
            rules,
        )
    }

    /// Builds from a 0/1 matrix indexed `[row][column]`.
    pub fn from_matrix<R>(rows: &[R]) -> Result<Self, GridError>
    where
        R: AsRef<[u8]>,
    {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let mut blocked = Vec::with_capacity(width * height);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: row_index,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (column, value) in row.iter().copied().enumerate() {
                match value {
                    0 => blocked.push(false),
                    1 => blocked.push(true),
                    _ => {
                        return Err(GridError::InvalidCellValue {
                            column,
                            row: row_index,
                            value,
                        })
                    }
                }
            }
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            blocked,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    /// Out-of-bounds cells report as blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.index_of(cell)
            .and_then(|index| self.blocked.get(index))
            .copied()
            .unwrap_or(true)
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        !self.is_blocked(cell)
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.blocked.len()
    }

    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.column < 0 || cell.row < 0 {
            return None;
        }
        let (column, row) = (cell.column as u32, cell.row as u32);
        if column >= self.width || row >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + column as usize)
    }

    pub(crate) fn cell_at(&self, index: usize) -> Cell {
        let width = self.width.max(1) as usize;
        Cell::new((index % width) as i32, (index / width) as i32)
    }

    /// Legal single steps out of `cell`, in the model's neighbor order.
    pub fn walkable_neighbors(&self, cell: Cell, model: MovementModel) -> Vec<Cell> {
        model
            .steps()
            .map(|(d_column, d_row)| cell.offset(d_column, d_row))
            .filter(|neighbor| self.is_walkable(*neighbor))
            .collect()
    }

    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height as usize];
        }
        self.blocked
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|blocked| u8::from(*blocked)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(i32, i32)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn sea_then_islands_lets_obstacles_win() {
        let layers = vec![
            TileLayer::new(SEA_LAYER, cells(&[(0, 0), (1, 0), (2, 0)])),
            TileLayer::new(ISLANDS_LAYER, cells(&[(1, 0)])),
        ];
        let grid = WalkabilityGrid::from_layers(3, 1, &layers, &LayerRules::default());
        assert!(grid.is_walkable(Cell::new(0, 0)));
        assert!(grid.is_blocked(Cell::new(1, 0)));
        assert!(grid.is_walkable(Cell::new(2, 0)));
    }

    #[test]
    fn layer_order_is_significant() {
        let layers = vec![
            TileLayer::new(SHALLOW_SEA_LAYER, cells(&[(0, 0)])),
            TileLayer::new(SEA_LAYER, cells(&[(0, 0)])),
        ];
        let grid = WalkabilityGrid::from_layers(1, 1, &layers, &LayerRules::default());
        assert!(grid.is_walkable(Cell::new(0, 0)));
    }

    #[test]
    fn unmatched_layers_are_ignored() {
        let layers = vec![TileLayer::new("Shop", cells(&[(0, 0), (1, 1)]))];
        let grid = WalkabilityGrid::from_layers(2, 2, &layers, &LayerRules::default());
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn tiles_outside_declared_bounds_are_skipped() {
        let layers = vec![TileLayer::new(ISLANDS_LAYER, cells(&[(5, 5), (-1, 0), (1, 1)]))];
        let grid = WalkabilityGrid::from_layers(2, 2, &layers, &LayerRules::default());
        assert_eq!(grid.blocked_count(), 1);
        assert!(grid.is_blocked(Cell::new(1, 1)));
    }

    #[test]
    fn empty_map_is_a_legal_degenerate_grid() {
        let no_layers: Vec<(&str, Vec<Cell>)> = Vec::new();
        let grid = WalkabilityGrid::build(0, 0, no_layers, &LayerRules::default());
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.height(), 0);
        assert!(grid.is_blocked(Cell::new(0, 0)));
        assert!(grid.to_matrix().is_empty());
    }

    #[test]
    fn out_of_bounds_counts_as_blocked() {
        let grid = WalkabilityGrid::open(3, 3);
        assert!(grid.is_blocked(Cell::new(-1, 0)));
        assert!(grid.is_blocked(Cell::new(0, 3)));
        assert!(grid.is_walkable(Cell::new(2, 2)));
    }

    #[test]
    fn matrix_round_trips_row_major() {
        let rows = vec![vec![0u8, 1, 0], vec![1, 0, 0]];
        let grid = WalkabilityGrid::from_matrix(&rows).expect("grid");
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.is_blocked(Cell::new(1, 0)));
        assert!(grid.is_blocked(Cell::new(0, 1)));
        assert_eq!(grid.to_matrix(), rows);
    }

    #[test]
    fn matrix_rejects_ragged_rows_and_bad_values() {
        let ragged = vec![vec![0u8, 0], vec![0]];
        assert_eq!(
            WalkabilityGrid::from_matrix(&ragged).expect_err("ragged"),
            GridError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            }
        );

        let bad = vec![vec![0u8, 2]];
        assert_eq!(
            WalkabilityGrid::from_matrix(&bad).expect_err("bad value"),
            GridError::InvalidCellValue {
                column: 1,
                row: 0,
                value: 2
            }
        );
    }

    #[test]
    fn walkable_neighbors_respect_model_and_obstacles() {
        let rows = vec![vec![0u8, 1, 0], vec![0, 0, 0], vec![0, 0, 1]];
        let grid = WalkabilityGrid::from_matrix(&rows).expect("grid");
        let center = Cell::new(1, 1);

        let four = grid.walkable_neighbors(center, MovementModel::FourWay);
        assert_eq!(four, cells(&[(1, 2), (2, 1), (0, 1)]));

        let eight = grid.walkable_neighbors(center, MovementModel::EightWay);
        assert_eq!(eight.len(), 6);
        assert!(eight.contains(&Cell::new(2, 0)));
        assert!(!eight.contains(&Cell::new(2, 2)));
    }

    #[test]
    fn rules_deserialize_with_defaults() {
        let rules: LayerRules = serde_json::from_str(r#"{"blocking":["Reef"]}"#).expect("rules");
        assert_eq!(rules.classify("Reef"), Some(LayerRule::Blocking));
        assert_eq!(rules.classify(SEA_LAYER), Some(LayerRule::Walkable));
        assert_eq!(rules.classify(ISLANDS_LAYER), None);
    }

    #[test]
    fn movement_model_uses_snake_case_names() {
        let model: MovementModel = serde_json::from_str("\"eight_way\"").expect("model");
        assert_eq!(model, MovementModel::EightWay);
    }
}
