use navgrid::{Cell, TileLayer, ISLANDS_LAYER, SEA_LAYER, SHALLOW_SEA_LAYER};

use super::config::{PointerSpace, ScriptedPointer};
use super::tmx::MapLayers;

const DEMO_WIDTH: u32 = 24;
const DEMO_HEIGHT: u32 = 16;
const DEMO_TILE_WIDTH: u32 = 64;
const REEF_COLUMN: i32 = 12;
const REEF_GAP_ROW: i32 = 8;
const DEMO_HARBOR: Cell = Cell::new(20, 3);

/// Built-in chart used when no `.tmx` is given: open sea, two islands, and
/// a north-south shallow reef with a single passage.
pub(crate) fn demo_chart() -> MapLayers {
    let sea = cells_in(0..DEMO_WIDTH as i32, 0..DEMO_HEIGHT as i32).collect();
    let islands = cells_in(3..7, 4..7).chain(cells_in(16..20, 10..13)).collect();
    let reef = (0..DEMO_HEIGHT as i32)
        .filter(|row| *row != REEF_GAP_ROW)
        .map(|row| Cell::new(REEF_COLUMN, row))
        .collect();

    MapLayers {
        width: DEMO_WIDTH,
        height: DEMO_HEIGHT,
        tile_width: DEMO_TILE_WIDTH,
        layers: vec![
            TileLayer::new(SEA_LAYER, sea),
            TileLayer::new(SHALLOW_SEA_LAYER, reef),
            TileLayer::new(ISLANDS_LAYER, islands),
        ],
    }
}

/// Hover the far harbor, sail there through the reef passage, zoom out.
pub(crate) fn demo_script() -> Vec<ScriptedPointer> {
    let at_harbor = |tick: u64, click: bool, zoom_steps: i32| ScriptedPointer {
        tick,
        x: DEMO_HARBOR.column as f32,
        y: DEMO_HARBOR.row as f32,
        click,
        zoom_steps,
        space: PointerSpace::Grid,
    };
    vec![
        at_harbor(1, false, 0),
        at_harbor(30, true, 0),
        at_harbor(90, false, -5),
    ]
}

fn cells_in(
    columns: std::ops::Range<i32>,
    rows: std::ops::Range<i32>,
) -> impl Iterator<Item = Cell> {
    rows.flat_map(move |row| columns.clone().map(move |column| Cell::new(column, row)))
}
