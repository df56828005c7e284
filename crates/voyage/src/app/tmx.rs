//! Reader for the subset of Tiled `.tmx` maps the chart needs: map
//! dimensions and which cells each named tile layer occupies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use navgrid::{Cell, TileLayer};
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapLayers {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) tile_width: u32,
    /// Document order, which is also the draw and write order.
    pub(crate) layers: Vec<TileLayer>,
}

#[derive(Debug, Error)]
pub(crate) enum TmxError {
    #[error("failed to read map '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed map XML at {line}:{column}: {message}")]
    Malformed {
        line: u32,
        column: u32,
        message: String,
    },
    #[error("<{element}> at {line}:{column} is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        line: u32,
        column: u32,
    },
    #[error("<{element}> at {line}:{column} has invalid {attribute}='{value}'")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
        line: u32,
        column: u32,
    },
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'")]
    UnsupportedEncoding { layer: String, encoding: String },
    #[error("layer '{layer}' has invalid tile id '{value}' at index {index}")]
    BadTileValue {
        layer: String,
        index: usize,
        value: String,
    },
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    TileCountMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
}

pub(crate) fn load_tmx(path: &Path) -> Result<MapLayers, TmxError> {
    let raw = fs::read_to_string(path).map_err(|source| TmxError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_tmx(&raw)?;
    info!(
        path = %path.display(),
        width = map.width,
        height = map.height,
        tile_width = map.tile_width,
        layers = map.layers.len(),
        "map_loaded"
    );
    Ok(map)
}

pub(crate) fn parse_tmx(raw: &str) -> Result<MapLayers, TmxError> {
    let doc = Document::parse(raw).map_err(|error| TmxError::Malformed {
        line: error.pos().row,
        column: error.pos().col,
        message: error.to_string(),
    })?;
    let root = doc.root_element();
    if !root.has_tag_name("map") {
        let pos = doc.text_pos_at(root.range().start);
        return Err(TmxError::Malformed {
            line: pos.row,
            column: pos.col,
            message: format!("expected <map> root, found <{}>", root.tag_name().name()),
        });
    }

    let width = required_u32(&doc, root, "map", "width")?;
    let height = required_u32(&doc, root, "map", "height")?;
    let tile_width = required_u32(&doc, root, "map", "tilewidth")?;
    if tile_width == 0 {
        let pos = doc.text_pos_at(root.range().start);
        return Err(TmxError::InvalidAttribute {
            element: "map",
            attribute: "tilewidth",
            value: "0".to_string(),
            line: pos.row,
            column: pos.col,
        });
    }

    let mut layers = Vec::new();
    // Layers nested in <group> elements still count, in document order.
    for layer_node in root.descendants().filter(|node| node.has_tag_name("layer")) {
        if let Some(layer) = parse_layer(&doc, layer_node, width, height)? {
            layers.push(layer);
        }
    }

    Ok(MapLayers {
        width,
        height,
        tile_width,
        layers,
    })
}

fn parse_layer(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    map_width: u32,
    map_height: u32,
) -> Result<Option<TileLayer>, TmxError> {
    let name = node
        .attribute("name")
        .ok_or_else(|| missing(doc, node, "layer", "name"))?
        .to_string();
    let Some(data) = node.children().find(|child| child.has_tag_name("data")) else {
        warn!(layer = %name, "layer_without_data_skipped");
        return Ok(None);
    };
    if let Some(compression) = data.attribute("compression") {
        return Err(TmxError::UnsupportedEncoding {
            layer: name,
            encoding: format!("compressed ({compression})"),
        });
    }

    let gids = match data.attribute("encoding") {
        Some("csv") => parse_csv_gids(&name, data.text().unwrap_or_default())?,
        None => parse_xml_gids(&name, data)?,
        Some("base64") => {
            warn!(layer = %name, encoding = "base64", "layer_encoding_skipped");
            return Ok(None);
        }
        Some(other) => {
            return Err(TmxError::UnsupportedEncoding {
                layer: name,
                encoding: other.to_string(),
            })
        }
    };

    let expected = map_width as usize * map_height as usize;
    if gids.len() != expected {
        return Err(TmxError::TileCountMismatch {
            layer: name,
            expected,
            actual: gids.len(),
        });
    }

    let tiles = gids
        .iter()
        .enumerate()
        .filter(|(_, gid)| **gid != 0)
        .map(|(index, _)| {
            let index = index as u32;
            Cell::new((index % map_width) as i32, (index / map_width) as i32)
        })
        .collect();
    Ok(Some(TileLayer::new(name, tiles)))
}

fn parse_csv_gids(layer: &str, text: &str) -> Result<Vec<u32>, TmxError> {
    text.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .enumerate()
        .map(|(index, value)| {
            value.parse::<u32>().map_err(|_| TmxError::BadTileValue {
                layer: layer.to_string(),
                index,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Tiled's uncompressed XML layout: one `<tile gid=".."/>` per cell.
fn parse_xml_gids(layer: &str, data: Node<'_, '_>) -> Result<Vec<u32>, TmxError> {
    data.children()
        .filter(|child| child.has_tag_name("tile"))
        .enumerate()
        .map(|(index, tile)| match tile.attribute("gid") {
            None => Ok(0),
            Some(value) => value.parse::<u32>().map_err(|_| TmxError::BadTileValue {
                layer: layer.to_string(),
                index,
                value: value.to_string(),
            }),
        })
        .collect()
}

fn required_u32(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<u32, TmxError> {
    let raw = node
        .attribute(attribute)
        .ok_or_else(|| missing(doc, node, element, attribute))?;
    raw.trim().parse::<u32>().map_err(|_| {
        let pos = doc.text_pos_at(node.range().start);
        TmxError::InvalidAttribute {
            element,
            attribute,
            value: raw.to_string(),
            line: pos.row,
            column: pos.col,
        }
    })
}

fn missing(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> TmxError {
    let pos = doc.text_pos_at(node.range().start);
    TmxError::MissingAttribute {
        element,
        attribute,
        line: pos.row,
        column: pos.col,
    }
}
