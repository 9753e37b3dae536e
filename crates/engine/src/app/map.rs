use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// World units are pixels; one tile is a 48x48 pixel square.
pub const TILE_SIZE: f32 = 48.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TileProperties {
    #[serde(default)]
    pub collides: bool,
    #[serde(default)]
    pub closed_doors: bool,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub animation: Option<String>,
}

/// A resolved tile: its id plus the tileset properties registered for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRef {
    pub id: u16,
    pub properties: TileProperties,
}

#[derive(Debug, Clone, PartialEq)]
struct TileLayer {
    name: String,
    /// Row-major, `0` meaning "no tile in this layer".
    tiles: Vec<u16>,
}

/// Layered tile map. Tile ids index into a shared property table the way a
/// tileset does; layers stack and are queried independently or together.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    width: u32,
    height: u32,
    properties: HashMap<u16, TileProperties>,
    layers: Vec<TileLayer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileMapError {
    #[error("layer '{layer}' tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
    #[error("tile id key '{raw}' is not a valid u16")]
    InvalidTileId { raw: String },
}

/// On-disk JSON shape of a map asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileMapFile {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tiles: HashMap<String, TileProperties>,
    pub layers: Vec<TileLayerFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileLayerFile {
    pub name: String,
    pub tiles: Vec<u16>,
}

impl TileMap {
    pub fn new(
        width: u32,
        height: u32,
        properties: HashMap<u16, TileProperties>,
        layers: Vec<(String, Vec<u16>)>,
    ) -> Result<Self, TileMapError> {
        let expected = width as usize * height as usize;
        let mut built = Vec::with_capacity(layers.len());
        for (name, tiles) in layers {
            let actual = tiles.len();
            if actual != expected {
                return Err(TileMapError::TileCountMismatch {
                    layer: name,
                    expected,
                    actual,
                });
            }
            built.push(TileLayer { name, tiles });
        }
        Ok(Self {
            width,
            height,
            properties,
            layers: built,
        })
    }

    pub fn from_file(file: TileMapFile) -> Result<Self, TileMapError> {
        let mut properties = HashMap::with_capacity(file.tiles.len());
        for (raw, props) in file.tiles {
            let id: u16 = raw
                .parse()
                .map_err(|_| TileMapError::InvalidTileId { raw: raw.clone() })?;
            properties.insert(id, props);
        }
        let layers = file
            .layers
            .into_iter()
            .map(|layer| (layer.name, layer.tiles))
            .collect();
        Self::new(file.width, file.height, properties, layers)
    }

    pub fn width_in_tiles(&self) -> u32 {
        self.width
    }

    pub fn height_in_tiles(&self) -> u32 {
        self.height
    }

    pub fn width_in_pixels(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn height_in_pixels(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|layer| layer.name.as_str())
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn has_tile_at(&self, x: i32, y: i32, layer: &str) -> bool {
        self.get_tile_at(x, y, layer).is_some()
    }

    /// True when no layer has a tile at this cell.
    pub fn has_no_tile_at(&self, x: i32, y: i32) -> bool {
        self.layers
            .iter()
            .all(|layer| self.tile_id_in_layer(layer, x, y).is_none())
    }

    fn tile_id_in_layer(&self, layer: &TileLayer, x: i32, y: i32) -> Option<u16> {
        let index = self.index_of(x, y)?;
        match layer.tiles.get(index).copied() {
            Some(0) | None => None,
            Some(id) => Some(id),
        }
    }

    pub fn get_tile_at(&self, x: i32, y: i32, layer: &str) -> Option<TileRef> {
        let layer = self.layer(layer)?;
        let id = self.tile_id_in_layer(layer, x, y)?;
        Some(TileRef {
            id,
            properties: self.properties.get(&id).cloned().unwrap_or_default(),
        })
    }

    /// Removes the tile from one layer permanently. Returns whether a tile
    /// was present.
    pub fn remove_tile_at(&mut self, x: i32, y: i32, layer: &str) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return false;
        };
        let Some(layer) = self.layers.iter_mut().find(|l| l.name == layer) else {
            return false;
        };
        match layer.tiles.get_mut(index) {
            Some(slot) if *slot != 0 => {
                *slot = 0;
                true
            }
            _ => false,
        }
    }

    /// Any layer at this cell carrying `collides`.
    pub fn collides_at(&self, x: i32, y: i32) -> bool {
        self.layers.iter().any(|layer| {
            self.tile_id_in_layer(layer, x, y)
                .and_then(|id| self.properties.get(&id))
                .is_some_and(|props| props.collides)
        })
    }

    pub fn tile_coords_at_world(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / TILE_SIZE).floor() as i32,
            (pos.y / TILE_SIZE).floor() as i32,
        )
    }

    pub fn collides_at_world(&self, pos: Vec2) -> bool {
        let (x, y) = self.tile_coords_at_world(pos);
        self.collides_at(x, y)
    }

    /// First layer (in stacking order) holding a closed-door tile at this
    /// cell, with the tile's properties.
    pub fn closed_door_at(&self, x: i32, y: i32) -> Option<(String, TileRef)> {
        for layer in &self.layers {
            if let Some(id) = self.tile_id_in_layer(layer, x, y) {
                let properties = self.properties.get(&id).cloned().unwrap_or_default();
                if properties.closed_doors {
                    return Some((layer.name.clone(), TileRef { id, properties }));
                }
            }
        }
        None
    }

    /// First layer holding an `interactive` tile at this cell.
    pub fn interactive_at(&self, x: i32, y: i32) -> bool {
        self.layers.iter().any(|layer| {
            self.tile_id_in_layer(layer, x, y)
                .and_then(|id| self.properties.get(&id))
                .is_some_and(|props| props.interactive)
        })
    }
}
