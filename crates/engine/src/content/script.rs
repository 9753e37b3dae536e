use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::app::map::{TileMap, TileMapError, TileMapFile};

/// The game script: every piece of configuration the simulation needs,
/// loaded once before the first tick (the readiness gate). A script that
/// references a missing villager/enemy kind or map never reaches the
/// simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameScript {
    pub start_map: String,
    pub player: PlayerScript,
    #[serde(default)]
    pub level_settings: Vec<LevelBand>,
    pub maps: HashMap<String, MapScript>,
    #[serde(default)]
    pub villagers: HashMap<String, VillagerScript>,
    #[serde(default)]
    pub enemies: HashMap<String, EnemyScript>,
}

/// Starting stats for a fresh ledger.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlayerScript {
    pub ap: i64,
    pub attack_speed: f64,
    pub hp: i64,
    pub max_hp: i64,
    pub level: u32,
    pub experience: i64,
    pub gold: i64,
}

/// One level band: levels `from..=to` each cost `exp * level` experience,
/// and crossing a threshold inside the band applies the stat deltas.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LevelBand {
    pub from: u32,
    #[serde(default)]
    pub to: Option<u32>,
    pub exp: i64,
    #[serde(default)]
    pub ap: i64,
    #[serde(default)]
    pub hp: i64,
    #[serde(default)]
    pub attack_period: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MapScript {
    pub tiled_map: String,
    pub start_pos: TilePoint,
    #[serde(default)]
    pub entrance: Vec<Entrance>,
    #[serde(default)]
    pub villagers: Vec<VillagerSpawn>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Entrance {
    pub x: i32,
    pub y: i32,
    pub to: String,
    pub to_x: i32,
    pub to_y: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VillagerSpawn {
    pub name: String,
    pub villager: String,
    pub pos: TilePoint,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub default_direction: Option<String>,
    #[serde(default)]
    pub moving_range: Option<RangeSize>,
    #[serde(default)]
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnemySpawn {
    #[serde(default)]
    pub name: Option<String>,
    pub enemy: String,
    pub pos: TilePoint,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub default_direction: Option<String>,
    #[serde(default)]
    pub moving_range: Option<RangeSize>,
    #[serde(default)]
    pub sentences: Vec<String>,
}

/// Wander fence half-extents in tiles, centered on the spawn tile.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VillagerScript {
    pub asset: String,
    #[serde(default)]
    pub moving_frames: Option<NpcFrames>,
    #[serde(default)]
    pub idle_frames: Option<NpcFrames>,
    #[serde(default)]
    pub speed_multiplier: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnemyScript {
    pub asset: String,
    #[serde(default)]
    pub moving_frames: Option<NpcFrames>,
    #[serde(default)]
    pub idle_frames: Option<NpcFrames>,
    #[serde(default)]
    pub speed_multiplier: Option<f32>,
    pub hp: HpRange,
    pub attack_power: i64,
    pub attack_period: f64,
    pub nearby_range: f32,
    #[serde(default)]
    pub exp: Option<RewardRange>,
    #[serde(default)]
    pub gold: Option<RewardRange>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HpRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewardRange {
    pub min: i64,
    pub max: i64,
}

/// Per-direction sprite sheet frame ranges.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcFrames {
    pub left: FrameRange,
    pub right: FrameRange,
    pub up: FrameRange,
    pub down: FrameRange,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("startMap '{name}' is not defined under maps")]
    MissingStartMap { name: String },
    #[error("map '{map}' spawns villager '{name}' of unknown kind '{kind}'")]
    MissingVillagerKind {
        map: String,
        name: String,
        kind: String,
    },
    #[error("map '{map}' spawns enemy of unknown kind '{kind}'")]
    MissingEnemyKind { map: String, kind: String },
    #[error("map '{map}' has an entrance to unknown map '{to}'")]
    MissingEntranceTarget { map: String, to: String },
    #[error("map asset {path} is malformed: {source}")]
    MapModel {
        path: PathBuf,
        #[source]
        source: TileMapError,
    },
}

pub fn load_game_script(path: &Path) -> Result<GameScript, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let script: GameScript = serde_json::from_str(&raw).map_err(|error| ScriptError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    validate_script(&script)?;
    debug!(
        path = %path.display(),
        maps = script.maps.len(),
        "game_script_loaded"
    );
    Ok(script)
}

pub fn load_tile_map(path: &Path) -> Result<TileMap, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: TileMapFile = serde_json::from_str(&raw).map_err(|error| ScriptError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    let map = TileMap::from_file(file).map_err(|source| ScriptError::MapModel {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        width = map.width_in_tiles(),
        height = map.height_in_tiles(),
        "tile_map_loaded"
    );
    Ok(map)
}

fn validate_script(script: &GameScript) -> Result<(), ScriptError> {
    if !script.maps.contains_key(&script.start_map) {
        return Err(ScriptError::MissingStartMap {
            name: script.start_map.clone(),
        });
    }
    for (map_name, map) in &script.maps {
        for spawn in &map.villagers {
            if !script.villagers.contains_key(&spawn.villager) {
                return Err(ScriptError::MissingVillagerKind {
                    map: map_name.clone(),
                    name: spawn.name.clone(),
                    kind: spawn.villager.clone(),
                });
            }
        }
        for spawn in &map.enemies {
            if !script.enemies.contains_key(&spawn.enemy) {
                return Err(ScriptError::MissingEnemyKind {
                    map: map_name.clone(),
                    kind: spawn.enemy.clone(),
                });
            }
        }
        for entrance in &map.entrance {
            if !script.maps.contains_key(&entrance.to) {
                return Err(ScriptError::MissingEntranceTarget {
                    map: map_name.clone(),
                    to: entrance.to.clone(),
                });
            }
        }
    }
    Ok(())
}
