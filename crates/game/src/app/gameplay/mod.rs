use std::collections::HashMap;

use engine::{
    Entrance, GameScript, InputSnapshot, LevelBand, MapScript, PlayerScript, RangeSize,
    RewardRange, SaveStore, Scene, SceneCommand, ScheduledQueue, ScriptError, TileMap, Vec2,
    TILE_SIZE,
};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const PLAYER_SPEED_PIXELS_PER_SECOND: f32 = TILE_SIZE * 4.0;
const NPC_SPEED_MULTIPLIER_DEFAULT: f32 = 1.7;
const WANDER_REROLL_INTERVAL_MS: f64 = 1000.0;
const DIALOGUE_DURATION_MS: f64 = 2000.0;
const DOOR_OPEN_DURATION_MS: f64 = 400.0;
const CASTING_PERIOD_MS: f64 = 1000.0;
const CAST_COOLDOWN_MS: f64 = 2000.0;
const MELEE_EXTRA_RANGE_PIXELS: f32 = 15.0;
const ENEMY_MELEE_EXTRA_RANGE_PIXELS: f32 = 15.0;
const FIREBALL_SPEED_PIXELS_PER_SECOND: f32 = 200.0;
const FIREBALL_RANGE_PIXELS: f32 = 100.0;
const FIREBALL_ATTACK_POWER: i64 = 10;
const ALIGNMENT_EPSILON_PIXELS: f32 = 0.5;
const LEVEL_BAND_OPEN_END: u32 = 9999;
const DEAD_SENTINEL_TILE: TilePosition = TilePosition { x: -1000, y: -1000 };

include!("direction.rs");
include!("actor.rs");
include!("physics.rs");
include!("combat.rs");
include!("ai.rs");
include!("door.rs");
include!("magic.rs");
include!("progression.rs");
include!("rewards.rs");
include!("controls.rs");
include!("scene.rs");
include!("util.rs");
