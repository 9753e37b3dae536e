mod save;
mod script;

pub use save::{SaveError, SaveStore};
pub use script::{
    load_game_script, load_tile_map, EnemyScript, EnemySpawn, Entrance, FrameRange, GameScript,
    HpRange, LevelBand, MapScript, NpcFrames, PlayerScript, RangeSize, RewardRange, ScriptError,
    TilePoint, VillagerScript, VillagerSpawn,
};
