pub(crate) mod clock;
pub(crate) mod map;
pub(crate) mod scene;

pub use clock::{ScheduledQueue, SimClock};
pub use map::{
    TileLayerFile, TileMap, TileMapError, TileMapFile, TileProperties, TileRef, Vec2, TILE_SIZE,
};
pub use scene::{InputSnapshot, Scene, SceneCommand};
