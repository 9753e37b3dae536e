#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoorState {
    Opening,
    Open,
}

/// Closed-door tiles and their one-shot open transitions. Each door carries
/// its own reentrancy state, so two different doors may animate at once
/// while a single door rejects retriggering mid-transition.
#[derive(Debug, Default)]
struct DoorRegistry {
    states: HashMap<(i32, i32), DoorState>,
}

impl DoorRegistry {
    /// A movement intent resolving to a closed-door tile starts the open
    /// transition exactly once. The tile stays non-traversable until the
    /// scheduled completion removes it from its layer.
    fn handle_intent(
        &mut self,
        map: &TileMap,
        events: &mut ScheduledQueue<GameEvent>,
        tile: TilePosition,
        now_ms: f64,
    ) -> bool {
        let key = (tile.x, tile.y);
        if self.states.contains_key(&key) {
            return false;
        }
        let Some((layer, tile_ref)) = map.closed_door_at(tile.x, tile.y) else {
            return false;
        };
        self.states.insert(key, DoorState::Opening);
        info!(
            x = tile.x,
            y = tile.y,
            animation = tile_ref.properties.animation.as_deref().unwrap_or(""),
            "door_opening"
        );
        events.schedule(
            now_ms + DOOR_OPEN_DURATION_MS,
            GameEvent::DoorOpened {
                x: tile.x,
                y: tile.y,
                layer,
            },
        );
        true
    }

    /// Scheduled completion: the tile leaves the collision layer for good.
    /// The door never re-closes.
    fn finish_opening(&mut self, map: &mut TileMap, x: i32, y: i32, layer: &str) {
        map.remove_tile_at(x, y, layer);
        self.states.insert((x, y), DoorState::Open);
        debug!(x, y, "door_opened");
    }

    #[cfg(test)]
    fn state_at(&self, tile: TilePosition) -> Option<DoorState> {
        self.states.get(&(tile.x, tile.y)).copied()
    }
}
