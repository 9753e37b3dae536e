/// Tile rectangle a fenced actor may roam inside. The boundary rows and
/// columns themselves are off limits: the actor may approach the edge tile
/// but never stand on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GeoFence {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl GeoFence {
    fn around(center: TilePosition, half_extents: RangeSize) -> Self {
        let left = center.x - half_extents.width;
        let top = center.y - half_extents.height;
        Self {
            left,
            top,
            right: left + half_extents.width * 2,
            bottom: top + half_extents.height * 2,
        }
    }

    fn excludes(self, tile: TilePosition) -> bool {
        tile.x <= self.left || tile.x >= self.right || tile.y <= self.top || tile.y >= self.bottom
    }
}

/// Start-of-tick snapshot of one live actor, for blocking queries. Updates
/// never read another actor's live state directly.
#[derive(Debug, Clone, Copy)]
struct ActorObstacle {
    id: ActorId,
    position: Vec2,
}

/// Grid-locked movement for one actor: idle or moving in one direction,
/// with snap-to-tile stepping by default and continuous clamped stepping
/// while a chase target is set.
#[derive(Debug, Clone)]
struct GridPhysics {
    speed_pixels_per_second: f32,
    geo_fence: Option<GeoFence>,
    last_movement_intent: Direction,
    tile_size_pixels_walked: f32,
    chase_target: Option<Vec2>,
}

impl GridPhysics {
    fn new(speed_pixels_per_second: f32, geo_fence: Option<GeoFence>) -> Self {
        Self {
            speed_pixels_per_second,
            geo_fence,
            last_movement_intent: Direction::None,
            tile_size_pixels_walked: 0.0,
            chase_target: None,
        }
    }

    fn is_moving(actor: &Actor) -> bool {
        actor.movement_direction != Direction::None
    }

    fn set_chase_target(&mut self, target: Option<Vec2>) {
        self.chase_target = target;
    }

    /// Records a movement intent. Facing turns immediately even when the
    /// destination is blocked or fenced; an attacking actor does not
    /// translate, and a moving actor finishes its traversal first.
    fn move_actor(
        &mut self,
        actor: &mut Actor,
        map: &TileMap,
        others: &[ActorObstacle],
        intent: Direction,
        attacking: bool,
    ) {
        actor.face(intent);
        self.last_movement_intent = intent;
        if attacking {
            return;
        }
        if Self::is_moving(actor) {
            return;
        }
        if intent == Direction::None {
            return;
        }
        if self.is_crossing_fence(actor, intent) {
            return;
        }
        if self.is_blocked_destination(actor, map, others, intent) {
            return;
        }
        self.start_moving(actor, intent);
    }

    fn start_moving(&mut self, actor: &mut Actor, direction: Direction) {
        actor.movement_direction = direction;
        self.tile_size_pixels_walked = 0.0;
        actor.set_tile_position(TilePosition::from_world(actor.position()));
    }

    fn stop_moving(&mut self, actor: &mut Actor) {
        actor.movement_direction = Direction::None;
        self.tile_size_pixels_walked = 0.0;
    }

    /// Advances the actor for this tick. The recorded intent is consumed:
    /// continuation across a tile border requires a fresh intent next tick.
    fn update(&mut self, actor: &mut Actor, map: &TileMap, others: &[ActorObstacle], delta_ms: f32) {
        if Self::is_moving(actor) {
            self.update_actor_position(actor, map, others, delta_ms);
        }
        self.last_movement_intent = Direction::None;
    }

    fn update_actor_position(
        &mut self,
        actor: &mut Actor,
        map: &TileMap,
        others: &[ActorObstacle],
        delta_ms: f32,
    ) {
        let pixels_to_walk = self.pixels_to_walk_this_update(delta_ms);
        let direction = actor.movement_direction;

        if let Some(target) = self.chase_target {
            // chase re-plans every tick; the fresh intent wins over any
            // traversal already in flight
            self.advance_toward_target(actor, map, others, target, pixels_to_walk);
        } else if self.will_cross_tile_border(pixels_to_walk) {
            if self.should_continue_moving(actor, map, others) {
                self.translate(actor, direction, pixels_to_walk);
                self.tile_size_pixels_walked =
                    (self.tile_size_pixels_walked + pixels_to_walk) % TILE_SIZE;
            } else {
                let remaining = TILE_SIZE - self.tile_size_pixels_walked;
                self.translate(actor, direction, remaining);
                self.stop_moving(actor);
            }
        } else {
            self.translate(actor, direction, pixels_to_walk);
            self.tile_size_pixels_walked += pixels_to_walk;
        }

        // Tile/world consistency must hold after every movement update.
        actor.set_tile_position(TilePosition::from_world(actor.position()));
    }

    /// Continuous chase stepping: clamp the step to the distance remaining
    /// on the active axis so the chaser never overshoots the target, and
    /// stop short when the moved position would run into a wall or a body.
    fn advance_toward_target(
        &mut self,
        actor: &mut Actor,
        map: &TileMap,
        others: &[ActorObstacle],
        target: Vec2,
        pixels_to_walk: f32,
    ) {
        let direction = self.last_movement_intent;
        if direction == Direction::None {
            self.stop_moving(actor);
            return;
        }
        actor.movement_direction = direction;
        let remaining = match direction {
            Direction::Left | Direction::Right => (target.x - actor.position().x).abs(),
            Direction::Up | Direction::Down => (target.y - actor.position().y).abs(),
            Direction::None => 0.0,
        };
        let step = pixels_to_walk.min(remaining);
        if self.is_blocking_by_moving(actor, map, others, direction, step) {
            self.stop_moving(actor);
            return;
        }
        self.translate(actor, direction, step);
        if step >= remaining {
            self.stop_moving(actor);
        }
    }

    /// Per-tick pixel-space blocking for continuous stepping. The probe
    /// leads the sprite by half a tile sideways and a third of a tile
    /// upward; downward the center itself is the probe.
    fn is_blocking_by_moving(
        &self,
        actor: &Actor,
        map: &TileMap,
        others: &[ActorObstacle],
        direction: Direction,
        pixels_to_move: f32,
    ) -> bool {
        let unit = direction.vector();
        let position = actor.position();
        let new_pos = Vec2::new(
            position.x + unit.x * pixels_to_move,
            position.y + unit.y * pixels_to_move,
        );
        if has_other_actor_at(actor.id, others, new_pos) {
            return true;
        }
        let probe = match direction {
            Direction::Left => Vec2::new(new_pos.x - TILE_SIZE / 2.0, new_pos.y),
            Direction::Right => Vec2::new(new_pos.x + TILE_SIZE / 2.0, new_pos.y),
            Direction::Up => Vec2::new(new_pos.x, new_pos.y - TILE_SIZE / 3.0),
            Direction::Down | Direction::None => new_pos,
        };
        if probe.x < 0.0
            || probe.y < 0.0
            || probe.x >= map.width_in_pixels()
            || probe.y >= map.height_in_pixels()
        {
            return true;
        }
        map.collides_at_world(probe)
    }

    fn translate(&self, actor: &mut Actor, direction: Direction, pixels: f32) {
        let unit = direction.vector();
        let position = actor.position();
        actor.set_position(Vec2::new(
            position.x + unit.x * pixels,
            position.y + unit.y * pixels,
        ));
    }

    fn pixels_to_walk_this_update(&self, delta_ms: f32) -> f32 {
        self.speed_pixels_per_second * delta_ms / 1000.0
    }

    fn will_cross_tile_border(&self, pixels_to_walk: f32) -> bool {
        self.tile_size_pixels_walked + pixels_to_walk >= TILE_SIZE
    }

    /// Continuation across a tile border needs a fresh matching intent and
    /// an unblocked next cell.
    fn should_continue_moving(
        &self,
        actor: &Actor,
        map: &TileMap,
        others: &[ActorObstacle],
    ) -> bool {
        self.last_movement_intent == actor.movement_direction
            && !self.is_blocked_destination(actor, map, others, self.last_movement_intent)
    }

    /// The blocking predicate: the next cell is blocking when any layer
    /// there carries `collides`, when it lies outside map bounds, or when
    /// another live actor's bounds already occupy it. The actor-overlap
    /// footprint is a third of a tile tall against full sprite boxes, so
    /// vertical blocking is more tolerant than horizontal.
    fn is_blocked_destination(
        &self,
        actor: &Actor,
        map: &TileMap,
        others: &[ActorObstacle],
        direction: Direction,
    ) -> bool {
        let dest = actor.tile_position().offset(direction);
        if has_other_actor_at(actor.id, others, dest.center_world()) {
            return true;
        }
        if dest.x < 0
            || dest.y < 0
            || dest.x >= map.width_in_tiles() as i32
            || dest.y >= map.height_in_tiles() as i32
        {
            return true;
        }
        map.collides_at(dest.x, dest.y)
    }

    fn is_crossing_fence(&self, actor: &Actor, direction: Direction) -> bool {
        let Some(fence) = self.geo_fence else {
            return false;
        };
        fence.excludes(actor.tile_position().offset(direction))
    }

    /// Myopic chase steering: pick the axis with the larger remaining
    /// distance (horizontal dominance on tie-adjacent cases), skipping an
    /// axis that is already aligned or whose next cell is blocked/fenced.
    /// No path planning beyond this single-step test.
    fn move_towards(
        &self,
        actor: &Actor,
        map: &TileMap,
        others: &[ActorObstacle],
        target: Vec2,
    ) -> Direction {
        let position = actor.position();
        let dx = target.x - position.x;
        let dy = target.y - position.y;
        let horizontal = if dx < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        };
        let vertical = if dy < 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };

        let candidates = if dx.abs() > dy.abs() {
            [(dx, horizontal), (dy, vertical)]
        } else {
            [(dy, vertical), (dx, horizontal)]
        };
        for (distance, direction) in candidates {
            if distance.abs() < ALIGNMENT_EPSILON_PIXELS {
                continue;
            }
            if self.is_crossing_fence(actor, direction) {
                continue;
            }
            if self.is_blocked_destination(actor, map, others, direction) {
                continue;
            }
            return direction;
        }
        Direction::None
    }
}
