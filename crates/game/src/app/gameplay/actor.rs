#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ActorId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorKind {
    Player,
    Villager,
    Enemy,
}

/// Whether the spawn config lets this actor roam (`"stay"` pins it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BehaviorState {
    Walking,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TilePosition {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl TilePosition {
    pub(crate) fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn from_world(position: Vec2) -> Self {
        Self {
            x: (position.x / TILE_SIZE).floor() as i32,
            y: (position.y / TILE_SIZE).floor() as i32,
        }
    }

    fn center_world(self) -> Vec2 {
        Vec2::new(
            self.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.tile_offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// One simulated entity. Player, villager, and enemy share this struct;
/// variant behavior comes from `ActorKind` plus the per-slot capability set
/// the scene attaches (physics, controller, sentences, rewards).
#[derive(Debug, Clone)]
pub(crate) struct Actor {
    id: ActorId,
    key: String,
    kind: ActorKind,
    position: Vec2,
    tile_pos: TilePosition,
    facing: Direction,
    movement_direction: Direction,
    behavior: BehaviorState,
    hp: i64,
    max_hp: i64,
    attack_power: i64,
    attack_period_ms: f64,
    alive: bool,
    attacking: bool,
    last_attack_ms: Option<f64>,
    talking: bool,
}

impl Actor {
    fn new(
        id: ActorId,
        key: String,
        kind: ActorKind,
        start_tile: TilePosition,
        hp: i64,
        max_hp: i64,
        attack_power: i64,
        attack_period_ms: f64,
    ) -> Self {
        Self {
            id,
            key,
            kind,
            position: start_tile.center_world(),
            tile_pos: start_tile,
            facing: Direction::Down,
            movement_direction: Direction::None,
            behavior: BehaviorState::Walking,
            hp,
            max_hp,
            attack_power,
            attack_period_ms,
            alive: true,
            attacking: false,
            last_attack_ms: None,
            talking: false,
        }
    }

    fn name(&self) -> &str {
        &self.key
    }

    /// World position; dead actors answer with the far-off sentinel so they
    /// no longer collide or get targeted.
    fn position(&self) -> Vec2 {
        if self.alive {
            self.position
        } else {
            DEAD_SENTINEL_TILE.center_world()
        }
    }

    pub(crate) fn tile_position(&self) -> TilePosition {
        if self.alive {
            self.tile_pos
        } else {
            DEAD_SENTINEL_TILE
        }
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_tile_position(&mut self, tile_pos: TilePosition) {
        self.tile_pos = tile_pos;
    }

    fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    fn face_direction(&self) -> Direction {
        self.facing
    }

    pub(crate) fn is_dead(&self) -> bool {
        !self.alive
    }

    fn hit_by(&mut self, damage: i64, source: ActorId) {
        if self.is_dead() {
            return;
        }
        self.hp -= damage;
        debug!(
            target_key = %self.key,
            damage,
            hp = self.hp,
            max_hp = self.max_hp,
            source = source.0,
            "actor_hit"
        );
        if self.hp <= 0 {
            self.die();
        }
    }

    fn die(&mut self) {
        self.alive = false;
        self.attacking = false;
        self.talking = false;
        self.movement_direction = Direction::None;
        info!(key = %self.key, "actor_died");
    }

    /// Whether a target position is within melee reach: strictly closer
    /// than one tile plus the attacker's extra range.
    fn inside_range(&self, position: Vec2, extra_range: f32) -> bool {
        self.position().distance_to(position) < TILE_SIZE + extra_range
    }

    /// Stance toggles are refused while the last swing is still cooling
    /// down, in either direction; the caller reads back the stance that
    /// actually holds.
    fn set_attacking(&mut self, attacking: bool, now_ms: f64) -> bool {
        if self.is_dead() || self.attacking == attacking {
            return self.attacking;
        }
        if let Some(last) = self.last_attack_ms {
            if now_ms - last < self.attack_period_ms {
                return self.attacking;
            }
        }
        self.attacking = attacking;
        self.attacking
    }

    fn should_move(&self) -> bool {
        self.alive && !self.talking && matches!(self.behavior, BehaviorState::Walking)
    }
}
