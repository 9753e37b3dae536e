#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectileFate {
    Flying,
    Expired,
    HitWall,
    HitActor(ActorId),
}

/// A cast projectile. Spawns half a tile ahead of the caster and flies in a
/// straight line until it runs out of range, hits a colliding tile, or hits
/// a target's bounds.
#[derive(Debug, Clone)]
struct MagicProjectile {
    owner: ActorId,
    position: Vec2,
    direction: Direction,
    speed_pixels_per_second: f32,
    max_range_pixels: f32,
    attack_power: i64,
    moved_distance: f32,
}

impl MagicProjectile {
    fn cast_from(owner: &Actor) -> Self {
        let unit = owner.face_direction().vector();
        let position = owner.position();
        Self {
            owner: owner.id,
            position: Vec2::new(
                position.x + unit.x * TILE_SIZE / 2.0,
                position.y + unit.y * TILE_SIZE / 2.0,
            ),
            direction: owner.face_direction(),
            speed_pixels_per_second: FIREBALL_SPEED_PIXELS_PER_SECOND,
            max_range_pixels: FIREBALL_RANGE_PIXELS,
            attack_power: FIREBALL_ATTACK_POWER,
            moved_distance: 0.0,
        }
    }

    fn update(
        &mut self,
        delta_ms: f32,
        map: &TileMap,
        targets: &[(ActorId, Vec2)],
    ) -> ProjectileFate {
        let distance = self.speed_pixels_per_second * delta_ms / 1000.0;
        let unit = self.direction.vector();
        self.position = Vec2::new(
            self.position.x + unit.x * distance,
            self.position.y + unit.y * distance,
        );
        self.moved_distance += distance;

        if self.moved_distance >= self.max_range_pixels {
            debug!("projectile_expired");
            return ProjectileFate::Expired;
        }
        if map.collides_at_world(self.position) {
            debug!("projectile_hit_wall");
            return ProjectileFate::HitWall;
        }
        for (id, position) in targets {
            if *id != self.owner && actor_bounds(*position).contains(self.position) {
                return ProjectileFate::HitActor(*id);
            }
        }
        ProjectileFate::Flying
    }
}
