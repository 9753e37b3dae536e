/// Damage to apply after all actors have evaluated their swings; damage
/// flows through the owner's `hit_by`, never a direct position/state write
/// from another actor's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingHit {
    attacker: ActorId,
    target: ActorId,
    damage: i64,
}

impl Actor {
    /// The per-actor attack loop. Out of the attacking stance this resets
    /// cooldown tracking and deals nothing; in stance, a swing is evaluated
    /// at most once per `attack_period_ms` and sweeps every opponent within
    /// `TILE_SIZE + extra_range` on the facing side.
    fn update_enemies(
        &mut self,
        opponents: &[(ActorId, Vec2)],
        now_ms: f64,
        attack_power: i64,
        attack_period_ms: f64,
        extra_range: f32,
    ) -> Vec<PendingHit> {
        if !self.attacking || self.is_dead() {
            self.last_attack_ms = None;
            return Vec::new();
        }
        if let Some(last) = self.last_attack_ms {
            if now_ms - last < attack_period_ms {
                return Vec::new();
            }
        }
        self.last_attack_ms = Some(now_ms);

        opponents
            .iter()
            .filter(|(id, position)| {
                *id != self.id
                    && self.inside_range(*position, extra_range)
                    && on_facing_side(self, *position)
            })
            .map(|(id, _)| PendingHit {
                attacker: self.id,
                target: *id,
                damage: attack_power,
            })
            .collect()
    }
}

/// Half-plane approximation of the facing cone: the target only needs to be
/// on the correct side of the attacker for the current facing.
fn on_facing_side(attacker: &Actor, target: Vec2) -> bool {
    let position = attacker.position();
    match attacker.face_direction() {
        Direction::Left => target.x <= position.x,
        Direction::Right => target.x >= position.x,
        Direction::Up => target.y <= position.y,
        Direction::Down => target.y >= position.y,
        Direction::None => false,
    }
}
