#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiState {
    WanderRandom,
    Chase,
}

/// NPC steering: wander on a ≥1s reroll timer, or chase the nearest
/// player-kind actor inside `nearby_range`. Seeded RNG keeps runs
/// reproducible.
#[derive(Debug, Clone)]
struct WanderChaseController {
    state: AiState,
    rng: Xoshiro256PlusPlus,
    last_reroll_ms: Option<f64>,
    current_direction: Direction,
    nearby_range: Option<f32>,
}

impl WanderChaseController {
    fn new(seed: u64, nearby_range: Option<f32>) -> Self {
        Self {
            state: AiState::WanderRandom,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            last_reroll_ms: None,
            current_direction: Direction::None,
            nearby_range,
        }
    }

    fn update(
        &mut self,
        actor: &mut Actor,
        physics: &mut GridPhysics,
        map: &TileMap,
        others: &[ActorObstacle],
        players: &[(ActorId, Vec2)],
        now_ms: f64,
    ) {
        if !actor.should_move() {
            return;
        }

        if let Some(range) = self.nearby_range {
            let nearest = players
                .iter()
                .map(|(id, position)| (*id, *position, actor.position().distance_to(*position)))
                .filter(|(_, _, distance)| *distance < range)
                .min_by(|a, b| {
                    a.2.partial_cmp(&b.2)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some((_, target, _)) = nearest {
                self.state = AiState::Chase;
                let attacking = actor.attacking;
                let direction = physics.move_towards(actor, map, others, target);
                if direction != Direction::None {
                    physics.set_chase_target(Some(target));
                    physics.move_actor(actor, map, others, direction, attacking);
                    return;
                }
                // fully blocked: wander behavior for this tick
            } else {
                self.state = AiState::WanderRandom;
            }
        }

        physics.set_chase_target(None);
        self.wander_tick(actor, physics, map, others, now_ms);
    }

    /// Reroll a random cardinal at most once per interval, and issue the
    /// current direction every tick regardless of whether it succeeds.
    fn wander_tick(
        &mut self,
        actor: &mut Actor,
        physics: &mut GridPhysics,
        map: &TileMap,
        others: &[ActorObstacle],
        now_ms: f64,
    ) {
        let should_reroll = self
            .last_reroll_ms
            .map_or(true, |last| now_ms - last >= WANDER_REROLL_INTERVAL_MS);
        if should_reroll {
            self.last_reroll_ms = Some(now_ms);
            let index = self.rng.gen_range(0..Direction::CARDINALS.len());
            self.current_direction = Direction::CARDINALS[index];
        }
        let attacking = actor.attacking;
        physics.move_actor(actor, map, others, self.current_direction, attacking);
    }
}
