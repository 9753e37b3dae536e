#[derive(Debug, Clone, PartialEq)]
enum GameEvent {
    DialogueExpired { actor: ActorId },
    CastCooldownExpired,
    DoorOpened { x: i32, y: i32, layer: String },
}

/// What the player is facing right now, resolved once per tick from the
/// facing-tile query. Dialogue and hint routing branch on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InteractableKind {
    None,
    Villager(ActorId),
    Enemy(ActorId),
    Tile(TilePosition),
}

/// One roster entry: the actor plus the capability set its variant gets at
/// construction (movement physics, optional AI, dialogue lines, kill
/// rewards).
#[derive(Debug)]
struct ActorSlot {
    actor: Actor,
    physics: GridPhysics,
    controller: Option<WanderChaseController>,
    sentences: Vec<String>,
    exp_reward: Option<RewardRange>,
    gold_reward: Option<RewardRange>,
    active_sentence: Option<String>,
}

pub(crate) struct GameplayScene {
    map_key: String,
    map: TileMap,
    entrances: Vec<Entrance>,
    slots: Vec<ActorSlot>,
    player_index: usize,
    ledger: ProgressionLedger,
    save_store: Option<SaveStore>,
    doors: DoorRegistry,
    projectiles: Vec<MagicProjectile>,
    events: ScheduledQueue<GameEvent>,
    controls: UserControls,
    current_interactive: InteractableKind,
    rng: Xoshiro256PlusPlus,
    prev_player_tile: TilePosition,
}

impl GameplayScene {
    pub(crate) fn new(
        map_key: &str,
        map: TileMap,
        map_script: &MapScript,
        script: &GameScript,
        start_override: Option<TilePosition>,
        ledger: ProgressionLedger,
        save_store: Option<SaveStore>,
        seed: u64,
    ) -> Result<Self, ScriptError> {
        let start = start_override
            .unwrap_or_else(|| TilePosition::new(map_script.start_pos.x, map_script.start_pos.y));
        let player = Actor::new(
            ActorId(0),
            "player".to_string(),
            ActorKind::Player,
            start,
            ledger.hp(),
            ledger.max_hp(),
            ledger.ap(),
            ledger.attack_period_ms(),
        );
        let mut slots = vec![ActorSlot {
            actor: player,
            physics: GridPhysics::new(PLAYER_SPEED_PIXELS_PER_SECOND, None),
            controller: None,
            sentences: Vec::new(),
            exp_reward: None,
            gold_reward: None,
            active_sentence: None,
        }];

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut next_id = 1u64;

        for spawn in &map_script.villagers {
            let kind = script.villagers.get(&spawn.villager).ok_or_else(|| {
                ScriptError::MissingVillagerKind {
                    map: map_key.to_string(),
                    name: spawn.name.clone(),
                    kind: spawn.villager.clone(),
                }
            })?;
            let tile = TilePosition::new(spawn.pos.x, spawn.pos.y);
            let mut actor = Actor::new(
                ActorId(next_id),
                spawn.name.clone(),
                ActorKind::Villager,
                tile,
                1,
                1,
                0,
                1000.0,
            );
            actor.behavior = behavior_from_config(spawn.state.as_deref());
            actor.face(facing_from_config(spawn.default_direction.as_deref()));
            slots.push(ActorSlot {
                actor,
                physics: GridPhysics::new(
                    npc_speed(kind.speed_multiplier),
                    spawn.moving_range.map(|range| GeoFence::around(tile, range)),
                ),
                controller: Some(WanderChaseController::new(seed.wrapping_add(next_id), None)),
                sentences: spawn.sentences.clone(),
                exp_reward: None,
                gold_reward: None,
                active_sentence: None,
            });
            next_id += 1;
        }

        for (index, spawn) in map_script.enemies.iter().enumerate() {
            let kind =
                script
                    .enemies
                    .get(&spawn.enemy)
                    .ok_or_else(|| ScriptError::MissingEnemyKind {
                        map: map_key.to_string(),
                        kind: spawn.enemy.clone(),
                    })?;
            let tile = TilePosition::new(spawn.pos.x, spawn.pos.y);
            let hp = if kind.hp.max <= kind.hp.min {
                kind.hp.min
            } else {
                rng.gen_range(kind.hp.min..=kind.hp.max)
            };
            let name = spawn
                .name
                .clone()
                .unwrap_or_else(|| format!("enemy_{}_{index}", spawn.enemy));
            let mut actor = Actor::new(
                ActorId(next_id),
                name,
                ActorKind::Enemy,
                tile,
                hp,
                hp,
                kind.attack_power,
                kind.attack_period,
            );
            actor.behavior = behavior_from_config(spawn.state.as_deref());
            actor.face(facing_from_config(spawn.default_direction.as_deref()));
            slots.push(ActorSlot {
                actor,
                physics: GridPhysics::new(
                    npc_speed(kind.speed_multiplier),
                    spawn.moving_range.map(|range| GeoFence::around(tile, range)),
                ),
                controller: Some(WanderChaseController::new(
                    seed.wrapping_add(next_id),
                    Some(kind.nearby_range),
                )),
                sentences: spawn.sentences.clone(),
                exp_reward: kind.exp,
                gold_reward: kind.gold,
                active_sentence: None,
            });
            next_id += 1;
        }

        info!(
            map = map_key,
            actor_count = slots.len(),
            "scene_loaded"
        );

        Ok(Self {
            map_key: map_key.to_string(),
            map,
            entrances: map_script.entrance.clone(),
            slots,
            player_index: 0,
            ledger,
            save_store,
            doors: DoorRegistry::default(),
            projectiles: Vec::new(),
            events: ScheduledQueue::new(),
            controls: UserControls::default(),
            current_interactive: InteractableKind::None,
            rng,
            prev_player_tile: start,
        })
    }

    pub(crate) fn map_key(&self) -> &str {
        &self.map_key
    }

    pub(crate) fn into_ledger(self) -> ProgressionLedger {
        self.ledger
    }

    fn slot_index_by_id(&self, id: ActorId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.actor.id == id)
    }

    fn live_obstacles(&self) -> Vec<ActorObstacle> {
        self.slots
            .iter()
            .filter(|slot| !slot.actor.is_dead())
            .map(|slot| ActorObstacle {
                id: slot.actor.id,
                position: slot.actor.position(),
            })
            .collect()
    }

    fn positions_of_kind(&self, kind: ActorKind) -> Vec<(ActorId, Vec2)> {
        self.slots
            .iter()
            .filter(|slot| slot.actor.kind == kind && !slot.actor.is_dead())
            .map(|slot| (slot.actor.id, slot.actor.position()))
            .collect()
    }

    fn process_due_events(&mut self, now_ms: f64) {
        for event in self.events.drain_due(now_ms) {
            match event {
                GameEvent::DialogueExpired { actor } => {
                    let Some(index) = self.slot_index_by_id(actor) else {
                        continue;
                    };
                    let slot = &mut self.slots[index];
                    // a stale callback for a dead actor is a no-op
                    if slot.actor.is_dead() {
                        continue;
                    }
                    slot.actor.talking = false;
                    slot.active_sentence = None;
                    debug!(actor = %slot.actor.name(), "dialogue_expired");
                }
                GameEvent::CastCooldownExpired => {
                    if self.slots[self.player_index].actor.is_dead() {
                        continue;
                    }
                    self.controls.finish_cast_cooldown();
                    debug!("cast_cooldown_reset");
                }
                GameEvent::DoorOpened { x, y, layer } => {
                    self.doors.finish_opening(&mut self.map, x, y, &layer);
                }
            }
        }
    }

    fn sync_player_stats(&mut self) {
        let ap = self.ledger.ap();
        let period = self.ledger.attack_period_ms();
        let hp = self.ledger.hp();
        let max_hp = self.ledger.max_hp();
        let actor = &mut self.slots[self.player_index].actor;
        if actor.is_dead() {
            return;
        }
        actor.attack_power = ap;
        actor.attack_period_ms = period;
        actor.hp = hp;
        actor.max_hp = max_hp;
    }

    fn update_player(
        &mut self,
        now_ms: f64,
        delta_ms: f32,
        input: &InputSnapshot,
        obstacles: &[ActorObstacle],
    ) {
        if self.slots[self.player_index].actor.is_dead() {
            return;
        }

        let attacking = self.slots[self.player_index]
            .actor
            .set_attacking(input.attack_down(), now_ms);
        let cast = self
            .controls
            .update_casting(input.cast_down(), now_ms, &mut self.events);
        if cast == CastUpdate::Started {
            let projectile = MagicProjectile::cast_from(&self.slots[self.player_index].actor);
            self.projectiles.push(projectile);
        }

        let suppress = attacking || cast.suppresses_movement();
        let intent = UserControls::movement_intent(input);
        if intent != Direction::None {
            let tile_ahead = self.slots[self.player_index]
                .actor
                .tile_position()
                .offset(intent);
            {
                let map = &self.map;
                let ActorSlot { actor, physics, .. } = &mut self.slots[self.player_index];
                physics.move_actor(actor, map, obstacles, intent, suppress);
            }
            self.doors
                .handle_intent(&self.map, &mut self.events, tile_ahead, now_ms);
        }

        let map = &self.map;
        let ActorSlot { actor, physics, .. } = &mut self.slots[self.player_index];
        physics.update(actor, map, obstacles, delta_ms);
    }

    fn update_npcs(
        &mut self,
        now_ms: f64,
        delta_ms: f32,
        obstacles: &[ActorObstacle],
        players: &[(ActorId, Vec2)],
    ) {
        for index in 0..self.slots.len() {
            if index == self.player_index {
                continue;
            }
            let map = &self.map;
            let ActorSlot {
                actor,
                physics,
                controller,
                ..
            } = &mut self.slots[index];
            if actor.is_dead() {
                continue;
            }
            if let Some(controller) = controller {
                controller.update(actor, physics, map, obstacles, players, now_ms);
            }
            physics.update(actor, map, obstacles, delta_ms);
        }
    }

    fn update_interactable_query(&mut self, input: &InputSnapshot, now_ms: f64) {
        let player = &self.slots[self.player_index].actor;
        if player.is_dead() {
            return;
        }
        let facing = player.face_direction();
        let player_tile = player.tile_position();
        let previous = self.current_interactive;

        if facing != Direction::None {
            let pos = player_tile.offset(facing);
            self.current_interactive = if self.map.interactive_at(pos.x, pos.y) {
                InteractableKind::Tile(pos)
            } else if let Some(id) = self.actor_at_tile(pos, ActorKind::Villager) {
                InteractableKind::Villager(id)
            } else if let Some(id) = self.actor_at_tile(pos, ActorKind::Enemy) {
                InteractableKind::Enemy(id)
            } else {
                InteractableKind::None
            };
        }
        if self.current_interactive != previous {
            debug!(interactive = ?self.current_interactive, "facing_target_changed");
        }

        if input.interact_down() {
            if let InteractableKind::Villager(id) = self.current_interactive {
                self.start_dialogue(id, now_ms);
            }
        }
    }

    fn actor_at_tile(&self, tile: TilePosition, kind: ActorKind) -> Option<ActorId> {
        self.slots
            .iter()
            .find(|slot| {
                slot.actor.kind == kind
                    && !slot.actor.is_dead()
                    && slot.actor.tile_position() == tile
            })
            .map(|slot| slot.actor.id)
    }

    fn start_dialogue(&mut self, target: ActorId, now_ms: f64) {
        let player_tile = self.slots[self.player_index].actor.tile_position();
        let Some(index) = self.slot_index_by_id(target) else {
            return;
        };
        if self.slots[index].actor.talking
            || self.slots[index].actor.is_dead()
            || self.slots[index].sentences.is_empty()
        {
            return;
        }
        let sentence_index = self.rng.gen_range(0..self.slots[index].sentences.len());

        let slot = &mut self.slots[index];
        slot.actor.talking = true;
        let tile = slot.actor.tile_position();
        let direction = if player_tile.x < tile.x {
            Direction::Left
        } else if player_tile.x > tile.x {
            Direction::Right
        } else if player_tile.y < tile.y {
            Direction::Up
        } else {
            Direction::Down
        };
        slot.actor.face(direction);
        let sentence = slot.sentences[sentence_index].clone();
        info!(
            villager = %slot.actor.name(),
            sentence = %sentence,
            "dialogue_started"
        );
        slot.active_sentence = Some(sentence);
        self.events.schedule(
            now_ms + DIALOGUE_DURATION_MS,
            GameEvent::DialogueExpired { actor: target },
        );
    }

    fn update_projectiles(&mut self, delta_ms: f32, now_ms: f64) {
        if self.projectiles.is_empty() {
            return;
        }
        let targets = self.positions_of_kind(ActorKind::Enemy);
        let live_ids: Vec<ActorId> = self
            .slots
            .iter()
            .filter(|slot| !slot.actor.is_dead())
            .map(|slot| slot.actor.id)
            .collect();
        let map = &self.map;
        let mut hits = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            // a projectile never outlives its owner
            if !live_ids.contains(&projectile.owner) {
                return false;
            }
            match projectile.update(delta_ms, map, &targets) {
                ProjectileFate::Flying => true,
                ProjectileFate::Expired | ProjectileFate::HitWall => false,
                ProjectileFate::HitActor(id) => {
                    hits.push(PendingHit {
                        attacker: projectile.owner,
                        target: id,
                        damage: projectile.attack_power,
                    });
                    false
                }
            }
        });
        self.apply_hits(hits, now_ms);
    }

    fn resolve_combat(&mut self, now_ms: f64) {
        let enemy_targets = self.positions_of_kind(ActorKind::Enemy);
        let player_targets = self.positions_of_kind(ActorKind::Player);
        let mut hits = Vec::new();

        {
            let ap = self.ledger.ap();
            let period = self.ledger.attack_period_ms();
            let actor = &mut self.slots[self.player_index].actor;
            if !actor.is_dead() {
                hits.extend(actor.update_enemies(
                    &enemy_targets,
                    now_ms,
                    ap,
                    period,
                    MELEE_EXTRA_RANGE_PIXELS,
                ));
            }
        }

        let player_position = self.slots[self.player_index].actor.position();
        let player_alive = !self.slots[self.player_index].actor.is_dead();
        for index in 0..self.slots.len() {
            if index == self.player_index {
                continue;
            }
            let slot = &mut self.slots[index];
            if slot.actor.kind != ActorKind::Enemy || slot.actor.is_dead() {
                continue;
            }
            let chasing = slot
                .controller
                .as_ref()
                .is_some_and(|controller| controller.state == AiState::Chase);
            let in_reach = player_alive
                && slot
                    .actor
                    .inside_range(player_position, ENEMY_MELEE_EXTRA_RANGE_PIXELS);
            slot.actor.set_attacking(chasing && in_reach, now_ms);
            let attack_power = slot.actor.attack_power;
            let attack_period = slot.actor.attack_period_ms;
            hits.extend(slot.actor.update_enemies(
                &player_targets,
                now_ms,
                attack_power,
                attack_period,
                ENEMY_MELEE_EXTRA_RANGE_PIXELS,
            ));
        }

        self.apply_hits(hits, now_ms);
    }

    fn apply_hits(&mut self, hits: Vec<PendingHit>, _now_ms: f64) {
        for hit in hits {
            let Some(index) = self.slot_index_by_id(hit.target) else {
                continue;
            };
            if self.slots[index].actor.is_dead() {
                continue;
            }
            if index == self.player_index {
                self.ledger.change_hp(-hit.damage);
                let hp = self.ledger.hp();
                let actor = &mut self.slots[index].actor;
                actor.hp = hp;
                if hp <= 0 {
                    actor.die();
                }
            } else {
                self.slots[index].actor.hit_by(hit.damage, hit.attacker);
                if self.slots[index].actor.is_dead()
                    && self.slots[index].actor.kind == ActorKind::Enemy
                {
                    self.grant_kill_rewards(index);
                }
            }
        }
    }

    fn grant_kill_rewards(&mut self, index: usize) {
        let exp = self.slots[index].exp_reward;
        let gold = self.slots[index].gold_reward;
        let rewards = roll_rewards(&mut self.rng, exp, gold);
        self.receive_rewards(&rewards);
    }

    fn receive_rewards(&mut self, rewards: &[Reward]) {
        for reward in rewards {
            match reward {
                Reward::Exp { amount } => {
                    info!(amount, "exp_gained");
                    self.ledger.change_experience(*amount);
                }
                Reward::Gold { amount } => {
                    info!(amount, "gold_gained");
                    self.ledger.change_gold(*amount);
                }
            }
        }
        if let Some(store) = &self.save_store {
            if let Err(error) = self.ledger.save(store) {
                warn!(error = %error, "save_failed");
            }
        }
    }

    fn check_entrances(&mut self) -> Option<SceneCommand> {
        let player = &self.slots[self.player_index].actor;
        if player.is_dead() {
            return None;
        }
        let tile = player.tile_position();
        if tile == self.prev_player_tile {
            return None;
        }
        self.prev_player_tile = tile;
        let entrance = self
            .entrances
            .iter()
            .find(|entrance| entrance.x == tile.x && entrance.y == tile.y)?;
        info!(from = %self.map_key, to = %entrance.to, "map_exit");
        Some(SceneCommand::SwitchTo {
            map: entrance.to.clone(),
            start_x: entrance.to_x,
            start_y: entrance.to_y,
        })
    }
}

fn behavior_from_config(state: Option<&str>) -> BehaviorState {
    if state == Some("stay") {
        BehaviorState::Idle
    } else {
        BehaviorState::Walking
    }
}

fn npc_speed(multiplier: Option<f32>) -> f32 {
    TILE_SIZE * multiplier.unwrap_or(NPC_SPEED_MULTIPLIER_DEFAULT)
}

impl Scene for GameplayScene {
    fn update(&mut self, now_ms: f64, delta_ms: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        self.process_due_events(now_ms);
        self.sync_player_stats();

        let obstacles = self.live_obstacles();
        let players = self.positions_of_kind(ActorKind::Player);

        self.update_player(now_ms, delta_ms, input, &obstacles);
        self.update_npcs(now_ms, delta_ms, &obstacles, &players);
        self.update_interactable_query(input, now_ms);
        self.update_projectiles(delta_ms, now_ms);
        self.resolve_combat(now_ms);

        if let Some(command) = self.check_entrances() {
            return command;
        }
        SceneCommand::None
    }
}
