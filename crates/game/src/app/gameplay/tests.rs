use super::*;

use engine::TileProperties;

const WALL_TILE: u16 = 2;
const DOOR_TILE: u16 = 3;
const SIGN_TILE: u16 = 4;
const TICK_MS: f32 = 16.0;

fn tile_property_table() -> HashMap<u16, TileProperties> {
    let mut table = HashMap::new();
    table.insert(
        WALL_TILE,
        TileProperties {
            collides: true,
            ..TileProperties::default()
        },
    );
    table.insert(
        DOOR_TILE,
        TileProperties {
            collides: true,
            closed_doors: true,
            animation: Some("animatedDoor".to_string()),
            ..TileProperties::default()
        },
    );
    table.insert(
        SIGN_TILE,
        TileProperties {
            interactive: true,
            ..TileProperties::default()
        },
    );
    table
}

/// Open field with a wall ring plus extra tiles dropped onto the fitting
/// layer by id.
fn ring_map(width: u32, height: u32, extras: &[(i32, i32, u16)]) -> TileMap {
    let size = (width * height) as usize;
    let terrain = vec![1u16; size];
    let mut walls = vec![0u16; size];
    let mut doors = vec![0u16; size];
    let mut deco = vec![0u16; size];
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1 {
                walls[(y * width as i32 + x) as usize] = WALL_TILE;
            }
        }
    }
    for &(x, y, id) in extras {
        let index = (y * width as i32 + x) as usize;
        match id {
            WALL_TILE => walls[index] = id,
            DOOR_TILE => doors[index] = id,
            _ => deco[index] = id,
        }
    }
    TileMap::new(
        width,
        height,
        tile_property_table(),
        vec![
            ("Terrain".to_string(), terrain),
            ("Walls".to_string(), walls),
            ("Doors Windows".to_string(), doors),
            ("Decoration".to_string(), deco),
        ],
    )
    .expect("test map")
}

fn open_map() -> TileMap {
    let width = 20u32;
    let height = 20u32;
    let terrain = vec![1u16; (width * height) as usize];
    TileMap::new(
        width,
        height,
        tile_property_table(),
        vec![("Terrain".to_string(), terrain)],
    )
    .expect("open map")
}

fn test_actor(id: u64, tile: TilePosition) -> Actor {
    Actor::new(
        ActorId(id),
        format!("actor_{id}"),
        ActorKind::Villager,
        tile,
        10,
        10,
        2,
        500.0,
    )
}

fn player_speed_physics() -> GridPhysics {
    GridPhysics::new(PLAYER_SPEED_PIXELS_PER_SECOND, None)
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "{actual} vs {expected}"
    );
}

fn assert_tile_world_consistent(actor: &Actor) {
    let expected = TilePosition::from_world(actor.position());
    assert_eq!(actor.tile_position(), expected);
}

// ---- GridPhysics: snap-to-tile stepping ----

#[test]
fn facing_turns_immediately_even_when_blocked() {
    let map = ring_map(10, 10, &[(4, 5, WALL_TILE)]);
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    let mut physics = player_speed_physics();

    physics.move_actor(&mut actor, &map, &[], Direction::Left, false);
    assert_eq!(actor.face_direction(), Direction::Left);
    assert_eq!(actor.movement_direction, Direction::None);
    assert_eq!(actor.tile_position(), TilePosition::new(5, 5));
}

#[test]
fn tile_and_world_stay_consistent_through_movement() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(2, 2));
    let mut physics = player_speed_physics();

    for _ in 0..40 {
        physics.move_actor(&mut actor, &map, &[], Direction::Right, false);
        physics.update(&mut actor, &map, &[], TICK_MS);
        assert_tile_world_consistent(&actor);
    }
    assert!(actor.tile_position().x > 2);
}

#[test]
fn movement_stops_exactly_at_tile_boundary_without_fresh_intent() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(2, 2));
    let mut physics = player_speed_physics();

    // one intent only; the traversal must clamp to the next tile center
    physics.move_actor(&mut actor, &map, &[], Direction::Right, false);
    for _ in 0..60 {
        physics.update(&mut actor, &map, &[], TICK_MS);
        if actor.movement_direction == Direction::None {
            break;
        }
    }
    assert_eq!(actor.movement_direction, Direction::None);
    assert_eq!(actor.tile_position(), TilePosition::new(3, 2));
    assert_close(actor.position().x, TilePosition::new(3, 2).center_world().x);
    assert_close(actor.position().y, TilePosition::new(3, 2).center_world().y);
}

#[test]
fn held_intent_carries_movement_across_tile_borders() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(2, 2));
    let mut physics = player_speed_physics();

    for _ in 0..100 {
        physics.move_actor(&mut actor, &map, &[], Direction::Right, false);
        physics.update(&mut actor, &map, &[], TICK_MS);
    }
    assert!(actor.tile_position().x >= 5, "{:?}", actor.tile_position());
    assert_tile_world_consistent(&actor);
}

#[test]
fn blocked_cell_never_entered_and_actor_goes_idle_in_tick() {
    let map = ring_map(10, 10, &[(6, 5, WALL_TILE)]);
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    let mut physics = player_speed_physics();

    for _ in 0..100 {
        physics.move_actor(&mut actor, &map, &[], Direction::Right, false);
        physics.update(&mut actor, &map, &[], TICK_MS);
        assert_eq!(actor.tile_position(), TilePosition::new(5, 5));
        assert_eq!(actor.movement_direction, Direction::None);
    }
}

#[test]
fn attacking_actor_turns_but_does_not_translate() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(4, 4));
    let mut physics = player_speed_physics();
    let before = actor.position();

    physics.move_actor(&mut actor, &map, &[], Direction::Up, true);
    physics.update(&mut actor, &map, &[], TICK_MS);
    assert_eq!(actor.face_direction(), Direction::Up);
    assert_eq!(actor.movement_direction, Direction::None);
    assert_close(actor.position().x, before.x);
    assert_close(actor.position().y, before.y);
}

#[test]
fn fence_boundary_tile_is_excluded_strictly() {
    let map = open_map();
    let fence = GeoFence::around(
        TilePosition::new(5, 5),
        RangeSize {
            width: 2,
            height: 2,
        },
    );
    let mut physics = GridPhysics::new(PLAYER_SPEED_PIXELS_PER_SECOND, Some(fence));

    // one tile shy of the edge may not step onto it
    let mut actor = test_actor(1, TilePosition::new(4, 5));
    physics.move_actor(&mut actor, &map, &[], Direction::Left, false);
    assert_eq!(actor.movement_direction, Direction::None);

    // moving back toward the center is fine
    physics.move_actor(&mut actor, &map, &[], Direction::Right, false);
    assert_eq!(actor.movement_direction, Direction::Right);
}

#[test]
fn other_actor_blocks_destination() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    let mut physics = player_speed_physics();
    let blocker = ActorObstacle {
        id: ActorId(2),
        position: TilePosition::new(6, 5).center_world(),
    };

    physics.move_actor(&mut actor, &map, &[blocker], Direction::Right, false);
    assert_eq!(actor.movement_direction, Direction::None);
    assert_eq!(actor.tile_position(), TilePosition::new(5, 5));
}

#[test]
fn map_edge_blocks_movement() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(0, 0));
    let mut physics = player_speed_physics();

    physics.move_actor(&mut actor, &map, &[], Direction::Left, false);
    assert_eq!(actor.movement_direction, Direction::None);
    physics.move_actor(&mut actor, &map, &[], Direction::Up, false);
    assert_eq!(actor.movement_direction, Direction::None);
}

// ---- GridPhysics: chase stepping ----

#[test]
fn move_towards_prefers_dominant_horizontal_axis() {
    let map = open_map();
    let actor = test_actor(1, TilePosition::new(2, 2));
    let physics = player_speed_physics();
    let target = TilePosition::new(5, 3).center_world();

    assert_eq!(
        physics.move_towards(&actor, &map, &[], target),
        Direction::Right
    );
}

#[test]
fn move_towards_returns_none_when_aligned() {
    let map = open_map();
    let actor = test_actor(1, TilePosition::new(2, 2));
    let physics = player_speed_physics();

    assert_eq!(
        physics.move_towards(&actor, &map, &[], actor.position()),
        Direction::None
    );
}

#[test]
fn move_towards_falls_back_to_free_axis_when_blocked() {
    let map = ring_map(12, 12, &[(3, 2, WALL_TILE)]);
    let actor = test_actor(1, TilePosition::new(2, 2));
    let physics = player_speed_physics();
    // target right and slightly down; right is walled off
    let target = TilePosition::new(6, 3).center_world();

    assert_eq!(
        physics.move_towards(&actor, &map, &[], target),
        Direction::Down
    );
}

#[test]
fn move_towards_returns_none_when_both_axes_blocked() {
    let map = ring_map(12, 12, &[(3, 2, WALL_TILE), (2, 3, WALL_TILE)]);
    let actor = test_actor(1, TilePosition::new(2, 2));
    let physics = player_speed_physics();
    let target = TilePosition::new(6, 6).center_world();

    assert_eq!(
        physics.move_towards(&actor, &map, &[], target),
        Direction::None
    );
}

#[test]
fn chase_steering_is_consistent_and_never_overshoots() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(0, 0));
    // 62.5 px/s at 16 ms per tick = 1 pixel per tick
    let mut physics = GridPhysics::new(62.5, None);
    let target = TilePosition::new(3, 0).center_world();

    let mut ticks = 0;
    loop {
        let direction = physics.move_towards(&actor, &map, &[], target);
        if direction == Direction::None {
            break;
        }
        assert_eq!(direction, Direction::Right, "steering flipped direction");
        physics.set_chase_target(Some(target));
        physics.move_actor(&mut actor, &map, &[], direction, false);
        physics.update(&mut actor, &map, &[], TICK_MS);
        assert!(
            actor.position().x <= target.x + 1e-3,
            "overshot: {} > {}",
            actor.position().x,
            target.x
        );
        assert_tile_world_consistent(&actor);
        ticks += 1;
        assert!(ticks < 400, "chase failed to converge");
    }
    assert_close(actor.position().x, target.x);
    assert_eq!(actor.tile_position(), TilePosition::new(3, 0));
}

#[test]
fn chase_clamps_final_partial_step() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(2, 2));
    let mut physics = GridPhysics::new(PLAYER_SPEED_PIXELS_PER_SECOND, None);
    let target = Vec2::new(actor.position().x + 1.5, actor.position().y);

    physics.set_chase_target(Some(target));
    physics.move_actor(&mut actor, &map, &[], Direction::Right, false);
    physics.update(&mut actor, &map, &[], TICK_MS);
    assert_close(actor.position().x, target.x);
    assert_eq!(actor.movement_direction, Direction::None);
}

// ---- combat ----

fn opponents_at(positions: &[(u64, TilePosition)]) -> Vec<(ActorId, Vec2)> {
    positions
        .iter()
        .map(|(id, tile)| (ActorId(*id), tile.center_world()))
        .collect()
}

#[test]
fn attack_hits_are_spaced_by_attack_period() {
    let mut attacker = test_actor(1, TilePosition::new(5, 5));
    attacker.face(Direction::Right);
    attacker.attacking = true;
    let opponents = opponents_at(&[(2, TilePosition::new(6, 5))]);

    let first = attacker.update_enemies(&opponents, 1000.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].damage, 3);

    let gated = attacker.update_enemies(&opponents, 1499.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS);
    assert!(gated.is_empty());

    let second = attacker.update_enemies(&opponents, 1500.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS);
    assert_eq!(second.len(), 1);
}

#[test]
fn leaving_stance_resets_cooldown_tracking() {
    let mut attacker = test_actor(1, TilePosition::new(5, 5));
    attacker.face(Direction::Right);
    attacker.attacking = true;
    let opponents = opponents_at(&[(2, TilePosition::new(6, 5))]);
    assert_eq!(
        attacker
            .update_enemies(&opponents, 0.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS)
            .len(),
        1
    );

    attacker.attacking = false;
    assert!(attacker
        .update_enemies(&opponents, 100.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS)
        .is_empty());
    assert_eq!(attacker.last_attack_ms, None);
}

#[test]
fn facing_half_plane_excludes_targets_behind() {
    let mut attacker = test_actor(1, TilePosition::new(5, 5));
    attacker.face(Direction::Right);
    attacker.attacking = true;
    let behind = opponents_at(&[(2, TilePosition::new(4, 5))]);

    assert!(attacker
        .update_enemies(&behind, 0.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS)
        .is_empty());
}

#[test]
fn targets_beyond_reach_are_not_hit() {
    let mut attacker = test_actor(1, TilePosition::new(5, 5));
    attacker.face(Direction::Right);
    attacker.attacking = true;
    let far = opponents_at(&[(2, TilePosition::new(8, 5))]);

    assert!(attacker
        .update_enemies(&far, 0.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS)
        .is_empty());
}

#[test]
fn stance_toggle_is_refused_while_cooling_down() {
    let mut attacker = test_actor(1, TilePosition::new(5, 5));
    attacker.face(Direction::Right);
    assert!(attacker.set_attacking(true, 0.0));
    let opponents = opponents_at(&[(2, TilePosition::new(6, 5))]);
    attacker.update_enemies(&opponents, 0.0, 3, 500.0, MELEE_EXTRA_RANGE_PIXELS);

    // still cooling down: the stance holds
    assert!(attacker.set_attacking(false, 100.0));
    // cooled down: release goes through
    assert!(!attacker.set_attacking(false, 500.0));
}

// ---- death ----

#[test]
fn death_sentinel_and_hit_by_noop() {
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    actor.hp = 1;
    actor.hit_by(5, ActorId(9));

    assert!(actor.is_dead());
    assert_eq!(actor.tile_position(), DEAD_SENTINEL_TILE);
    assert_close(actor.position().x, DEAD_SENTINEL_TILE.center_world().x);

    let hp_after_death = actor.hp;
    actor.hit_by(5, ActorId(9));
    assert_eq!(actor.hp, hp_after_death);
}

#[test]
fn dead_actor_is_not_an_obstacle_for_the_living() {
    let map = open_map();
    let mut dead = test_actor(2, TilePosition::new(6, 5));
    dead.hp = 1;
    dead.hit_by(10, ActorId(1));

    let mut actor = test_actor(1, TilePosition::new(5, 5));
    let mut physics = player_speed_physics();
    let obstacle = ActorObstacle {
        id: dead.id,
        position: dead.position(),
    };
    physics.move_actor(&mut actor, &map, &[obstacle], Direction::Right, false);
    assert_eq!(actor.movement_direction, Direction::Right);
}

// ---- AI ----

#[test]
fn wander_rerolls_direction_on_the_interval() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(10, 10));
    actor.kind = ActorKind::Enemy;
    let mut physics = GridPhysics::new(TILE_SIZE * NPC_SPEED_MULTIPLIER_DEFAULT, None);
    let mut controller = WanderChaseController::new(7, None);

    controller.update(&mut actor, &mut physics, &map, &[], &[], 0.0);
    assert_eq!(controller.last_reroll_ms, Some(0.0));
    let first = controller.current_direction;
    assert!(Direction::CARDINALS.contains(&first));

    controller.update(&mut actor, &mut physics, &map, &[], &[], 500.0);
    assert_eq!(controller.last_reroll_ms, Some(0.0));
    assert_eq!(controller.current_direction, first);

    controller.update(&mut actor, &mut physics, &map, &[], &[], 1000.0);
    assert_eq!(controller.last_reroll_ms, Some(1000.0));
}

#[test]
fn controller_chases_player_within_nearby_range() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    actor.kind = ActorKind::Enemy;
    let mut physics = GridPhysics::new(TILE_SIZE * NPC_SPEED_MULTIPLIER_DEFAULT, None);
    let mut controller = WanderChaseController::new(7, Some(144.0));
    let players = vec![(ActorId(0), TilePosition::new(7, 5).center_world())];

    controller.update(&mut actor, &mut physics, &map, &[], &players, 0.0);
    assert_eq!(controller.state, AiState::Chase);
    assert_eq!(actor.movement_direction, Direction::Right);
    assert_eq!(actor.face_direction(), Direction::Right);
}

#[test]
fn controller_ignores_players_outside_nearby_range() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    actor.kind = ActorKind::Enemy;
    let mut physics = GridPhysics::new(TILE_SIZE * NPC_SPEED_MULTIPLIER_DEFAULT, None);
    let mut controller = WanderChaseController::new(7, Some(144.0));
    let players = vec![(ActorId(0), TilePosition::new(15, 5).center_world())];

    controller.update(&mut actor, &mut physics, &map, &[], &players, 0.0);
    assert_eq!(controller.state, AiState::WanderRandom);
}

#[test]
fn pinned_actor_never_moves() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    actor.behavior = BehaviorState::Idle;
    let mut physics = GridPhysics::new(TILE_SIZE * NPC_SPEED_MULTIPLIER_DEFAULT, None);
    let mut controller = WanderChaseController::new(7, None);

    for tick in 0..50 {
        controller.update(&mut actor, &mut physics, &map, &[], &[], tick as f64 * 16.0);
        physics.update(&mut actor, &map, &[], TICK_MS);
    }
    assert_eq!(actor.tile_position(), TilePosition::new(5, 5));
}

#[test]
fn talking_actor_stands_still() {
    let map = open_map();
    let mut actor = test_actor(1, TilePosition::new(5, 5));
    actor.talking = true;
    let mut physics = GridPhysics::new(TILE_SIZE * NPC_SPEED_MULTIPLIER_DEFAULT, None);
    let mut controller = WanderChaseController::new(7, None);

    controller.update(&mut actor, &mut physics, &map, &[], &[], 0.0);
    assert_eq!(actor.movement_direction, Direction::None);
}

// ---- projectiles ----

#[test]
fn projectile_hits_enemy_in_path() {
    let map = open_map();
    let mut caster = test_actor(1, TilePosition::new(2, 2));
    caster.face(Direction::Right);
    let mut projectile = MagicProjectile::cast_from(&caster);
    let targets = vec![(ActorId(5), TilePosition::new(4, 2).center_world())];

    let mut fate = ProjectileFate::Flying;
    for _ in 0..60 {
        fate = projectile.update(TICK_MS, &map, &targets);
        if fate != ProjectileFate::Flying {
            break;
        }
    }
    assert_eq!(fate, ProjectileFate::HitActor(ActorId(5)));
}

#[test]
fn projectile_dies_on_wall() {
    let map = ring_map(10, 10, &[(4, 2, WALL_TILE)]);
    let mut caster = test_actor(1, TilePosition::new(2, 2));
    caster.face(Direction::Right);
    let mut projectile = MagicProjectile::cast_from(&caster);

    let mut fate = ProjectileFate::Flying;
    for _ in 0..60 {
        fate = projectile.update(TICK_MS, &map, &[]);
        if fate != ProjectileFate::Flying {
            break;
        }
    }
    assert_eq!(fate, ProjectileFate::HitWall);
}

#[test]
fn projectile_expires_at_max_range() {
    let map = open_map();
    let mut caster = test_actor(1, TilePosition::new(2, 2));
    caster.face(Direction::Right);
    let mut projectile = MagicProjectile::cast_from(&caster);

    let mut fate = ProjectileFate::Flying;
    let mut traveled = 0.0f32;
    for _ in 0..200 {
        fate = projectile.update(TICK_MS, &map, &[]);
        traveled += FIREBALL_SPEED_PIXELS_PER_SECOND * TICK_MS / 1000.0;
        if fate != ProjectileFate::Flying {
            break;
        }
    }
    assert_eq!(fate, ProjectileFate::Expired);
    assert!(traveled >= FIREBALL_RANGE_PIXELS);
}

// ---- progression ----

fn band(from: u32, to: u32, exp: i64) -> LevelBand {
    LevelBand {
        from,
        to: Some(to),
        exp,
        ap: 1,
        hp: 5,
        attack_period: -20,
    }
}

fn fresh_ledger(bands: Vec<LevelBand>) -> ProgressionLedger {
    let player = PlayerScript {
        ap: 5,
        attack_speed: 500.0,
        hp: 100,
        max_hp: 100,
        level: 1,
        experience: 0,
        gold: 0,
    };
    ProgressionLedger::from_script(&player, bands)
}

#[test]
fn level_threshold_grants_exactly_one_level_and_keeps_counter() {
    let mut ledger = fresh_ledger(vec![band(1, 5, 100)]);

    assert!(!ledger.change_experience(99));
    assert_eq!(ledger.level(), 1);

    assert!(ledger.change_experience(1));
    assert_eq!(ledger.level(), 2);
    assert_eq!(ledger.experience(), 100);
}

#[test]
fn level_up_applies_band_deltas_and_restores_health() {
    let mut ledger = fresh_ledger(vec![band(1, 5, 100)]);
    ledger.change_hp(-60);
    assert_eq!(ledger.hp(), 40);

    assert!(ledger.change_experience(100));
    assert_eq!(ledger.ap(), 6);
    assert_eq!(ledger.max_hp(), 105);
    assert_eq!(ledger.hp(), 105);
    assert_close(ledger.attack_period_ms() as f32, 480.0);
}

#[test]
fn one_large_grant_yields_at_most_one_level_per_call() {
    let mut ledger = fresh_ledger(vec![band(1, 5, 100)]);

    assert!(ledger.change_experience(500));
    assert_eq!(ledger.level(), 2);

    // cashing in the queued threshold takes another call
    assert!(ledger.change_experience(0));
    assert_eq!(ledger.level(), 3);
}

#[test]
fn later_band_accumulates_cost_of_earlier_bands() {
    let mut ledger = fresh_ledger(vec![band(1, 5, 100), band(6, 10, 150)]);
    ledger.level = 6;

    // full first band (5 * 100) plus one level into the second band
    assert!(!ledger.change_experience(649));
    assert_eq!(ledger.level(), 6);
    assert!(ledger.change_experience(1));
    assert_eq!(ledger.level(), 7);
}

#[test]
fn snapshot_uses_contract_field_names() {
    let ledger = fresh_ledger(vec![band(1, 5, 100)]);
    let json = serde_json::to_value(ledger.snapshot()).expect("snapshot json");
    for key in ["ap", "attackSpeed", "hp", "maxHp", "level", "experience", "gold"] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
}

#[test]
fn save_then_load_round_trips_every_field() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::in_dir(dir.path());
    let mut ledger = fresh_ledger(vec![band(1, 5, 100)]);
    ledger.change_gold(42);
    ledger.change_experience(100);
    ledger.save(&store).expect("save");

    let mut loaded = fresh_ledger(vec![band(1, 5, 100)]);
    loaded.load_from(&store).expect("load");
    assert_eq!(loaded.snapshot(), ledger.snapshot());
}

#[test]
fn corrupt_save_leaves_ledger_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::in_dir(dir.path());
    store
        .write_blob("{\"ap\": 99, \"attackSpeed\": \"oops\"}")
        .expect("write");

    let mut ledger = fresh_ledger(vec![band(1, 5, 100)]);
    let before = ledger.snapshot();
    assert!(ledger.load_from(&store).is_err());
    assert_eq!(ledger.snapshot(), before);
}

// ---- scene-level ----

fn base_script_value(map_value: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "startMap": "test",
        "player": {
            "ap": 5, "attackSpeed": 500.0, "hp": 100, "maxHp": 100,
            "level": 1, "experience": 0, "gold": 0
        },
        "levelSettings": [
            { "from": 1, "to": 5, "exp": 100, "ap": 1, "hp": 5, "attackPeriod": -20 }
        ],
        "maps": { "test": map_value },
        "villagers": {
            "elder": { "asset": "elder.png" }
        },
        "enemies": {
            "slime": {
                "asset": "slime.png",
                "hp": { "min": 5, "max": 5 },
                "attackPower": 1,
                "attackPeriod": 700.0,
                "nearbyRange": 144.0,
                "exp": { "min": 40, "max": 40 },
                "gold": { "min": 5, "max": 5 }
            }
        }
    })
}

fn make_scene(
    map: TileMap,
    map_value: serde_json::Value,
    save_store: Option<SaveStore>,
) -> GameplayScene {
    let script: GameScript =
        serde_json::from_value(base_script_value(map_value.clone())).expect("script");
    let map_script: MapScript = serde_json::from_value(map_value).expect("map script");
    let ledger = ProgressionLedger::from_script(&script.player, script.level_settings.clone());
    GameplayScene::new(
        "test", map, &map_script, &script, None, ledger, save_store, 7,
    )
    .expect("scene")
}

fn empty_map_value(start_x: i32, start_y: i32) -> serde_json::Value {
    serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": start_x, "y": start_y },
        "entrance": [],
        "villagers": [],
        "enemies": []
    })
}

fn run_ticks(scene: &mut GameplayScene, input: InputSnapshot, from_ms: f64, ticks: u32) -> f64 {
    let mut now = from_ms;
    for _ in 0..ticks {
        now += f64::from(TICK_MS);
        scene.update(now, TICK_MS, &input);
    }
    now
}

#[test]
fn door_opens_once_permanently_and_rejects_retrigger_mid_transition() {
    let map = ring_map(10, 10, &[(3, 2, DOOR_TILE)]);
    let mut scene = make_scene(map, empty_map_value(2, 2), None);
    let input = InputSnapshot::empty().with_right_down(true);
    let door = TilePosition::new(3, 2);

    let mut now = f64::from(TICK_MS);
    scene.update(now, TICK_MS, &input);
    assert_eq!(scene.doors.state_at(door), Some(DoorState::Opening));
    assert_eq!(
        scene.slots[0].actor.tile_position(),
        TilePosition::new(2, 2),
        "door must stay blocking while animating"
    );

    // retriggering mid-transition is rejected
    assert!(!scene
        .doors
        .handle_intent(&scene.map, &mut scene.events, door, now));

    now = run_ticks(&mut scene, input, now, 30);
    assert_eq!(scene.doors.state_at(door), Some(DoorState::Open));
    assert!(!scene.map.collides_at(door.x, door.y));

    // the opened doorway is traversable now
    now = run_ticks(&mut scene, input, now, 60);
    assert!(scene.slots[0].actor.tile_position().x >= 3);
    let _ = now;
}

#[test]
fn dialogue_starts_faces_player_and_expires() {
    let map = ring_map(10, 10, &[]);
    let map_value = serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": 2, "y": 2 },
        "entrance": [],
        "villagers": [
            {
                "name": "ada",
                "villager": "elder",
                "pos": { "x": 3, "y": 2 },
                "state": "stay",
                "sentences": ["hello there"]
            }
        ],
        "enemies": []
    });
    let mut scene = make_scene(map, map_value, None);

    // face the villager, then press interact
    let mut now = f64::from(TICK_MS);
    scene.update(
        now,
        TICK_MS,
        &InputSnapshot::empty().with_right_down(true).with_attack_down(true),
    );
    now = run_ticks(
        &mut scene,
        InputSnapshot::empty().with_interact_down(true),
        now,
        1,
    );
    assert_eq!(
        scene.current_interactive,
        InteractableKind::Villager(scene.slots[1].actor.id)
    );
    assert!(scene.slots[1].actor.talking);
    assert_eq!(
        scene.slots[1].active_sentence.as_deref(),
        Some("hello there")
    );
    // the villager turned toward the initiator on its left
    assert_eq!(scene.slots[1].actor.face_direction(), Direction::Left);

    run_ticks(&mut scene, InputSnapshot::empty(), now, 140);
    assert!(!scene.slots[1].actor.talking);
    assert_eq!(scene.slots[1].active_sentence, None);
}

#[test]
fn stale_dialogue_expiry_after_death_is_a_noop() {
    let map = ring_map(10, 10, &[]);
    let map_value = serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": 2, "y": 2 },
        "entrance": [],
        "villagers": [
            {
                "name": "ada",
                "villager": "elder",
                "pos": { "x": 3, "y": 2 },
                "state": "stay",
                "sentences": ["hello there"]
            }
        ],
        "enemies": []
    });
    let mut scene = make_scene(map, map_value, None);

    let mut now = f64::from(TICK_MS);
    scene.update(now, TICK_MS, &InputSnapshot::empty().with_right_down(true));
    now = run_ticks(
        &mut scene,
        InputSnapshot::empty().with_interact_down(true),
        now,
        1,
    );
    assert!(scene.slots[1].actor.talking);

    scene.slots[1].actor.hit_by(1000, ActorId(0));
    assert!(scene.slots[1].actor.is_dead());

    // expiry fires after death; nothing changes, nothing panics
    run_ticks(&mut scene, InputSnapshot::empty(), now, 140);
    assert!(scene.slots[1].actor.is_dead());
}

#[test]
fn killing_an_enemy_grants_rewards_and_writes_the_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::in_dir(dir.path());
    let map = ring_map(10, 10, &[]);
    let map_value = serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": 2, "y": 2 },
        "entrance": [],
        "villagers": [],
        "enemies": [
            { "enemy": "slime", "pos": { "x": 3, "y": 2 }, "state": "stay" }
        ]
    });
    let mut scene = make_scene(map, map_value, Some(store.clone()));

    // face right and swing; slime has 5 hp, ap is 5
    let input = InputSnapshot::empty()
        .with_right_down(true)
        .with_attack_down(true);
    run_ticks(&mut scene, input, 0.0, 2);

    assert!(scene.slots[1].actor.is_dead());
    assert_eq!(scene.ledger.experience(), 40);
    assert_eq!(scene.ledger.gold(), 5);
    assert!(store.exists());
}

#[test]
fn entrance_tile_switches_map() {
    let map = ring_map(10, 10, &[]);
    let map_value = serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": 2, "y": 2 },
        "entrance": [
            { "x": 3, "y": 2, "to": "test", "toX": 5, "toY": 5 }
        ],
        "villagers": [],
        "enemies": []
    });
    let mut scene = make_scene(map, map_value, None);
    let input = InputSnapshot::empty().with_right_down(true);

    let mut now = 0.0;
    let mut command = SceneCommand::None;
    for _ in 0..120 {
        now += f64::from(TICK_MS);
        command = scene.update(now, TICK_MS, &input);
        if command != SceneCommand::None {
            break;
        }
    }
    assert_eq!(
        command,
        SceneCommand::SwitchTo {
            map: "test".to_string(),
            start_x: 5,
            start_y: 5,
        }
    );
}

#[test]
fn player_death_halts_player_updates_but_not_the_world() {
    let map = ring_map(10, 10, &[]);
    let mut scene = make_scene(map, empty_map_value(2, 2), None);
    let player_id = scene.slots[0].actor.id;

    scene.apply_hits(
        vec![PendingHit {
            attacker: ActorId(99),
            target: player_id,
            damage: 1000,
        }],
        0.0,
    );
    assert!(scene.slots[0].actor.is_dead());
    assert!(scene.ledger.hp() <= 0);

    // a dead player neither moves nor triggers entrances
    let command = scene.update(
        16.0,
        TICK_MS,
        &InputSnapshot::empty().with_right_down(true),
    );
    assert_eq!(command, SceneCommand::None);
    assert_eq!(scene.slots[0].actor.tile_position(), DEAD_SENTINEL_TILE);
}

#[test]
fn casting_spawns_one_projectile_and_suppresses_movement() {
    let map = ring_map(10, 10, &[]);
    let mut scene = make_scene(map, empty_map_value(2, 2), None);
    let input = InputSnapshot::empty()
        .with_cast_down(true)
        .with_right_down(true);

    let before = scene.slots[0].actor.position();
    let now = run_ticks(&mut scene, input, 0.0, 3);
    assert_eq!(scene.projectiles.len(), 1);
    let after = scene.slots[0].actor.position();
    assert_close(after.x, before.x);
    assert_close(after.y, before.y);

    // after the cooldown a fresh cast goes out
    let now = run_ticks(&mut scene, InputSnapshot::empty(), now, 140);
    run_ticks(&mut scene, input, now, 1);
    assert!(!scene.projectiles.is_empty());
}

#[test]
fn unknown_spawn_kind_fails_scene_setup() {
    let map = ring_map(10, 10, &[]);
    let script: GameScript =
        serde_json::from_value(base_script_value(empty_map_value(2, 2))).expect("script");
    let map_value = serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": 2, "y": 2 },
        "entrance": [],
        "villagers": [
            { "name": "ghost", "villager": "missing", "pos": { "x": 3, "y": 2 } }
        ],
        "enemies": []
    });
    let map_script: MapScript = serde_json::from_value(map_value).expect("map script");
    let ledger = ProgressionLedger::from_script(&script.player, script.level_settings.clone());
    let result = GameplayScene::new("test", map, &map_script, &script, None, ledger, None, 7);
    assert!(matches!(
        result,
        Err(ScriptError::MissingVillagerKind { .. })
    ));
}

#[test]
fn facing_query_resolves_interactive_tile_before_actors() {
    let map = ring_map(10, 10, &[(3, 2, SIGN_TILE)]);
    let map_value = serde_json::json!({
        "tiledMap": "unused.json",
        "startPos": { "x": 2, "y": 2 },
        "entrance": [],
        "villagers": [
            {
                "name": "ada",
                "villager": "elder",
                "pos": { "x": 3, "y": 2 },
                "state": "stay",
                "sentences": ["hi"]
            }
        ],
        "enemies": []
    });
    let mut scene = make_scene(map, map_value, None);

    scene.update(
        16.0,
        TICK_MS,
        &InputSnapshot::empty().with_right_down(true).with_attack_down(true),
    );
    assert_eq!(
        scene.current_interactive,
        InteractableKind::Tile(TilePosition::new(3, 2))
    );
}
