use std::process::ExitCode;

use engine::{load_tile_map, InputSnapshot, SaveStore, Scene, SceneCommand, SimClock};
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;
use super::gameplay::{GameplayScene, ProgressionLedger, TilePosition};

/// Fixed simulation timestep. The driver, not the core, owns real time;
/// here it is a plain fixed-tick loop.
const TICK_DELTA_MS: f32 = 16.0;
const DEMO_TICKS: u64 = 3600;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_sim(app) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run_sim(app: AppWiring) -> Result<(), String> {
    let save_store = SaveStore::in_dir(&app.paths.save_dir);
    let mut ledger =
        ProgressionLedger::from_script(&app.script.player, app.script.level_settings.clone());
    if save_store.exists() {
        match ledger.load_from(&save_store) {
            Ok(()) => info!("save_loaded"),
            Err(err) => warn!(error = %err, "save_load_failed, starting fresh"),
        }
    }

    let mut clock = SimClock::new();
    let mut ticks: u64 = 0;
    let mut map_key = app.script.start_map.clone();
    let mut start_override: Option<TilePosition> = None;

    'maps: loop {
        let map_script = app
            .script
            .maps
            .get(&map_key)
            .ok_or_else(|| format!("map '{map_key}' missing from script"))?;
        let map = load_tile_map(&app.paths.assets_dir.join(&map_script.tiled_map))
            .map_err(|error| error.to_string())?;
        let mut scene = GameplayScene::new(
            &map_key,
            map,
            map_script,
            &app.script,
            start_override.take(),
            ledger,
            Some(save_store.clone()),
            ticks,
        )
        .map_err(|error| error.to_string())?;

        loop {
            let input = demo_input(ticks);
            clock.advance(TICK_DELTA_MS);
            match scene.update(clock.now_ms(), TICK_DELTA_MS, &input) {
                SceneCommand::None => {}
                SceneCommand::SwitchTo {
                    map,
                    start_x,
                    start_y,
                } => {
                    map_key = map;
                    start_override = Some(TilePosition::new(start_x, start_y));
                    ledger = scene.into_ledger();
                    ticks += 1;
                    continue 'maps;
                }
                SceneCommand::Quit => {
                    ledger = scene.into_ledger();
                    break 'maps;
                }
            }
            ticks += 1;
            if ticks >= DEMO_TICKS {
                info!(map = scene.map_key(), "demo_tick_limit_reached");
                ledger = scene.into_ledger();
                break 'maps;
            }
        }
    }

    if let Err(err) = ledger.save(&save_store) {
        warn!(error = %err, "final_save_failed");
    }
    info!(
        level = ledger.level(),
        experience = ledger.experience(),
        gold = ledger.gold(),
        "demo_finished"
    );
    Ok(())
}

/// Scripted demo input: wander the start map, poke at whatever is ahead,
/// and take a few swings so every subsystem gets exercised headlessly.
fn demo_input(ticks: u64) -> InputSnapshot {
    match (ticks / 60) % 10 {
        0 | 1 => InputSnapshot::empty().with_right_down(true),
        2 => InputSnapshot::empty().with_down_down(true),
        3 => InputSnapshot::empty()
            .with_right_down(true)
            .with_attack_down(true),
        4 => InputSnapshot::empty().with_interact_down(true),
        5 => InputSnapshot::empty().with_up_down(true),
        6 => InputSnapshot::empty().with_cast_down(true),
        7 | 8 => InputSnapshot::empty().with_left_down(true),
        _ => InputSnapshot::empty(),
    }
}
