use engine::{load_game_script, resolve_app_paths, AppPaths, GameScript};
use tracing::info;
use tracing_subscriber::EnvFilter;

const GAME_SCRIPT_FILE: &str = "game_script.json";

pub(crate) struct AppWiring {
    pub(crate) paths: AppPaths,
    pub(crate) script: GameScript,
}

/// Resolves paths and loads the full game script before anything else runs.
/// The simulation never starts against partially loaded configuration.
pub(crate) fn build_app() -> Result<AppWiring, String> {
    init_tracing();
    info!("=== Frogquest Startup ===");

    let paths = resolve_app_paths().map_err(|error| error.to_string())?;
    let script_path = paths.assets_dir.join(GAME_SCRIPT_FILE);
    let script = load_game_script(&script_path).map_err(|error| error.to_string())?;
    info!(
        maps = script.maps.len(),
        villagers = script.villagers.len(),
        enemies = script.enemies.len(),
        "script_loaded"
    );

    Ok(AppWiring { paths, script })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
