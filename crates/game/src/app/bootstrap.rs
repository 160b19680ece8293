use std::env;

use isoquest_engine::{
    load_catalog, load_config, resolve_app_paths, AppError, Env, FileSaveStore, GameManager,
    GameRng, ImageBank, LoopConfig, NullAudio, SaveState, TITLE_IMAGE,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SEED_ENV_VAR: &str = "ISOQUEST_SEED";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) game: GameManager,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Isoquest Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_paths_resolved");

    let game_config = load_config(&paths.config_file())?;
    let catalog = load_catalog(&paths.catalog_file())?;
    let images = match ImageBank::load(&paths.images_dir(), &[TITLE_IMAGE]) {
        Ok(images) => images,
        Err(error) => {
            warn!(error = %error, "images_unavailable");
            ImageBank::default()
        }
    };

    let store = FileSaveStore::new(paths.save_file());
    let save = SaveState::load(&store)?;
    info!(
        path = %store.path().display(),
        training_done = save.training_done(),
        resumable = save.resume().is_some(),
        "save_loaded"
    );

    let rng = match parse_seed(env::var(SEED_ENV_VAR).ok().as_deref()) {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };

    let config = LoopConfig {
        target_tps: game_config.ticks_per_second,
        ..LoopConfig::default()
    };
    let env = Env::new(game_config, catalog, save, Box::new(NullAudio), rng).with_images(images);
    let game = GameManager::new(env, Box::new(store));

    Ok(AppWiring { config, game })
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

fn parse_seed(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(env_var = SEED_ENV_VAR, value = raw, "seed_env_invalid");
            None
        }
    }
}
