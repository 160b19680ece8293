use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod geometry;
pub mod room;
pub mod save;
pub mod sim;
pub mod sprites;
pub mod story;
#[cfg(test)]
mod testing;

pub use app::{
    run_app, AppError, Audio, Canvas, EgaCanvas, EgaColor, InputAction, InputMode, InputSnapshot,
    LoopConfig, NullAudio, Renderer, SoundId, CANVAS_HEIGHT, CANVAS_WIDTH, SLOW_FRAME_ENV_VAR,
};
pub use content::{
    load_catalog, load_config, ConfigError, ContentError, GameConfig, ImageBank, QuestCatalog,
    QuestDef,
};
pub use geometry::{Direction, GridPos};
pub use save::{FileSaveStore, MemorySaveStore, SaveError, SaveState, SaveStore};
pub use sim::{Env, GameRng, SpriteManager};
pub use story::{GameManager, Story, StoryEvent, StoryStep, TITLE_IMAGE};

pub const ROOT_ENV_VAR: &str = "ISOQUEST_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub saves_dir: PathBuf,
}

impl AppPaths {
    pub fn config_file(&self) -> PathBuf {
        self.assets_dir.join("config").join("game.json")
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.assets_dir.join("quests").join("catalog.json")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.assets_dir.join("images")
    }

    pub fn save_file(&self) -> PathBuf {
        self.saves_dir.join("progress.sav")
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create saves directory at {path}: {source}")]
    CreateSavesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "ISOQUEST_ROOT is set but does not point to a game root: {path}\n\
A game root must contain an assets/ directory."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not find the game root by walking upward from {start_dir}\n\
Expected a directory containing assets/ (or Cargo.toml and crates/).\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/isoquest\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = paths_under(root);

    fs::create_dir_all(&paths.saves_dir).map_err(|source| StartupError::CreateSavesDir {
        path: paths.saves_dir.clone(),
        source,
    })?;

    Ok(paths)
}

fn paths_under(root: PathBuf) -> AppPaths {
    AppPaths {
        assets_dir: root.join("assets"),
        saves_dir: root.join("saves"),
        root,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_game_root(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_game_root(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

/// A shipped install only has assets/; a checkout also has the workspace.
fn is_game_root(path: &Path) -> bool {
    path.join("assets").is_dir()
        && (path.join("Cargo.toml").is_file() == path.join("crates").is_dir())
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
