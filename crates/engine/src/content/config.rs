use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::atomic_io::read_optional;
use super::parse_json_with_path;

/// Death-count limits for ratings 5, 4, 3 and 2; anything worse rates 1.
pub type ScoreThresholds = [u32; 4];

pub const DEFAULT_SCORE_THRESHOLDS: ScoreThresholds = [0, 2, 5, 10];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("config validation failed at {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Tuned gameplay constants, loaded from `assets/config/game.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub ticks_per_second: u32,
    pub timings: Timings,
    pub movement: Movement,
    /// Per quest, indexed like the quest catalogue.
    pub score_thresholds: Vec<ScoreThresholds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timings {
    pub player_step_ticks: u32,
    pub critter_step_ticks: u32,
    pub critter_turn_ticks: u32,
    pub critter_turn_chance_percent: u32,
    pub fall_ticks: u32,
    pub bullet_step_ticks: u32,
    pub bullet_range_blocks: u32,
    pub fire_cooldown_ticks: u32,
    pub scroll_ticks_per_block: u32,
    pub scroll_ticks_per_z: u32,
    pub death_delay_ticks: u32,
    pub end_ticks: u32,
    pub title_delay_ticks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Movement {
    pub climb_z: i32,
    pub drop_z: i32,
    pub player_height_z: i32,
    pub critter_height_z: i32,
    pub bullet_height_z: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 30,
            timings: Timings::default(),
            movement: Movement::default(),
            score_thresholds: vec![DEFAULT_SCORE_THRESHOLDS; 4],
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            player_step_ticks: 3,
            critter_step_ticks: 6,
            critter_turn_ticks: 3,
            critter_turn_chance_percent: 20,
            fall_ticks: 1,
            bullet_step_ticks: 1,
            bullet_range_blocks: 8,
            fire_cooldown_ticks: 10,
            scroll_ticks_per_block: 2,
            scroll_ticks_per_z: 1,
            death_delay_ticks: 45,
            end_ticks: 150,
            title_delay_ticks: 15,
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            climb_z: 1,
            drop_z: 2,
            player_height_z: 6,
            critter_height_z: 4,
            bullet_height_z: 2,
        }
    }
}

impl GameConfig {
    /// Rating 1..=5 for finishing `quest` with `deaths` deaths.
    pub fn rate_quest(&self, quest: usize, deaths: u32) -> u8 {
        let thresholds = self
            .score_thresholds
            .get(quest)
            .copied()
            .unwrap_or(DEFAULT_SCORE_THRESHOLDS);
        1 + thresholds.iter().filter(|limit| deaths <= **limit).count() as u8
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(expected_actual("ticks_per_second", "> 0", 0));
        }
        for (field, value) in [
            ("timings.player_step_ticks", self.timings.player_step_ticks),
            ("timings.critter_step_ticks", self.timings.critter_step_ticks),
            ("timings.bullet_step_ticks", self.timings.bullet_step_ticks),
        ] {
            if value == 0 {
                return Err(expected_actual(field, "> 0", value));
            }
        }
        if self.timings.critter_turn_chance_percent > 100 {
            return Err(expected_actual(
                "timings.critter_turn_chance_percent",
                "<= 100",
                self.timings.critter_turn_chance_percent,
            ));
        }
        for (field, value) in [
            ("movement.player_height_z", self.movement.player_height_z),
            ("movement.critter_height_z", self.movement.critter_height_z),
            ("movement.bullet_height_z", self.movement.bullet_height_z),
        ] {
            if value <= 0 {
                return Err(expected_actual(field, "> 0", value));
            }
        }
        if self.movement.climb_z < 0 || self.movement.drop_z < 0 {
            return Err(ConfigError::Invalid {
                field: "movement".to_string(),
                message: "climb_z and drop_z must not be negative".to_string(),
            });
        }
        for (index, thresholds) in self.score_thresholds.iter().enumerate() {
            if thresholds.windows(2).any(|pair| pair[0] > pair[1]) {
                return Err(expected_actual(
                    &format!("score_thresholds[{index}]"),
                    "ascending death limits",
                    format!("{thresholds:?}"),
                ));
            }
        }
        Ok(())
    }
}

fn expected_actual(field: &str, expected: impl Display, actual: impl Display) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: format!("expected {expected}, got {actual}"),
    }
}

pub fn parse_config(raw: &str, path: &Path) -> Result<GameConfig, ConfigError> {
    let config: GameConfig =
        parse_json_with_path(raw).map_err(|(json_path, message)| ConfigError::Parse {
            path: path.to_path_buf(),
            json_path,
            message,
        })?;
    config.validate()?;
    Ok(config)
}

/// Missing file means defaults; a present but broken file is an error.
pub fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let bytes = read_optional(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let Some(bytes) = bytes else {
        info!(path = %path.display(), "config_missing_using_defaults");
        return Ok(GameConfig::default());
    };
    let raw = String::from_utf8_lossy(&bytes);
    let config = parse_config(&raw, path)?;
    info!(
        path = %path.display(),
        ticks_per_second = config.ticks_per_second,
        quests_rated = config.score_thresholds.len(),
        "config_loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config = parse_config(
            r#"{ "timings": { "death_delay_ticks": 5 } }"#,
            Path::new("game.json"),
        )
        .expect("parse");

        assert_eq!(config.timings.death_delay_ticks, 5);
        assert_eq!(config.timings.player_step_ticks, 3);
        assert_eq!(config.movement, Movement::default());
    }

    #[test]
    fn parse_error_reports_json_path() {
        let error = parse_config(
            r#"{ "movement": { "climb_z": "high" } }"#,
            Path::new("game.json"),
        )
        .expect_err("bad type");

        match error {
            ConfigError::Parse { json_path, .. } => assert_eq!(json_path, "movement.climb_z"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_config(r#"{ "tick_rate": 60 }"#, Path::new("game.json")).is_err());
    }

    #[test]
    fn validation_rejects_descending_thresholds() {
        let error = parse_config(
            r#"{ "score_thresholds": [[0, 5, 2, 10]] }"#,
            Path::new("game.json"),
        )
        .expect_err("descending");

        assert!(error.to_string().contains("score_thresholds[0]"));
    }

    #[test]
    fn rating_counts_satisfied_limits() {
        let config = GameConfig::default();

        assert_eq!(config.rate_quest(0, 0), 5);
        assert_eq!(config.rate_quest(0, 1), 4);
        assert_eq!(config.rate_quest(0, 2), 4);
        assert_eq!(config.rate_quest(0, 6), 2);
        assert_eq!(config.rate_quest(0, 11), 1);
        assert_eq!(config.rate_quest(99, 0), 5);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(&dir.path().join("game.json")).expect("defaults");

        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn shipped_config_is_valid() {
        let raw = include_str!("../../../../assets/config/game.json");
        parse_config(raw, Path::new("assets/config/game.json")).expect("shipped config");
    }
}
