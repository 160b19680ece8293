//! Fixtures shared by the unit tests.

use crate::app::{NullAudio, RecordingAudio};
use crate::content::{GameConfig, QuestCatalog, QuestDef};
use crate::geometry::Direction;
use crate::room::{Exit, RoomLayout};
use crate::save::SaveState;
use crate::sim::{Env, GameRng};

pub(crate) const TEST_SEED: u64 = 7;

/// "A1" (6x4) leads east into "B2" (12x12, four exits, holds the goal).
pub(crate) fn test_quest(name: &str) -> QuestDef {
    QuestDef {
        name: name.to_string(),
        briefing_pages: vec!["Find the lamp.".to_string(), "Mind the gap.".to_string()],
        start_room: "A1".to_string(),
        start_entry: 0,
        map_position: None,
        rooms: vec![
            RoomLayout::new("A1", 6, 4)
                .with_exit(Exit::new(Direction::NegX, 1))
                .with_exit(Exit::new(Direction::PosX, 2).to("B2", 0)),
            RoomLayout::new("B2", 12, 12)
                .with_exit(Exit::new(Direction::NegX, 2).to("A1", 1))
                .with_exit(Exit::new(Direction::NegY, 3))
                .with_exit(Exit::new(Direction::PosY, 3))
                .with_exit(Exit::new(Direction::PosX, 11))
                .with_goal(6, 6),
        ],
    }
}

pub(crate) fn training_quest() -> QuestDef {
    QuestDef {
        name: "Training".to_string(),
        briefing_pages: Vec::new(),
        start_room: "T1".to_string(),
        start_entry: 0,
        map_position: None,
        rooms: vec![RoomLayout::new("T1", 8, 8)
            .with_exit(Exit::new(Direction::NegX, 3))
            .with_goal(6, 1)],
    }
}

pub(crate) fn test_catalog() -> QuestCatalog {
    QuestCatalog {
        training: Some(training_quest()),
        quests: vec![test_quest("Cellar"), test_quest("Tower")],
    }
}

pub(crate) fn test_env() -> Env {
    Env::new(
        GameConfig::default(),
        test_catalog(),
        SaveState::new(),
        Box::new(NullAudio),
        GameRng::new(TEST_SEED),
    )
}

/// Env whose audio calls the returned recorder can inspect.
pub(crate) fn recording_env() -> (Env, RecordingAudio) {
    let audio = RecordingAudio::default();
    let env = Env::new(
        GameConfig::default(),
        test_catalog(),
        SaveState::new(),
        Box::new(audio.clone()),
        GameRng::new(TEST_SEED),
    );
    (env, audio)
}
