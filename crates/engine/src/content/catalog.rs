use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::room::RoomLayout;
use crate::save::QUEST_COUNT;

use super::atomic_io::read_optional;
use super::{parse_json_with_path, ContentError};

/// Room indexes are saved in six bits.
pub const MAX_QUEST_ROOMS: usize = 63;

/// One dungeon: its briefing, where play starts and every room in it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestDef {
    pub name: String,
    #[serde(default)]
    pub briefing_pages: Vec<String>,
    pub start_room: String,
    #[serde(default)]
    pub start_entry: u8,
    /// Marker position on the overworld map.
    #[serde(default)]
    pub map_position: Option<[i32; 2]>,
    pub rooms: Vec<RoomLayout>,
}

/// Every playable quest in map order, plus the optional training dungeon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestCatalog {
    #[serde(default)]
    pub training: Option<QuestDef>,
    pub quests: Vec<QuestDef>,
}

impl QuestDef {
    pub fn map_position(&self, index: usize) -> (i32, i32) {
        match self.map_position {
            Some([x, y]) => (x, y),
            None => (1 + 2 * index as i32, 4),
        }
    }

    fn validate(&self, path: &str) -> Result<(), ContentError> {
        if self.name.is_empty() {
            return Err(ContentError::invalid(format!("{path}.name"), "must not be empty"));
        }
        if self.rooms.is_empty() || self.rooms.len() > MAX_QUEST_ROOMS {
            return Err(ContentError::expected_actual(
                format!("{path}.rooms"),
                format!("1..={MAX_QUEST_ROOMS} rooms"),
                self.rooms.len(),
            ));
        }

        let mut exits_by_room = HashMap::new();
        for (index, room) in self.rooms.iter().enumerate() {
            let room_path = format!("{path}.rooms[{index}]");
            room.validate(&room_path)?;
            if exits_by_room
                .insert(room.name.as_str(), room.exits.len())
                .is_some()
            {
                return Err(ContentError::invalid(
                    format!("{room_path}.name"),
                    format!("duplicate room name '{}'", room.name),
                ));
            }
        }

        let entry_in_range = |room: &str, entry: u8| {
            exits_by_room
                .get(room)
                .map(|exits| usize::from(entry) < *exits)
        };
        match entry_in_range(&self.start_room, self.start_entry) {
            None => {
                return Err(ContentError::invalid(
                    format!("{path}.start_room"),
                    format!("no room named '{}'", self.start_room),
                ))
            }
            Some(false) => {
                return Err(ContentError::invalid(
                    format!("{path}.start_entry"),
                    format!("room '{}' has no exit {}", self.start_room, self.start_entry),
                ))
            }
            Some(true) => {}
        }

        for (room_index, room) in self.rooms.iter().enumerate() {
            for (exit_index, exit) in room.exits.iter().enumerate() {
                let Some(target) = &exit.destination else {
                    continue;
                };
                if entry_in_range(&target.room, target.entry) != Some(true) {
                    return Err(ContentError::invalid(
                        format!("{path}.rooms[{room_index}].exits[{exit_index}].destination"),
                        format!(
                            "'{}' entry {} does not resolve to an exit",
                            target.room, target.entry
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl QuestCatalog {
    pub fn quest(&self, index: usize) -> Option<&QuestDef> {
        self.quests.get(index)
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.quests.is_empty() || self.quests.len() > QUEST_COUNT {
            return Err(ContentError::expected_actual(
                "quests",
                format!("1..={QUEST_COUNT} quests"),
                self.quests.len(),
            ));
        }
        if let Some(training) = &self.training {
            training.validate("training")?;
        }
        let mut names = HashSet::new();
        for (index, quest) in self.quests.iter().enumerate() {
            let path = format!("quests[{index}]");
            quest.validate(&path)?;
            if !names.insert(quest.name.as_str()) {
                return Err(ContentError::invalid(
                    format!("{path}.name"),
                    format!("duplicate quest name '{}'", quest.name),
                ));
            }
        }
        Ok(())
    }
}

pub fn parse_catalog(raw: &str, path: &Path) -> Result<QuestCatalog, ContentError> {
    let catalog: QuestCatalog =
        parse_json_with_path(raw).map_err(|(json_path, message)| ContentError::Parse {
            path: path.to_path_buf(),
            json_path,
            message,
        })?;
    catalog.validate()?;
    Ok(catalog)
}

/// The catalogue is required; a missing file is an error.
pub fn load_catalog(path: &Path) -> Result<QuestCatalog, ContentError> {
    let bytes = read_optional(path)
        .map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| ContentError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "quest catalog missing"),
        })?;
    let raw = String::from_utf8_lossy(&bytes);
    let catalog = parse_catalog(&raw, path)?;
    info!(
        path = %path.display(),
        quests = catalog.quests.len(),
        training = catalog.training.is_some(),
        rooms = catalog.quests.iter().map(|quest| quest.rooms.len()).sum::<usize>(),
        "quest_catalog_loaded"
    );
    Ok(catalog)
}
