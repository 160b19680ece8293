use std::collections::HashMap;

use tracing::warn;

use crate::content::QuestDef;
use crate::save::{BitError, BitString};

use super::{Room, RoomId, RoomLayout};

/// Every room of the quest being played, addressed by `RoomId`.
#[derive(Debug, Clone, Default)]
pub struct RoomTable {
    rooms: Vec<Room>,
    by_name: HashMap<String, RoomId>,
}

impl RoomTable {
    pub fn from_layouts(layouts: impl IntoIterator<Item = RoomLayout>) -> Self {
        let mut table = RoomTable::default();
        for layout in layouts {
            let id = RoomId(table.rooms.len());
            table.by_name.entry(layout.name.clone()).or_insert(id);
            table.rooms.push(Room::new(id, layout));
        }
        table
    }

    pub fn from_quest(quest: &QuestDef) -> Self {
        Self::from_layouts(quest.rooms.iter().cloned())
    }

    pub fn find(&self, name: &str) -> Option<RoomId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    pub fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn save_all(&self) -> Result<Vec<BitString>, BitError> {
        self.rooms.iter().map(Room::save_state).collect()
    }

    /// All rooms take their saved state, or none of them do.
    pub fn restore_all(&mut self, states: &[BitString]) -> bool {
        if states.len() != self.rooms.len() {
            warn!(
                expected = self.rooms.len(),
                actual = states.len(),
                "room_count_mismatch"
            );
            return false;
        }
        let mut restored = self.rooms.clone();
        for (room, state) in restored.iter_mut().zip(states) {
            if !room.restore_state(state) {
                warn!(room = %room.name(), "room_restore_rejected");
                return false;
            }
        }
        self.rooms = restored;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::room::Exit;
    use crate::sim::SpriteManager;
    use crate::story::StoryEvent;

    fn table() -> RoomTable {
        RoomTable::from_layouts([
            RoomLayout::new("A1", 4, 4)
                .with_exit(Exit::new(Direction::PosX, 1).to("B2", 0).closed())
                .with_switch(1, 1, &[0]),
            RoomLayout::new("B2", 4, 4).with_exit(Exit::new(Direction::NegX, 1).to("A1", 0)),
        ])
    }

    #[test]
    fn rooms_are_found_by_name() {
        let table = table();

        assert_eq!(table.find("B2"), Some(RoomId(1)));
        assert_eq!(table.find("C3"), None);
        assert_eq!(table.get(RoomId(0)).map(Room::name), Some("A1"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn restore_is_all_or_nothing() {
        let mut source = table();
        let mut sprites = SpriteManager::new();
        source
            .get_mut(RoomId(0))
            .expect("A1")
            .handle_event(&StoryEvent::SwitchToggled { switch: 0, on: true }, &mut sprites);
        let saved = source.save_all().expect("save");

        let mut fresh = RoomTable::from_layouts([
            RoomLayout::new("A1", 4, 4)
                .with_exit(Exit::new(Direction::PosX, 1).to("B2", 0).closed())
                .with_switch(1, 1, &[0]),
            RoomLayout::new("B2", 4, 4),
        ]);
        assert!(!fresh.restore_all(&saved));
        assert_eq!(fresh.get(RoomId(0)).map(|room| room.switch_states()[0]), Some(false));

        let mut same = table();
        assert!(same.restore_all(&saved));
        assert_eq!(same.get(RoomId(0)).and_then(|room| room.is_door_open(0)), Some(true));
        assert!(!same.restore_all(&saved[..1]));
    }
}
