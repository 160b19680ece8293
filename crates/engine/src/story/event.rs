use std::collections::VecDeque;

use crate::app::SoundId;

/// Messages from sprites and rooms to the active story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryEvent {
    /// Sent to a story that has just been installed.
    GameBegins,
    RoomChange { room: String, entry: u8 },
    RoomScroll { dx: i32, dy: i32, dz: i32 },
    NewEntryPoint { entry: u8 },
    PlayerKilled,
    QuestComplete,
    QuestAbort,
    SwitchToggled { switch: u8, on: bool },
    MonsterKilled,
    Sound(SoundId),
}

impl StoryEvent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            StoryEvent::GameBegins => "game_begins",
            StoryEvent::RoomChange { .. } => "room_change",
            StoryEvent::RoomScroll { .. } => "room_scroll",
            StoryEvent::NewEntryPoint { .. } => "new_entry_point",
            StoryEvent::PlayerKilled => "player_killed",
            StoryEvent::QuestComplete => "quest_complete",
            StoryEvent::QuestAbort => "quest_abort",
            StoryEvent::SwitchToggled { .. } => "switch_toggled",
            StoryEvent::MonsterKilled => "monster_killed",
            StoryEvent::Sound(_) => "sound",
        }
    }
}

/// FIFO of story events. Emptied by the active story every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryEvents {
    queue: VecDeque<StoryEvent>,
}

impl StoryEvents {
    pub fn push(&mut self, event: StoryEvent) {
        self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<StoryEvent> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<StoryEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Extend<StoryEvent> for StoryEvents {
    fn extend<T: IntoIterator<Item = StoryEvent>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}
