use tracing::{debug, info, warn};

use crate::app::{InputAction, InputMode, SoundId};
use crate::content::QuestDef;
use crate::room::{RoomId, RoomTable};
use crate::save::{BitString, ResumeSnapshot, MAX_SNAPSHOT_DEATHS};
use crate::sim::{Env, SpriteManager};

use super::{
    drop_unhandled, EndStory, MapStory, QuitStory, ScrollStory, Story, StoryEvent, StoryEvents,
    StoryStep,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    Running,
    Scroll { dx: i32, dy: i32, dz: i32 },
    Completed,
    Aborted,
}

impl RunOutcome {
    /// Ending the run outranks a scroll, which outranks nothing happening.
    fn then(self, later: RunOutcome) -> RunOutcome {
        match (self, later) {
            (RunOutcome::Running, _) => later,
            (RunOutcome::Scroll { .. }, RunOutcome::Completed | RunOutcome::Aborted) => later,
            _ => self,
        }
    }
}

/// Room switching, checkpoints and deaths, shared by every dungeon-like story.
pub(crate) struct DungeonRun {
    story: &'static str,
    rooms: RoomTable,
    start: (RoomId, u8),
    current: RoomId,
    checkpoint: u8,
    /// Puzzle state of the current room as it was on entry.
    entry_state: BitString,
    deaths: u32,
    monsters_killed: u32,
    respawn_in: Option<u32>,
    resume_quest: Option<u8>,
}

impl DungeonRun {
    pub(crate) fn new(story: &'static str, quest: &QuestDef) -> Option<Self> {
        let rooms = RoomTable::from_quest(quest);
        let Some(start) = rooms.find(&quest.start_room) else {
            warn!(quest = %quest.name, room = %quest.start_room, "start_room_missing");
            return None;
        };
        Some(Self {
            story,
            rooms,
            start: (start, quest.start_entry),
            current: start,
            checkpoint: quest.start_entry,
            entry_state: BitString::default(),
            deaths: 0,
            monsters_killed: 0,
            respawn_in: None,
            resume_quest: None,
        })
    }

    /// Write a resume snapshot for `quest` on every room change.
    pub(crate) fn recording_resume(mut self, quest: u8) -> Self {
        self.resume_quest = Some(quest);
        self
    }

    /// Continue from a snapshot. Leaves the run untouched when the snapshot
    /// does not fit this quest.
    pub(crate) fn resume_from(&mut self, snapshot: &ResumeSnapshot) -> bool {
        let room = RoomId(usize::from(snapshot.room));
        let Some(target) = self.rooms.get(room) else {
            warn!(story = self.story, room = snapshot.room, "resume_room_missing");
            return false;
        };
        if usize::from(snapshot.entry) >= target.exits().len() {
            warn!(story = self.story, entry = snapshot.entry, "resume_entry_missing");
            return false;
        }
        if !self.rooms.restore_all(&snapshot.room_states) {
            return false;
        }
        self.start = (room, snapshot.entry);
        self.current = room;
        self.checkpoint = snapshot.entry;
        self.deaths = u32::from(snapshot.deaths);
        true
    }

    pub(crate) fn deaths(&self) -> u32 {
        self.deaths
    }

    pub(crate) fn current_room(&self) -> RoomId {
        self.current
    }

    pub(crate) fn checkpoint(&self) -> u8 {
        self.checkpoint
    }

    pub(crate) fn monsters_killed(&self) -> u32 {
        self.monsters_killed
    }

    /// One tick of play. The event queue is empty afterwards.
    pub(crate) fn step(
        &mut self,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> RunOutcome {
        self.tick_respawn(sprites, env);
        let mut outcome = self.handle_events(events, sprites, env);
        if matches!(outcome, RunOutcome::Completed | RunOutcome::Aborted) {
            return outcome;
        }

        sprites.tick(env, events);
        outcome = outcome.then(self.handle_events(events, sprites, env));

        if outcome == RunOutcome::Running {
            if let Some(event) = self.check_room_edges(sprites) {
                events.push(event);
                outcome = self.handle_events(events, sprites, env);
            }
        }
        outcome
    }

    fn handle_events(
        &mut self,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> RunOutcome {
        let mut outcome = RunOutcome::Running;
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::GameBegins => {
                    let (room, entry) = self.start;
                    self.enter(room, entry, sprites, env);
                }
                StoryEvent::RoomChange { ref room, entry } => match self.rooms.find(room) {
                    Some(id) => self.enter(id, entry, sprites, env),
                    None => warn!(story = self.story, room = %room, "room_change_unknown"),
                },
                StoryEvent::RoomScroll { dx, dy, dz } => {
                    outcome = outcome.then(RunOutcome::Scroll { dx, dy, dz });
                }
                StoryEvent::NewEntryPoint { entry } => {
                    self.checkpoint = entry;
                    debug!(story = self.story, entry, "checkpoint_reached");
                }
                StoryEvent::PlayerKilled => {
                    self.deaths = self.deaths.saturating_add(1);
                    self.respawn_in = Some(env.config.timings.death_delay_ticks);
                    info!(story = self.story, deaths = self.deaths, "player_killed");
                }
                StoryEvent::QuestComplete => outcome = outcome.then(RunOutcome::Completed),
                StoryEvent::QuestAbort => outcome = outcome.then(RunOutcome::Aborted),
                StoryEvent::SwitchToggled { .. } => {
                    let handled = self
                        .rooms
                        .get_mut(self.current)
                        .is_some_and(|room| room.handle_event(&event, sprites));
                    if handled {
                        env.play(SoundId::Door);
                    } else {
                        drop_unhandled(self.story, &event);
                    }
                }
                StoryEvent::MonsterKilled => {
                    self.monsters_killed = self.monsters_killed.saturating_add(1);
                }
                StoryEvent::Sound(sound) => env.play(sound),
            }
        }
        outcome
    }

    fn check_room_edges(&self, sprites: &SpriteManager) -> Option<StoryEvent> {
        let room = self.rooms.get(self.current)?;
        if let Some(exit) = room.check_exits(sprites) {
            let target = room.exits().get(exit)?.destination.as_ref()?;
            return Some(StoryEvent::RoomChange {
                room: target.room.clone(),
                entry: target.entry,
            });
        }
        room.check_horizontal_scroll(sprites)
            .or_else(|| room.check_vertical_scroll(sprites))
    }

    fn enter(&mut self, id: RoomId, entry: u8, sprites: &mut SpriteManager, env: &mut Env) {
        let Some(room) = self.rooms.get_mut(id) else {
            warn!(story = self.story, room = id.0, "room_missing");
            return;
        };
        room.populate(sprites, &env.config);
        room.create_player(usize::from(entry), sprites, &env.config);
        self.entry_state = room.save_state().unwrap_or_else(|error| {
            warn!(%error, room = %room.name(), "room_snapshot_failed");
            BitString::default()
        });
        info!(story = self.story, room = %room.name(), entry, "room_entered");
        self.current = id;
        self.checkpoint = entry;
        self.respawn_in = None;
        self.record_resume(env);
    }

    fn record_resume(&self, env: &mut Env) {
        let Some(quest) = self.resume_quest else {
            return;
        };
        let room_states = match self.rooms.save_all() {
            Ok(states) => states,
            Err(error) => {
                warn!(%error, story = self.story, "resume_snapshot_failed");
                return;
            }
        };
        env.save.set_resume(ResumeSnapshot {
            quest,
            room: u8::try_from(self.current.0).unwrap_or(u8::MAX),
            entry: self.checkpoint,
            deaths: snapshot_deaths(self.deaths),
            room_states,
        });
    }

    fn tick_respawn(&mut self, sprites: &mut SpriteManager, env: &mut Env) {
        match self.respawn_in {
            None => {}
            Some(remaining) if remaining > 1 => self.respawn_in = Some(remaining - 1),
            Some(_) => {
                self.respawn_in = None;
                self.respawn(sprites, env);
            }
        }
    }

    /// Put the room back the way it was entered and the player at the last
    /// checkpoint.
    fn respawn(&mut self, sprites: &mut SpriteManager, env: &mut Env) {
        let Some(room) = self.rooms.get_mut(self.current) else {
            return;
        };
        if !room.restore_state(&self.entry_state) {
            warn!(story = self.story, room = %room.name(), "room_reset_rejected");
        }
        room.populate(sprites, &env.config);
        room.create_player(usize::from(self.checkpoint), sprites, &env.config);
        info!(
            story = self.story,
            room = %room.name(),
            entry = self.checkpoint,
            deaths = self.deaths,
            "player_respawned"
        );
    }
}

/// A quest from the map: plays until the goal is reached or the player quits.
pub struct TinyStory {
    quest: usize,
    run: DungeonRun,
}

impl TinyStory {
    pub fn new(quest: usize, def: &QuestDef) -> Option<Self> {
        let run = DungeonRun::new("tiny", def)?.recording_resume(quest as u8);
        Some(Self { quest, run })
    }

    /// `None` when the snapshot cannot be applied to this quest.
    pub fn resume(quest: usize, def: &QuestDef, snapshot: &ResumeSnapshot) -> Option<Self> {
        let mut story = Self::new(quest, def)?;
        story.run.resume_from(snapshot).then_some(story)
    }

    pub fn quest(&self) -> usize {
        self.quest
    }

    pub fn deaths(&self) -> u32 {
        self.run.deaths()
    }

    pub fn current_room(&self) -> RoomId {
        self.run.current_room()
    }
}

impl Story for TinyStory {
    fn name(&self) -> &'static str {
        "tiny"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Game);
        match self.run.step(events, sprites, env) {
            RunOutcome::Completed => {
                info!(
                    quest = self.quest,
                    deaths = self.deaths(),
                    monsters_killed = self.run.monsters_killed(),
                    "quest_complete"
                );
                events.push(StoryEvent::GameBegins);
                StoryStep::Replace(Box::new(EndStory::new(self.quest, self.deaths())))
            }
            RunOutcome::Aborted => {
                info!(quest = self.quest, "quest_aborted");
                events.push(StoryEvent::GameBegins);
                StoryStep::Replace(Box::new(MapStory::selecting(self.quest)))
            }
            RunOutcome::Scroll { dx, dy, dz } => {
                StoryStep::Replace(Box::new(ScrollStory::new(self, dx, dy, dz, sprites, env)))
            }
            RunOutcome::Running if env.input.was_pressed(InputAction::Escape) => {
                StoryStep::Replace(Box::new(QuitStory::new(self, sprites)))
            }
            RunOutcome::Running => StoryStep::Continue(self),
        }
    }
}

/// The run keeps counting past the snapshot field; the snapshot saturates.
fn snapshot_deaths(deaths: u32) -> u8 {
    u8::try_from(deaths.min(u32::from(MAX_SNAPSHOT_DEATHS))).unwrap_or(MAX_SNAPSHOT_DEATHS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::InputSnapshot;
    use crate::geometry::{Direction, GridPos, SCREEN_BLOCKS};
    use crate::room::CameraLevel;
    use crate::sprites::Player;
    use crate::testing::{test_env, test_quest};

    fn started(quest: &QuestDef, env: &mut Env) -> (DungeonRun, SpriteManager, StoryEvents) {
        let mut run = DungeonRun::new("test", quest)
            .expect("start room")
            .recording_resume(0);
        let mut sprites = SpriteManager::new();
        let mut events = StoryEvents::default();
        events.push(StoryEvent::GameBegins);
        assert_eq!(run.step(&mut events, &mut sprites, env), RunOutcome::Running);
        (run, sprites, events)
    }

    fn player(sprites: &SpriteManager) -> Option<&Player> {
        sprites.view().first_of::<Player>().map(|(_, player)| player)
    }

    #[test]
    fn game_begins_enters_the_start_room() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let (run, sprites, events) = started(&quest, &mut env);

        assert_eq!(run.current_room(), RoomId(0));
        let player = player(&sprites).expect("player");
        assert_eq!((player.pos().x, player.pos().y), (0, 1));
        assert_eq!(player.facing(), Direction::PosX);
        assert!(events.is_empty());
    }

    #[test]
    fn room_change_moves_the_player_and_records_a_snapshot() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);

        events.push(StoryEvent::RoomChange {
            room: "B2".to_string(),
            entry: 3,
        });
        let outcome = run.step(&mut events, &mut sprites, &mut env);

        assert_eq!(outcome, RunOutcome::Running);
        assert!(events.is_empty());
        assert_eq!(run.current_room(), RoomId(1));
        assert_eq!(run.checkpoint(), 3);
        let player = player(&sprites).expect("player in B2");
        assert_eq!((player.pos().x, player.pos().y), (11, 11));
        assert_eq!(player.facing(), Direction::NegX);
        assert_eq!(sprites.camera().origin(), (10, 10));

        let snapshot = env.save.resume().expect("resume snapshot");
        assert_eq!((snapshot.quest, snapshot.room, snapshot.entry), (0, 1, 3));
        assert_eq!(snapshot.room_states.len(), 2);
    }

    #[test]
    fn walking_through_a_door_enters_the_next_room() {
        let mut env = test_env();
        env.config.timings.player_step_ticks = 1;
        let mut quest = test_quest("Cellar");
        let raised = &mut quest.rooms[1];
        raised.floor_z = 12;
        raised.camera_levels = vec![
            CameraLevel {
                z_min: i32::MIN,
                z_offset: 0,
            },
            CameraLevel {
                z_min: 8,
                z_offset: 12,
            },
        ];
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);

        // the east door is one row below the entry cell
        env.begin_tick(InputSnapshot::empty().with_held(InputAction::Down, true));
        run.step(&mut events, &mut sprites, &mut env);
        let right = InputSnapshot::empty().with_held(InputAction::Right, true);
        for _ in 0..20 {
            if run.current_room() == RoomId(1) {
                break;
            }
            env.begin_tick(right);
            assert_eq!(run.step(&mut events, &mut sprites, &mut env), RunOutcome::Running);
        }

        assert_eq!(run.current_room(), RoomId(1));
        assert_eq!(run.checkpoint(), 0);
        let player = player(&sprites).expect("player in B2");
        assert_eq!(player.pos(), GridPos::new(0, 2, 12));
        assert_eq!(player.facing(), Direction::PosX);
        assert_eq!(sprites.camera().level(), 1);
        assert_eq!(sprites.camera().level_z(), 12);
        assert_eq!(sprites.camera().origin(), (0, 0));
        assert_eq!(env.save.resume().map(|snapshot| snapshot.room), Some(1));
    }

    #[test]
    fn snapshot_death_count_saturates_but_the_run_keeps_counting() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);
        run.deaths = 300;

        events.push(StoryEvent::RoomChange {
            room: "B2".to_string(),
            entry: 3,
        });
        run.step(&mut events, &mut sprites, &mut env);

        assert_eq!(run.deaths(), 300);
        let snapshot = env.save.resume().expect("resume snapshot");
        assert_eq!(snapshot.deaths, MAX_SNAPSHOT_DEATHS);
        assert_eq!(snapshot_deaths(254), 254);
    }

    #[test]
    fn unknown_room_change_is_ignored() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);

        events.push(StoryEvent::RoomChange {
            room: "Z9".to_string(),
            entry: 0,
        });
        run.step(&mut events, &mut sprites, &mut env);

        assert_eq!(run.current_room(), RoomId(0));
        assert!(player(&sprites).is_some());
    }

    #[test]
    fn leaving_the_screen_requests_exactly_one_scroll() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);
        events.push(StoryEvent::RoomChange {
            room: "B2".to_string(),
            entry: 3,
        });
        run.step(&mut events, &mut sprites, &mut env);

        let camera = sprites.camera_mut();
        camera.set_origin(0, 10);
        let outcome = run.step(&mut events, &mut sprites, &mut env);
        assert_eq!(
            outcome,
            RunOutcome::Scroll {
                dx: SCREEN_BLOCKS,
                dy: 0,
                dz: 0
            }
        );
        assert!(events.is_empty());

        let shifted = sprites.camera().shifted(SCREEN_BLOCKS, 0, 0);
        *sprites.camera_mut() = shifted;
        assert_eq!(run.step(&mut events, &mut sprites, &mut env), RunOutcome::Running);
    }

    #[test]
    fn death_respawns_at_the_checkpoint_after_the_delay() {
        let mut env = test_env();
        let delay = env.config.timings.death_delay_ticks;
        let quest = test_quest("Cellar");
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);
        events.push(StoryEvent::RoomChange {
            room: "B2".to_string(),
            entry: 3,
        });
        run.step(&mut events, &mut sprites, &mut env);
        events.push(StoryEvent::NewEntryPoint { entry: 0 });
        run.step(&mut events, &mut sprites, &mut env);

        let (id, _) = sprites.view().first_of::<Player>().expect("player");
        sprites.kill(id);
        sprites.apply_pending();
        events.push(StoryEvent::PlayerKilled);
        for _ in 0..delay {
            run.step(&mut events, &mut sprites, &mut env);
        }
        assert!(player(&sprites).is_none());

        run.step(&mut events, &mut sprites, &mut env);
        let player = player(&sprites).expect("respawned player");
        assert_eq!((player.pos().x, player.pos().y), (0, 2));
        assert_eq!(run.deaths(), 1);
        assert_eq!(run.current_room(), RoomId(1));
    }

    #[test]
    fn quest_complete_outranks_a_pending_scroll() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let (mut run, mut sprites, mut events) = started(&quest, &mut env);

        events.push(StoryEvent::RoomScroll {
            dx: SCREEN_BLOCKS,
            dy: 0,
            dz: 0,
        });
        events.push(StoryEvent::QuestComplete);

        assert_eq!(
            run.step(&mut events, &mut sprites, &mut env),
            RunOutcome::Completed
        );
    }

    #[test]
    fn resume_rejects_a_snapshot_for_a_different_layout() {
        let quest = test_quest("Cellar");
        let mut run = DungeonRun::new("test", &quest).expect("start room");
        let snapshot = ResumeSnapshot {
            quest: 0,
            room: 1,
            entry: 3,
            deaths: 2,
            room_states: vec![BitString::default()],
        };

        assert!(!run.resume_from(&snapshot));
        assert_eq!(run.current_room(), RoomId(0));
        assert_eq!(run.deaths(), 0);
    }

    #[test]
    fn tiny_story_wraps_itself_for_scrolls_and_quits() {
        let mut env = test_env();
        let quest = test_quest("Cellar");
        let mut sprites = SpriteManager::new();
        let mut events = StoryEvents::default();
        events.push(StoryEvent::GameBegins);
        let story: Box<dyn Story> = Box::new(TinyStory::new(0, &quest).expect("quest"));

        let story = match story.advance(&mut events, &mut sprites, &mut env) {
            StoryStep::Continue(story) => story,
            _ => panic!("expected the dungeon to keep running"),
        };

        env.begin_tick(InputSnapshot::empty().with_pressed(InputAction::Escape, true));
        match story.advance(&mut events, &mut sprites, &mut env) {
            StoryStep::Replace(next) => assert_eq!(next.name(), "quit"),
            _ => panic!("expected a quit prompt"),
        }
        assert!(events.is_empty());
    }
}
