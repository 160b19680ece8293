use tracing::{info, warn};

use crate::app::{Canvas, InputSnapshot};
use crate::save::SaveStore;
use crate::sim::{Env, SpriteManager};

use super::{StartupStory, Story, StoryEvent, StoryEvents, StoryStep};

/// Owns the active story, the sprites and the per-tick context, and advances
/// them once per fixed tick.
pub struct GameManager {
    story: Option<Box<dyn Story>>,
    events: StoryEvents,
    sprites: SpriteManager,
    env: Env,
    store: Box<dyn SaveStore>,
}

impl GameManager {
    pub fn new(env: Env, store: Box<dyn SaveStore>) -> Self {
        Self::with_story(Box::new(StartupStory::new()), env, store)
    }

    pub fn with_story(story: Box<dyn Story>, env: Env, store: Box<dyn SaveStore>) -> Self {
        let mut events = StoryEvents::default();
        events.push(StoryEvent::GameBegins);
        info!(story = story.name(), seed = env.rng.seed(), "game_started");
        Self {
            story: Some(story),
            events,
            sprites: SpriteManager::new(),
            env,
            store,
        }
    }

    /// One fixed tick. Returns false once the game has exited.
    pub fn tick(&mut self, input: InputSnapshot) -> bool {
        let Some(story) = self.story.take() else {
            return false;
        };
        self.env.begin_tick(input);
        let name = story.name();

        match story.advance(&mut self.events, &mut self.sprites, &mut self.env) {
            StoryStep::Continue(story) => {
                if !self.events.is_empty() {
                    debug_assert!(
                        self.events.is_empty(),
                        "story {name} left {} events queued",
                        self.events.len()
                    );
                    warn!(story = name, pending = self.events.len(), "story_events_left");
                    self.events.clear();
                }
                self.story = Some(story);
            }
            StoryStep::Replace(next) => {
                info!(
                    from = name,
                    to = next.name(),
                    handed_over = self.events.len(),
                    tick = self.env.tick_count(),
                    "story_transition"
                );
                self.story = Some(next);
            }
            StoryStep::Exit => {
                info!(story = name, tick = self.env.tick_count(), "game_exit");
            }
        }

        self.persist();
        self.story.is_some()
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.sprites.draw(canvas);
        if let Some(story) = &self.story {
            story.draw_overlay(canvas, &self.env);
        }
    }

    pub fn is_running(&self) -> bool {
        self.story.is_some()
    }

    pub fn story_name(&self) -> Option<&'static str> {
        self.story.as_ref().map(|story| story.name())
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn sprites(&self) -> &SpriteManager {
        &self.sprites
    }

    /// Final save flush when the window closes.
    pub fn shutdown(&mut self) {
        self.persist();
        info!(tick = self.env.tick_count(), "game_shutdown");
    }

    fn persist(&mut self) {
        if let Err(error) = self.env.save.persist_if_dirty(self.store.as_mut()) {
            warn!(%error, "save_write_failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{EgaCanvas, InputAction, CANVAS_HEIGHT, CANVAS_WIDTH};
    use crate::save::{MemorySaveStore, SaveState};
    use crate::testing::test_env;

    fn press(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_pressed(action, true)
    }

    fn idle_until(game: &mut GameManager, story: &str, limit: usize) {
        for _ in 0..limit {
            if game.story_name() == Some(story) {
                return;
            }
            game.tick(InputSnapshot::empty());
        }
        assert_eq!(game.story_name(), Some(story));
    }

    #[test]
    fn queue_is_empty_after_every_continued_tick() {
        let mut game = GameManager::new(test_env(), Box::new(MemorySaveStore::default()));
        let delay = game.env().config.timings.title_delay_ticks as usize;
        let pages = game.env().quests.quests[0].briefing_pages.len();
        let play = [Some(InputAction::Fire), Some(InputAction::Right), None];

        let mut script = vec![None; delay + 1];
        script.push(Some(InputAction::Fire));
        script.extend(play.iter().copied().cycle().take(30));
        script.push(Some(InputAction::Escape));
        script.push(None);
        script.extend(vec![Some(InputAction::Fire); pages + 1]);
        script.extend(play.iter().copied().cycle().take(30));
        script.push(Some(InputAction::Escape));
        script.push(Some(InputAction::Fire));
        script.push(None);

        let mut visited = Vec::new();
        for action in script {
            let input = action.map_or_else(InputSnapshot::empty, press);
            let before = game.story_name();
            assert!(game.tick(input));
            let after = game.story_name();
            if after == before {
                assert!(game.events.is_empty(), "events left after {before:?}");
            }
            if let Some(name) = after {
                if visited.last() != Some(&name) {
                    visited.push(name);
                }
            }
        }
        assert_eq!(
            visited,
            vec!["startup", "training", "map", "intro", "tiny", "quit", "tiny", "map"]
        );
    }

    #[test]
    fn first_run_walks_from_title_through_training_to_the_map() {
        let mut game = GameManager::new(test_env(), Box::new(MemorySaveStore::default()));
        assert_eq!(game.story_name(), Some("startup"));

        let delay = game.env().config.timings.title_delay_ticks as usize;
        for _ in 0..=delay {
            game.tick(InputSnapshot::empty());
        }
        game.tick(press(InputAction::Fire));
        assert_eq!(game.story_name(), Some("training"));

        game.tick(InputSnapshot::empty());
        assert!(game.sprites().len() > 0);
        game.tick(press(InputAction::Escape));
        assert_eq!(game.story_name(), Some("map"));
        assert!(game.env().save.training_done());
    }

    #[test]
    fn dirty_save_is_written_by_the_tick_that_changed_it() {
        let mut env = test_env();
        env.save.mark_training_done();
        let mut game = GameManager::new(env, Box::new(MemorySaveStore::default()));
        assert!(game.env().save.is_dirty());

        game.tick(InputSnapshot::empty());

        assert!(!game.env().save.is_dirty());
        let bytes = game
            .store
            .load()
            .expect("memory store")
            .expect("saved bytes");
        assert!(SaveState::from_bytes(&bytes).training_done());
    }

    #[test]
    fn escape_on_the_map_ends_the_game() {
        let mut env = test_env();
        env.save.mark_training_done();
        let mut game = GameManager::new(env, Box::new(MemorySaveStore::default()));
        let delay = game.env().config.timings.title_delay_ticks as usize;
        for _ in 0..=delay {
            game.tick(InputSnapshot::empty());
        }
        game.tick(press(InputAction::Fire));
        idle_until(&mut game, "map", 3);

        assert!(!game.tick(press(InputAction::Escape)));
        assert!(!game.is_running());
        assert!(!game.tick(InputSnapshot::empty()));
    }

    #[test]
    fn draw_renders_the_active_screen() {
        let mut env = test_env();
        env.save.mark_training_done();
        let mut game = GameManager::new(env, Box::new(MemorySaveStore::default()));
        let delay = game.env().config.timings.title_delay_ticks as usize;
        for _ in 0..=delay {
            game.tick(InputSnapshot::empty());
        }
        game.tick(press(InputAction::Fire));
        game.tick(InputSnapshot::empty());
        assert_eq!(game.story_name(), Some("map"));

        let mut canvas = EgaCanvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        game.draw(&mut canvas);
        let painted = (0..CANVAS_HEIGHT as i32)
            .flat_map(|y| (0..CANVAS_WIDTH as i32).map(move |x| (x, y)))
            .filter(|(x, y)| canvas.pixel(*x, *y) != Some(crate::app::EgaColor::Black))
            .count();
        assert!(painted > 0);
    }
}
