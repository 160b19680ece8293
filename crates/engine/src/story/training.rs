use tracing::info;

use crate::app::{InputAction, InputMode};
use crate::content::QuestDef;
use crate::sim::{Env, SpriteManager};

use super::dungeon::{DungeonRun, RunOutcome};
use super::{MapStory, ScrollStory, Story, StoryEvent, StoryEvents, StoryStep};

/// First-run tutorial dungeon. Finishing or skipping it marks training done;
/// nothing is scored and no resume snapshot is written.
pub struct TrainingStory {
    run: DungeonRun,
}

impl TrainingStory {
    pub fn new(def: &QuestDef) -> Option<Self> {
        DungeonRun::new("training", def).map(|run| Self { run })
    }

    fn leave(events: &mut StoryEvents, env: &mut Env, reason: &'static str) -> StoryStep {
        env.save.mark_training_done();
        info!(reason, "training_finished");
        events.push(StoryEvent::GameBegins);
        StoryStep::Replace(Box::new(MapStory::new()))
    }
}

impl Story for TrainingStory {
    fn name(&self) -> &'static str {
        "training"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Game);
        match self.run.step(events, sprites, env) {
            RunOutcome::Completed => Self::leave(events, env, "completed"),
            RunOutcome::Aborted => Self::leave(events, env, "aborted"),
            RunOutcome::Scroll { dx, dy, dz } => {
                StoryStep::Replace(Box::new(ScrollStory::new(self, dx, dy, dz, sprites, env)))
            }
            RunOutcome::Running if env.input.was_pressed(InputAction::Escape) => {
                Self::leave(events, env, "skipped")
            }
            RunOutcome::Running => StoryStep::Continue(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::InputSnapshot;
    use crate::testing::test_env;

    fn begun(env: &mut Env, sprites: &mut SpriteManager) -> Box<dyn Story> {
        let def = env.quests.training.clone().expect("training quest");
        let mut events = StoryEvents::default();
        events.push(StoryEvent::GameBegins);
        match Box::new(TrainingStory::new(&def).expect("training")).advance(
            &mut events,
            sprites,
            env,
        ) {
            StoryStep::Continue(story) => story,
            _ => panic!("training should keep running"),
        }
    }

    #[test]
    fn reaching_the_goal_marks_training_done() {
        let mut env = test_env();
        let mut sprites = SpriteManager::new();
        let mut events = StoryEvents::default();
        let training = begun(&mut env, &mut sprites);
        assert!(!env.save.training_done());

        events.push(StoryEvent::QuestComplete);
        match training.advance(&mut events, &mut sprites, &mut env) {
            StoryStep::Replace(next) => assert_eq!(next.name(), "map"),
            _ => panic!("expected the map"),
        }
        assert!(env.save.training_done());
        assert!(env.save.resume().is_none());
        assert_eq!(env.save.score(0), 0);
    }

    #[test]
    fn escape_skips_training() {
        let mut env = test_env();
        let mut sprites = SpriteManager::new();
        let mut events = StoryEvents::default();
        let training = begun(&mut env, &mut sprites);

        env.begin_tick(InputSnapshot::empty().with_pressed(InputAction::Escape, true));
        match training.advance(&mut events, &mut sprites, &mut env) {
            StoryStep::Replace(next) => assert_eq!(next.name(), "map"),
            _ => panic!("expected the map"),
        }
        assert!(env.save.training_done());
        assert_eq!(events.drain(), vec![StoryEvent::GameBegins]);
    }
}
