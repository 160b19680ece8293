use tracing::{info, warn};

use crate::app::{Canvas, InputAction, InputMode, SoundId, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::{Env, SpriteManager};

use super::{
    drop_unhandled, reset_screen, MapStory, Story, StoryEvent, StoryEvents, StoryStep,
    TrainingStory,
};

pub const TITLE_IMAGE: &str = "title";

/// Title screen. After a short delay any key moves on: to training on the
/// first run, otherwise to the map.
#[derive(Debug, Default)]
pub struct StartupStory {
    elapsed: u32,
}

impl StartupStory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(events: &mut StoryEvents, env: &Env) -> StoryStep {
        events.push(StoryEvent::GameBegins);
        if !env.save.training_done() {
            if let Some(training) = env.quests.training.as_ref().and_then(TrainingStory::new) {
                info!("training_started");
                return StoryStep::Replace(Box::new(training));
            }
        }
        StoryStep::Replace(Box::new(MapStory::new()))
    }
}

impl Story for StartupStory {
    fn name(&self) -> &'static str {
        "startup"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Game);
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::GameBegins => {
                    reset_screen(sprites);
                    env.audio.start_loop(SoundId::Theme);
                    if env.images.get(TITLE_IMAGE).is_none() {
                        warn!(image = TITLE_IMAGE, "title_image_missing");
                    }
                }
                StoryEvent::Sound(sound) => env.play(sound),
                other => drop_unhandled(self.name(), &other),
            }
        }

        if env.input.was_pressed(InputAction::Escape) {
            info!("startup_exit");
            return StoryStep::Exit;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed > env.config.timings.title_delay_ticks && env.input.any_pressed() {
            env.audio.stop(SoundId::Theme);
            return Self::next(events, env);
        }
        StoryStep::Continue(self)
    }

    fn draw_overlay(&self, canvas: &mut dyn Canvas, env: &Env) {
        if let Some(title) = env.images.get(TITLE_IMAGE) {
            let x = CANVAS_WIDTH as i32 / 2;
            let y = (CANVAS_HEIGHT as i32 + title.height() as i32) / 2;
            canvas.blit(title, x, y, i32::MAX / 2);
        }
    }
}
