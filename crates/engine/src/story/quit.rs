use tracing::info;

use crate::app::{Canvas, EgaColor, InputAction, InputMode, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::{Env, FrozenSet, SpriteManager};

use super::{drop_unhandled, Story, StoryEvent, StoryEvents, StoryStep};

const PANEL_HALF_WIDTH: i32 = 60;
const PANEL_HALF_HEIGHT: i32 = 16;

/// "Leave this quest?" Fire confirms, escape goes back to playing.
pub struct QuitStory {
    inner: Box<dyn Story>,
    frozen: FrozenSet,
}

impl QuitStory {
    pub fn new(inner: Box<dyn Story>, sprites: &mut SpriteManager) -> Self {
        let frozen = sprites.freeze(true, false);
        Self { inner, frozen }
    }
}

impl Story for QuitStory {
    fn name(&self) -> &'static str {
        "quit"
    }

    fn advance(
        self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Query);
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::Sound(sound) => env.play(sound),
                other => drop_unhandled(self.name(), &other),
            }
        }

        let confirmed = env.input.was_pressed(InputAction::Fire);
        if !confirmed && !env.input.was_pressed(InputAction::Escape) {
            return StoryStep::Continue(self);
        }

        let QuitStory { inner, frozen } = *self;
        sprites.thaw(frozen);
        if confirmed {
            info!(story = inner.name(), "quit_confirmed");
            events.push(StoryEvent::QuestAbort);
        }
        StoryStep::Replace(inner)
    }

    fn draw_overlay(&self, canvas: &mut dyn Canvas, _env: &Env) {
        let center_x = CANVAS_WIDTH as i32 / 2;
        let center_y = CANVAS_HEIGHT as i32 / 2;
        for y in center_y - PANEL_HALF_HEIGHT..=center_y + PANEL_HALF_HEIGHT {
            let edge = (y - center_y).abs() == PANEL_HALF_HEIGHT;
            canvas.fill(
                center_x - PANEL_HALF_WIDTH,
                center_x + PANEL_HALF_WIDTH,
                y,
                i32::MAX,
                if edge { EgaColor::White } else { EgaColor::Blue },
            );
        }
    }
}
