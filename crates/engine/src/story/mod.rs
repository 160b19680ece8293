mod dungeon;
mod end;
mod event;
mod game_manager;
mod intro;
mod map;
mod quit;
mod scroll;
mod startup;
mod training;

use tracing::debug;

use crate::app::Canvas;
use crate::sim::{Env, SpriteManager};

pub use dungeon::TinyStory;
pub use end::EndStory;
pub use event::{StoryEvent, StoryEvents};
pub use game_manager::GameManager;
pub use intro::IntroStory;
pub use map::{is_quest_unlocked, MapStory};
pub use quit::QuitStory;
pub use scroll::ScrollStory;
pub use startup::{StartupStory, TITLE_IMAGE};
pub use training::TrainingStory;

/// One screen of the game's flow.
///
/// `advance` takes the story by value: a story can hand itself to a wrapper
/// (scroll, quit) that returns it unchanged later. Every story must empty the
/// event queue before returning `Continue`.
pub trait Story {
    fn name(&self) -> &'static str;

    fn advance(
        self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep;

    fn draw_overlay(&self, _canvas: &mut dyn Canvas, _env: &Env) {}
}

pub enum StoryStep {
    Continue(Box<dyn Story>),
    /// Swap in a new story. Events left in the queue are handed to it.
    Replace(Box<dyn Story>),
    Exit,
}

pub(crate) fn drop_unhandled(story: &'static str, event: &StoryEvent) {
    debug!(story, event = event.kind_name(), "story_event_dropped");
}

/// Forget sprites and reset the camera before showing a new screen.
pub(crate) fn reset_screen(sprites: &mut SpriteManager) {
    sprites.clear();
    *sprites.camera_mut() = Default::default();
}
