use tracing::debug;

use crate::app::{scroll_delta_px, SoundId};
use crate::sim::{Camera, Env, FrozenSet, SpriteManager};

use super::{drop_unhandled, Story, StoryEvent, StoryEvents, StoryStep};

/// Slides the camera to the next screen or level while everything else is
/// frozen, then hands control back to the story it wraps.
pub struct ScrollStory {
    inner: Box<dyn Story>,
    frozen: FrozenSet,
    from: Camera,
    to: Camera,
    elapsed: u32,
    total: u32,
}

impl ScrollStory {
    pub fn new(
        inner: Box<dyn Story>,
        dx: i32,
        dy: i32,
        dz: i32,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> Self {
        let frozen = sprites.freeze(true, false);
        let from = *sprites.camera();
        let to = from.shifted(dx, dy, dz);
        let timings = &env.config.timings;
        let blocks = dx.unsigned_abs().max(dy.unsigned_abs());
        let total = (timings.scroll_ticks_per_block * blocks
            + timings.scroll_ticks_per_z * dz.unsigned_abs())
        .max(1);
        env.play(SoundId::Scroll);
        debug!(dx, dy, dz, ticks = total, inner = inner.name(), "scroll_started");
        Self {
            inner,
            frozen,
            from,
            to,
            elapsed: 0,
            total,
        }
    }

    pub fn total_ticks(&self) -> u32 {
        self.total
    }
}

impl Story for ScrollStory {
    fn name(&self) -> &'static str {
        "scroll"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::Sound(sound) => env.play(sound),
                other => drop_unhandled(self.name(), &other),
            }
        }

        self.elapsed += 1;
        if self.elapsed >= self.total {
            *sprites.camera_mut() = self.to;
            let ScrollStory { inner, frozen, .. } = *self;
            sprites.thaw(frozen);
            return StoryStep::Replace(inner);
        }

        let (dx, dy) = scroll_delta_px(&self.from, &self.to);
        let progress = self.elapsed as i32;
        let total = self.total as i32;
        sprites
            .camera_mut()
            .set_offset_px(dx * progress / total, dy * progress / total);
        StoryStep::Continue(self)
    }
}
