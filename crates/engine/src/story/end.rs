use tracing::info;

use crate::app::{Canvas, EgaColor, InputAction, InputMode, SoundId, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::save::MAX_SCORE;
use crate::sim::{Env, SpriteManager};

use super::{drop_unhandled, MapStory, Story, StoryEvent, StoryEvents, StoryStep};

const STAR_SIZE: i32 = 8;
const STAR_GAP: i32 = 6;

/// Quest finished: record the rating, then back to the map.
pub struct EndStory {
    quest: usize,
    deaths: u32,
    rating: Option<u8>,
    elapsed: u32,
}

impl EndStory {
    pub fn new(quest: usize, deaths: u32) -> Self {
        Self {
            quest,
            deaths,
            rating: None,
            elapsed: 0,
        }
    }

    pub fn rating(&self) -> Option<u8> {
        self.rating
    }

    fn record(&mut self, env: &mut Env) {
        let rating = env.config.rate_quest(self.quest, self.deaths);
        let improved = env.save.set_score_if_better(self.quest, rating);
        env.save.clear_resume();
        env.play(SoundId::Fanfare);
        info!(
            quest = self.quest,
            deaths = self.deaths,
            rating,
            improved,
            "quest_rated"
        );
        self.rating = Some(rating);
    }
}

impl Story for EndStory {
    fn name(&self) -> &'static str {
        "end"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        _sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Query);
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::GameBegins => self.record(env),
                StoryEvent::Sound(sound) => env.play(sound),
                other => drop_unhandled(self.name(), &other),
            }
        }

        self.elapsed += 1;
        if self.elapsed >= env.config.timings.end_ticks || env.input.was_pressed(InputAction::Fire)
        {
            events.push(StoryEvent::GameBegins);
            return StoryStep::Replace(Box::new(MapStory::selecting(self.quest)));
        }
        StoryStep::Continue(self)
    }

    fn draw_overlay(&self, canvas: &mut dyn Canvas, _env: &Env) {
        let Some(rating) = self.rating else {
            return;
        };
        let stars = i32::from(MAX_SCORE);
        let row_width = stars * STAR_SIZE + (stars - 1) * STAR_GAP;
        let left = (CANVAS_WIDTH as i32 - row_width) / 2;
        let top = CANVAS_HEIGHT as i32 / 2 - STAR_SIZE / 2;
        for star in 0..stars {
            let color = if star < i32::from(rating) {
                EgaColor::Yellow
            } else {
                EgaColor::DarkGray
            };
            let x = left + star * (STAR_SIZE + STAR_GAP);
            for y in top..top + STAR_SIZE {
                canvas.fill(x, x + STAR_SIZE - 1, y, i32::MAX, color);
            }
        }
    }
}
