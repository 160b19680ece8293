use tracing::{info, warn};

use crate::app::{Canvas, EgaColor, InputAction, InputMode, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::{Env, SpriteManager};

use super::{
    drop_unhandled, reset_screen, MapStory, Story, StoryEvent, StoryEvents, StoryStep, TinyStory,
};

const PAGE_PIP: i32 = 4;

/// Briefing pages for a quest. Fire turns the page; after the last one the
/// dungeon starts, resuming a saved run when there is one.
pub struct IntroStory {
    quest: usize,
    page: usize,
}

impl IntroStory {
    pub fn new(quest: usize) -> Self {
        Self { quest, page: 0 }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    fn start_dungeon(&self, env: &mut Env) -> Option<TinyStory> {
        let def = env.quests.quest(self.quest)?.clone();
        let snapshot = env
            .save
            .resume()
            .filter(|snapshot| usize::from(snapshot.quest) == self.quest)
            .cloned();
        if let Some(snapshot) = snapshot {
            if let Some(story) = TinyStory::resume(self.quest, &def, &snapshot) {
                info!(quest = self.quest, room = snapshot.room, "quest_resumed");
                return Some(story);
            }
            warn!(quest = self.quest, "resume_snapshot_discarded");
            env.save.clear_resume();
        }
        info!(quest = self.quest, "quest_started");
        TinyStory::new(self.quest, &def)
    }
}

impl Story for IntroStory {
    fn name(&self) -> &'static str {
        "intro"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Query);
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::GameBegins => reset_screen(sprites),
                StoryEvent::Sound(sound) => env.play(sound),
                other => drop_unhandled(self.name(), &other),
            }
        }

        if env.input.was_pressed(InputAction::Escape) {
            events.push(StoryEvent::GameBegins);
            return StoryStep::Replace(Box::new(MapStory::selecting(self.quest)));
        }

        let pages = env
            .quests
            .quest(self.quest)
            .map_or(0, |quest| quest.briefing_pages.len());
        if env.input.was_pressed(InputAction::Fire) {
            self.page += 1;
        }
        if self.page < pages {
            return StoryStep::Continue(self);
        }

        events.push(StoryEvent::GameBegins);
        match self.start_dungeon(env) {
            Some(dungeon) => StoryStep::Replace(Box::new(dungeon)),
            None => {
                warn!(quest = self.quest, "quest_missing");
                StoryStep::Replace(Box::new(MapStory::selecting(self.quest)))
            }
        }
    }

    fn draw_overlay(&self, canvas: &mut dyn Canvas, env: &Env) {
        let pages = env
            .quests
            .quest(self.quest)
            .map_or(0, |quest| quest.briefing_pages.len()) as i32;
        let y = CANVAS_HEIGHT as i32 - 3 * PAGE_PIP;
        let left = (CANVAS_WIDTH as i32 - pages * 2 * PAGE_PIP) / 2;
        for page in 0..pages {
            let color = if page as usize == self.page {
                EgaColor::White
            } else {
                EgaColor::DarkGray
            };
            let x = left + page * 2 * PAGE_PIP;
            for row in y..y + PAGE_PIP {
                canvas.fill(x, x + PAGE_PIP - 1, row, i32::MAX, color);
            }
        }
    }
}
