use tracing::{debug, info};

use crate::app::{InputAction, InputMode, SoundId};
use crate::sim::{Env, SpriteId, SpriteManager};
use crate::sprites::QuestMarker;

use super::{
    drop_unhandled, reset_screen, IntroStory, Story, StoryEvent, StoryEvents, StoryStep,
};

/// Quest `index` can be entered once the quest before it has been finished.
pub fn is_quest_unlocked(env: &Env, index: usize) -> bool {
    index == 0 || env.save.score(index - 1) > 0
}

/// Overworld: pick an unlocked quest with left/right, enter it with fire.
pub struct MapStory {
    selected: usize,
    markers: Vec<SpriteId>,
}

impl MapStory {
    pub fn new() -> Self {
        Self::selecting(0)
    }

    pub fn selecting(quest: usize) -> Self {
        Self {
            selected: quest,
            markers: Vec::new(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn show(&mut self, sprites: &mut SpriteManager, env: &Env) {
        reset_screen(sprites);
        self.markers = env
            .quests
            .quests
            .iter()
            .enumerate()
            .map(|(index, quest)| {
                let (x, y) = quest.map_position(index);
                sprites.add(Box::new(QuestMarker::new(
                    index,
                    x,
                    y,
                    is_quest_unlocked(env, index),
                    env.save.score(index),
                )))
            })
            .collect();
        sprites.apply_pending();

        let last = self.markers.len().saturating_sub(1);
        self.selected = (0..=self.selected.min(last))
            .rev()
            .find(|index| is_quest_unlocked(env, *index))
            .unwrap_or(0);
        self.mark_selected(sprites, true);
        info!(quests = self.markers.len(), selected = self.selected, "map_shown");
    }

    fn mark_selected(&self, sprites: &mut SpriteManager, selected: bool) {
        if let Some(id) = self.markers.get(self.selected) {
            if let Some(marker) = sprites.get_as_mut::<QuestMarker>(*id) {
                marker.set_selected(selected);
            }
        }
    }

    /// Next unlocked quest in `step` direction, if any.
    fn neighbour(&self, env: &Env, step: isize) -> Option<usize> {
        let mut index = self.selected as isize;
        loop {
            index += step;
            if index < 0 || index as usize >= self.markers.len() {
                return None;
            }
            if is_quest_unlocked(env, index as usize) {
                return Some(index as usize);
            }
        }
    }
}

impl Default for MapStory {
    fn default() -> Self {
        Self::new()
    }
}

impl Story for MapStory {
    fn name(&self) -> &'static str {
        "map"
    }

    fn advance(
        mut self: Box<Self>,
        events: &mut StoryEvents,
        sprites: &mut SpriteManager,
        env: &mut Env,
    ) -> StoryStep {
        env.set_input_mode(InputMode::Map);
        while let Some(event) = events.pop() {
            match event {
                StoryEvent::GameBegins => self.show(sprites, env),
                StoryEvent::Sound(sound) => env.play(sound),
                other => drop_unhandled(self.name(), &other),
            }
        }

        if env.input.was_pressed(InputAction::Escape) {
            info!("map_exit");
            return StoryStep::Exit;
        }

        if env.input.was_pressed(InputAction::Fire)
            && self.selected < env.quests.quests.len()
            && is_quest_unlocked(env, self.selected)
        {
            info!(quest = self.selected, "quest_selected");
            events.push(StoryEvent::GameBegins);
            return StoryStep::Replace(Box::new(IntroStory::new(self.selected)));
        }

        let step = if env.input.was_pressed(InputAction::Left) {
            -1
        } else if env.input.was_pressed(InputAction::Right) {
            1
        } else {
            0
        };
        if step != 0 {
            if let Some(next) = self.neighbour(env, step) {
                self.mark_selected(sprites, false);
                self.selected = next;
                self.mark_selected(sprites, true);
                env.play(SoundId::Select);
                debug!(selected = next, "map_selection_moved");
            }
        }
        StoryStep::Continue(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::InputSnapshot;
    use crate::testing::test_env;

    fn shown(env: &mut Env, sprites: &mut SpriteManager) -> Box<dyn Story> {
        let mut events = StoryEvents::default();
        events.push(StoryEvent::GameBegins);
        match Box::new(MapStory::new()).advance(&mut events, sprites, env) {
            StoryStep::Continue(story) => story,
            _ => panic!("map should wait for input"),
        }
    }

    fn press(
        story: Box<dyn Story>,
        action: InputAction,
        env: &mut Env,
        sprites: &mut SpriteManager,
        events: &mut StoryEvents,
    ) -> StoryStep {
        env.begin_tick(InputSnapshot::empty().with_pressed(action, true));
        story.advance(events, sprites, env)
    }

    fn selected_marker(sprites: &SpriteManager) -> Option<usize> {
        sprites
            .view()
            .iter()
            .filter_map(|(_, sprite)| sprite.as_any().downcast_ref::<QuestMarker>())
            .find(|marker| marker.is_selected())
            .map(QuestMarker::quest)
    }

    #[test]
    fn first_quest_is_always_unlocked() {
        let mut env = test_env();

        assert!(is_quest_unlocked(&env, 0));
        assert!(!is_quest_unlocked(&env, 1));
        env.save.set_score_if_better(0, 2);
        assert!(is_quest_unlocked(&env, 1));
    }

    #[test]
    fn selection_skips_locked_quests() {
        let mut env = test_env();
        let mut sprites = SpriteManager::new();
        let mut events = StoryEvents::default();
        let map = shown(&mut env, &mut sprites);
        assert_eq!(selected_marker(&sprites), Some(0));

        let map = match press(map, InputAction::Right, &mut env, &mut sprites, &mut events) {
            StoryStep::Continue(story) => story,
            _ => panic!("map should stay"),
        };
        assert_eq!(selected_marker(&sprites), Some(0));

        env.save.set_score_if_better(0, 1);
        events.push(StoryEvent::GameBegins);
        let _ = press(map, InputAction::Right, &mut env, &mut sprites, &mut events);
        assert_eq!(selected_marker(&sprites), Some(1));
    }

    #[test]
    fn fire_opens_the_briefing_and_escape_exits() {
        let mut env = test_env();
        let mut sprites = SpriteManager::new();
        let mut events = StoryEvents::default();

        let map = shown(&mut env, &mut sprites);
        match press(map, InputAction::Fire, &mut env, &mut sprites, &mut events) {
            StoryStep::Replace(next) => assert_eq!(next.name(), "intro"),
            _ => panic!("expected the briefing"),
        }
        assert_eq!(events.drain(), vec![StoryEvent::GameBegins]);

        let map = shown(&mut env, &mut sprites);
        assert!(matches!(
            press(map, InputAction::Escape, &mut env, &mut sprites, &mut events),
            StoryStep::Exit
        ));
    }
}
