use crate::app::{draw_prism, Canvas, EgaColor, PrismColors, SoundId};
use crate::geometry::GridPos;
use crate::sim::{Camera, HitKind, InteractView, Sprite, TickContext};
use crate::story::StoryEvent;

use super::{impl_as_any, player_on_plate};

/// The quest's treasure. Completes the quest when the player reaches it.
pub struct Goal {
    pos: GridPos,
    touched: bool,
    taken: bool,
}

impl Goal {
    pub fn new(pos: GridPos) -> Self {
        Self {
            pos,
            touched: false,
            taken: false,
        }
    }
}

impl Sprite for Goal {
    fn name(&self) -> &'static str {
        "goal"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn interact(&mut self, view: &InteractView<'_>) {
        self.touched = !self.taken && player_on_plate(view, self.pos);
    }

    fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
        if std::mem::take(&mut self.touched) {
            self.taken = true;
            ctx.emit(StoryEvent::QuestComplete);
            ctx.emit(StoryEvent::Sound(SoundId::Fanfare));
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        if self.taken {
            return;
        }
        draw_prism(
            canvas,
            camera,
            self.pos.x,
            self.pos.y,
            self.pos.z + 1,
            self.pos.z + 2,
            7,
            PrismColors::shaded(EgaColor::Yellow),
        );
    }

    fn watches(&self, other: &dyn Sprite) -> bool {
        other
            .hit_box()
            .is_some_and(|hit| hit.kind == HitKind::Player)
    }

    impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{InputAction, InputSnapshot};
    use crate::geometry::Direction;
    use crate::sim::SpriteManager;
    use crate::sprites::test_support::flat_floor;
    use crate::sprites::{Checkpoint, Player};
    use crate::story::StoryEvents;
    use crate::testing::test_env;

    #[test]
    fn pickups_fire_once_when_the_player_arrives() {
        let mut sprites = SpriteManager::new();
        sprites.add(Box::new(flat_floor(4, 1)));
        sprites.add(Box::new(Checkpoint::new(GridPos::new(1, 0, 0), 3)));
        sprites.add(Box::new(Goal::new(GridPos::new(2, 0, 0))));
        sprites.add(Box::new(Player::new(GridPos::new(0, 0, 0), Direction::PosX, 6)));
        sprites.apply_pending();
        let mut env = test_env();
        env.config.timings.player_step_ticks = 1;
        let mut events = StoryEvents::default();

        let mut seen = Vec::new();
        for held in [
            InputAction::Right,
            InputAction::Left,
            InputAction::Right,
            InputAction::Right,
        ] {
            env.begin_tick(InputSnapshot::empty().with_held(held, true));
            sprites.tick(&mut env, &mut events);
            seen.extend(
                events
                    .drain()
                    .into_iter()
                    .filter(|event| !matches!(event, StoryEvent::Sound(_))),
            );
        }

        assert_eq!(
            seen,
            vec![
                StoryEvent::NewEntryPoint { entry: 3 },
                StoryEvent::QuestComplete
            ]
        );
    }
}
