use crate::app::{draw_prism, Canvas, EgaColor, PrismColors, SoundId};
use crate::geometry::{Direction, GridPos};
use crate::sim::{
    choose_direction, find_step, legal_directions, Camera, Footing, HitBox, HitKind,
    InteractView, Sprite, StepTarget, TickContext,
};
use crate::story::StoryEvent;

use super::{apply_gravity, cadence, impl_as_any, moving_box};

/// Generic wandering monster.
///
/// Keeps walking straight while it can, occasionally choosing a new heading.
/// Reversing happens on the spot; a quarter turn is announced and only taken
/// after `critter_turn_ticks`.
pub struct Critter {
    pos: GridPos,
    prev: GridPos,
    heading: Direction,
    turning: Option<Direction>,
    turn_wait: u32,
    height: i32,
    step_counter: u32,
    fall_counter: u32,
    shot: bool,
}

impl Critter {
    pub fn new(pos: GridPos, heading: Direction, height: i32) -> Self {
        Self {
            pos,
            prev: pos,
            heading,
            turning: None,
            turn_wait: 0,
            height,
            step_counter: 0,
            fall_counter: 0,
            shot: false,
        }
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn turning(&self) -> Option<Direction> {
        self.turning
    }

    fn body(&self) -> HitBox {
        moving_box(HitKind::Monster, self.prev, self.pos, self.height)
    }

    fn pick_heading(&mut self, ctx: &mut TickContext<'_>) -> Option<Direction> {
        let movement = ctx.env.config.movement;
        let timings = ctx.env.config.timings;
        let world = ctx.world();
        let legal = legal_directions(
            &world,
            self.pos,
            self.height,
            movement.climb_z,
            movement.drop_z,
        );

        if let Some(turn) = self.turning {
            if !legal.contains(turn) {
                self.turning = None;
            } else if self.turn_wait > 0 {
                self.turn_wait -= 1;
                return None;
            } else {
                self.turning = None;
                self.heading = turn;
                return Some(turn);
            }
        }

        let wander = ctx.env.rng.chance_percent(timings.critter_turn_chance_percent);
        if legal.contains(self.heading) && !wander {
            return Some(self.heading);
        }

        let chosen = choose_direction(legal, None, self.heading, &mut ctx.env.rng);
        if chosen == self.heading || chosen == self.heading.reverse() {
            self.heading = chosen;
            return Some(chosen);
        }
        self.turning = Some(chosen);
        self.turn_wait = timings.critter_turn_ticks;
        None
    }
}

impl Sprite for Critter {
    fn name(&self) -> &'static str {
        "critter"
    }

    fn advance(&mut self, ctx: &mut TickContext<'_>) {
        self.prev = self.pos;
        let world = ctx.world();
        let fall_ticks = ctx.env.config.timings.fall_ticks;
        match apply_gravity(&world, &mut self.pos, &mut self.fall_counter, fall_ticks) {
            Footing::Void => {
                ctx.kill_self();
                return;
            }
            Footing::Falling => return,
            Footing::Standing => {}
        }

        if !cadence(&mut self.step_counter, ctx.env.config.timings.critter_step_ticks) {
            return;
        }
        let Some(direction) = self.pick_heading(ctx) else {
            return;
        };
        let movement = ctx.env.config.movement;
        if let StepTarget::Stand(z) = find_step(
            &world,
            self.pos,
            direction,
            self.height,
            movement.climb_z,
            movement.drop_z,
        ) {
            self.pos = self.pos.step(direction).with_z(z);
        }
    }

    fn interact(&mut self, view: &InteractView<'_>) {
        let mine = self.body();
        if view.first_overlap(&mine, &[HitKind::Projectile]).is_some() {
            self.shot = true;
        }
    }

    fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
        if std::mem::take(&mut self.shot) {
            ctx.emit(StoryEvent::MonsterKilled);
            ctx.emit(StoryEvent::Sound(SoundId::Hit));
            ctx.kill_self();
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        draw_prism(
            canvas,
            camera,
            self.pos.x,
            self.pos.y,
            self.pos.z + 1,
            self.pos.z + self.height,
            4,
            PrismColors::shaded(EgaColor::LightRed),
        );
    }

    fn watches(&self, other: &dyn Sprite) -> bool {
        other.obstacle().is_some() || other.hit_box().is_some()
    }

    fn hit_box(&self) -> Option<HitBox> {
        Some(self.body())
    }

    impl_as_any!();
}
