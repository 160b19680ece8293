use crate::app::{draw_prism, Canvas, EgaColor, InputAction, PrismColors, SoundId};
use crate::geometry::{Direction, GridPos};
use crate::sim::{
    find_step, Camera, Footing, HitBox, HitKind, InteractView, Sprite, StepTarget, TickContext,
};
use crate::story::StoryEvent;

use super::{apply_gravity, cadence, impl_as_any, moving_box, Bullet};

const HURT_BY: [HitKind; 2] = [HitKind::Monster, HitKind::Hazard];

/// The hero. Walks one block per step period, falls when unsupported, fires
/// bullets and dies on contact with monsters or hazards.
pub struct Player {
    pos: GridPos,
    prev: GridPos,
    facing: Direction,
    height: i32,
    step_counter: u32,
    walking: bool,
    fall_counter: u32,
    fire_cooldown: u32,
    hurt: bool,
}

impl Player {
    pub fn new(pos: GridPos, facing: Direction, height: i32) -> Self {
        Self {
            pos,
            prev: pos,
            facing,
            height,
            step_counter: 0,
            walking: false,
            fall_counter: 0,
            fire_cooldown: 0,
            hurt: false,
        }
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    fn body(&self) -> HitBox {
        moving_box(HitKind::Player, self.prev, self.pos, self.height)
    }

    fn die(&mut self, ctx: &mut TickContext<'_>) {
        ctx.emit(StoryEvent::PlayerKilled);
        ctx.emit(StoryEvent::Sound(SoundId::Death));
        ctx.kill_self();
    }

    fn walk(&mut self, ctx: &mut TickContext<'_>, direction: Direction) {
        let fresh = direction != self.facing || !self.walking;
        self.facing = direction;
        self.walking = true;
        // A new press or heading steps at once; holding repeats at the step rate.
        if !fresh && !cadence(&mut self.step_counter, ctx.env.config.timings.player_step_ticks) {
            return;
        }
        self.step_counter = 0;

        let movement = ctx.env.config.movement;
        let world = ctx.world();
        let target = self.pos.step(direction);
        match find_step(
            &world,
            self.pos,
            direction,
            self.height,
            movement.climb_z,
            movement.drop_z,
        ) {
            StepTarget::Stand(z) => {
                self.pos = target.with_z(z);
                ctx.emit(StoryEvent::Sound(SoundId::Step));
            }
            StepTarget::Drop => self.pos = target,
            StepTarget::Blocked => {}
        }
    }

    fn fire(&mut self, ctx: &mut TickContext<'_>) {
        let timings = ctx.env.config.timings;
        ctx.spawn(Box::new(Bullet::new(
            self.pos,
            self.facing,
            ctx.env.config.movement.bullet_height_z,
            timings.bullet_range_blocks,
        )));
        ctx.emit(StoryEvent::Sound(SoundId::Fire));
        self.fire_cooldown = timings.fire_cooldown_ticks;
    }
}

impl Sprite for Player {
    fn name(&self) -> &'static str {
        "player"
    }

    fn advance(&mut self, ctx: &mut TickContext<'_>) {
        self.prev = self.pos;
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);

        let world = ctx.world();
        let fall_ticks = ctx.env.config.timings.fall_ticks;
        match apply_gravity(&world, &mut self.pos, &mut self.fall_counter, fall_ticks) {
            Footing::Void => {
                self.die(ctx);
                return;
            }
            Footing::Falling => return,
            Footing::Standing => {}
        }

        match ctx.env.input.direction() {
            Some(direction) => self.walk(ctx, direction),
            None => {
                self.walking = false;
                self.step_counter = 0;
            }
        }

        if ctx.env.input.was_pressed(InputAction::Fire) && self.fire_cooldown == 0 {
            self.fire(ctx);
        }
    }

    fn interact(&mut self, view: &InteractView<'_>) {
        let mine = self.body();
        if view.first_overlap(&mine, &HURT_BY).is_some() {
            self.hurt = true;
        }
    }

    fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
        if std::mem::take(&mut self.hurt) {
            self.die(ctx);
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        let colors = PrismColors::shaded(EgaColor::Yellow);
        draw_prism(
            canvas,
            camera,
            self.pos.x,
            self.pos.y,
            self.pos.z + 1,
            self.pos.z + self.height,
            5,
            colors,
        );
    }

    fn watches(&self, other: &dyn Sprite) -> bool {
        other
            .hit_box()
            .is_some_and(|hit| HURT_BY.contains(&hit.kind))
    }

    fn hit_box(&self) -> Option<HitBox> {
        Some(self.body())
    }

    impl_as_any!();
}
