use crate::app::{draw_prism, Canvas, EgaColor, PrismColors};
use crate::geometry::{Direction, GridPos};
use crate::sim::{body_fits, Camera, HitBox, HitKind, InteractView, Sprite, TickContext};

use super::{cadence, impl_as_any, moving_box};

/// Player shot. Flies straight at its own level until it runs out of range,
/// meets something solid or hits a monster.
pub struct Bullet {
    pos: GridPos,
    prev: GridPos,
    heading: Direction,
    height: i32,
    range: u32,
    travelled: u32,
    step_counter: u32,
    hit: bool,
}

impl Bullet {
    pub fn new(pos: GridPos, heading: Direction, height: i32, range: u32) -> Self {
        Self {
            pos,
            prev: pos,
            heading,
            height,
            range,
            travelled: 0,
            step_counter: 0,
            hit: false,
        }
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    fn body(&self) -> HitBox {
        moving_box(HitKind::Projectile, self.prev, self.pos, self.height)
    }
}

impl Sprite for Bullet {
    fn name(&self) -> &'static str {
        "bullet"
    }

    fn advance(&mut self, ctx: &mut TickContext<'_>) {
        self.prev = self.pos;
        if !cadence(&mut self.step_counter, ctx.env.config.timings.bullet_step_ticks) {
            return;
        }
        let next = self.pos.step(self.heading);
        if self.travelled >= self.range || !body_fits(&ctx.world(), next, self.height) {
            ctx.kill_self();
            return;
        }
        self.pos = next;
        self.travelled += 1;
    }

    fn interact(&mut self, view: &InteractView<'_>) {
        let mine = self.body();
        if view.first_overlap(&mine, &[HitKind::Monster]).is_some() {
            self.hit = true;
        }
    }

    fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
        if self.hit {
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
            9,
            PrismColors::shaded(EgaColor::White),
        );
    }

    fn watches(&self, other: &dyn Sprite) -> bool {
        other
            .hit_box()
            .is_some_and(|hit| hit.kind == HitKind::Monster)
    }

    fn hit_box(&self) -> Option<HitBox> {
        Some(self.body())
    }

    impl_as_any!();
}
