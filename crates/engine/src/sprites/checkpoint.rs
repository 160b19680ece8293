use crate::app::{draw_plate, Canvas, EgaColor};
use crate::geometry::GridPos;
use crate::sim::{Camera, HitKind, InteractView, Sprite, TickContext};
use crate::story::StoryEvent;

use super::{impl_as_any, player_on_plate};

/// Marks a room entry as the respawn point the first time it is touched.
pub struct Checkpoint {
    pos: GridPos,
    entry: u8,
    reached: bool,
    touched: bool,
}

impl Checkpoint {
    pub fn new(pos: GridPos, entry: u8) -> Self {
        Self {
            pos,
            entry,
            reached: false,
            touched: false,
        }
    }

    pub fn is_reached(&self) -> bool {
        self.reached
    }
}

impl Sprite for Checkpoint {
    fn name(&self) -> &'static str {
        "checkpoint"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn interact(&mut self, view: &InteractView<'_>) {
        self.touched = !self.reached && player_on_plate(view, self.pos);
    }

    fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
        if std::mem::take(&mut self.touched) {
            self.reached = true;
            ctx.emit(StoryEvent::NewEntryPoint { entry: self.entry });
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        let color = if self.reached {
            EgaColor::LightCyan
        } else {
            EgaColor::Cyan
        };
        draw_plate(canvas, camera, self.pos.x, self.pos.y, self.pos.z + 1, color);
    }

    fn watches(&self, other: &dyn Sprite) -> bool {
        other
            .hit_box()
            .is_some_and(|hit| hit.kind == HitKind::Player)
    }

    impl_as_any!();
}
