use crate::app::{draw_plate, Canvas, EgaColor, SoundId};
use crate::geometry::GridPos;
use crate::sim::{Camera, HitKind, InteractView, Sprite, TickContext};
use crate::story::StoryEvent;

use super::{impl_as_any, player_on_plate};

/// Floor plate that flips each time the player steps onto it.
pub struct Switch {
    index: u8,
    pos: GridPos,
    on: bool,
    occupied: bool,
    pressed: bool,
}

impl Switch {
    pub fn new(index: u8, pos: GridPos, on: bool) -> Self {
        Self {
            index,
            pos,
            on,
            occupied: false,
            pressed: false,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Sprite for Switch {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn interact(&mut self, view: &InteractView<'_>) {
        self.pressed = player_on_plate(view, self.pos);
    }

    fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
        let stepped_on = self.pressed && !self.occupied;
        self.occupied = self.pressed;
        if stepped_on {
            self.on = !self.on;
            ctx.emit(StoryEvent::SwitchToggled {
                switch: self.index,
                on: self.on,
            });
            ctx.emit(StoryEvent::Sound(SoundId::Switch));
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        let color = if self.on {
            EgaColor::LightGreen
        } else {
            EgaColor::Red
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
