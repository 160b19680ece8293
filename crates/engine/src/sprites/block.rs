use crate::app::{draw_prism, Canvas, EgaColor, PrismColors};
use crate::sim::{Camera, ColumnSpan, Obstacle, Sprite, TickContext};

use super::{impl_as_any, near_screen};

/// Solid column of one grid cell. Walls and authored blocks are both blocks.
pub struct Block {
    x: i32,
    y: i32,
    span: ColumnSpan,
    draw_top: i32,
    colors: PrismColors,
}

impl Block {
    pub fn new(x: i32, y: i32, span: ColumnSpan, color: EgaColor) -> Self {
        Self {
            x,
            y,
            span,
            draw_top: span.top,
            colors: PrismColors::shaded(color),
        }
    }

    /// Draw no higher than `top` while still blocking the full span. Used for
    /// walls on the viewer's side of a room.
    pub fn with_draw_top(mut self, top: i32) -> Self {
        self.draw_top = top.min(self.span.top);
        self
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn span(&self) -> ColumnSpan {
        self.span
    }

    fn at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

impl Obstacle for Block {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool {
        self.at(x, y) && self.span.is_platform(z)
    }

    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool {
        !self.at(x, y) || self.span.is_empty(z)
    }

    fn is_void(&self, x: i32, y: i32, z: i32) -> bool {
        !self.at(x, y) || self.span.is_void(z)
    }
}

impl Sprite for Block {
    fn name(&self) -> &'static str {
        "block"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        if near_screen(camera, self.x, self.y) {
            draw_prism(
                canvas,
                camera,
                self.x,
                self.y,
                self.span.base,
                self.draw_top,
                0,
                self.colors,
            );
        }
    }

    fn obstacle(&self) -> Option<&dyn Obstacle> {
        Some(self)
    }

    impl_as_any!();
}
