use std::collections::HashSet;

use crate::app::{draw_prism, Canvas, EgaColor, PrismColors};
use crate::geometry::BLOCK_Z;
use crate::sim::{Camera, ColumnSpan, Obstacle, Sprite, TickContext};

use super::impl_as_any;

/// Room floor: one block-thick slab under the whole interior, minus holes.
pub struct Floor {
    width: i32,
    depth: i32,
    span: ColumnSpan,
    holes: HashSet<(i32, i32)>,
    colors: PrismColors,
}

impl Floor {
    pub fn new(width: i32, depth: i32, top: i32, holes: Vec<(i32, i32)>, color: EgaColor) -> Self {
        Self {
            width,
            depth,
            span: ColumnSpan::new(top - BLOCK_Z + 1, top),
            holes: holes.into_iter().collect(),
            colors: PrismColors::shaded(color),
        }
    }

    pub fn top(&self) -> i32 {
        self.span.top
    }

    fn solid_at(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x)
            && (0..self.depth).contains(&y)
            && !self.holes.contains(&(x, y))
    }
}

impl Obstacle for Floor {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool {
        self.solid_at(x, y) && self.span.is_platform(z)
    }

    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool {
        !self.solid_at(x, y) || self.span.is_empty(z)
    }

    fn is_void(&self, x: i32, y: i32, z: i32) -> bool {
        !self.solid_at(x, y) || self.span.is_void(z)
    }
}

impl Sprite for Floor {
    fn name(&self) -> &'static str {
        "floor"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        for y in 0..self.depth {
            for x in 0..self.width {
                if self.solid_at(x, y) && camera.shows_column(x, y) {
                    draw_prism(
                        canvas,
                        camera,
                        x,
                        y,
                        self.span.base,
                        self.span.top,
                        0,
                        self.colors,
                    );
                }
            }
        }
    }

    fn obstacle(&self) -> Option<&dyn Obstacle> {
        Some(self)
    }

    impl_as_any!();
}
