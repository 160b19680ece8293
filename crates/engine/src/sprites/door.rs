use crate::app::{draw_prism, Canvas, EgaColor, PrismColors};
use crate::geometry::BLOCK_Z;
use crate::sim::{Camera, ColumnSpan, Obstacle, Sprite, TickContext};

use super::{impl_as_any, near_screen};

/// Doorway cell in a wall line. Open, it is a floor slab `drop_depth` below
/// room floor; closed, it is solid up to the wall top.
pub struct Door {
    x: i32,
    y: i32,
    floor: ColumnSpan,
    closed: ColumnSpan,
    open: bool,
    floor_colors: PrismColors,
    wall_colors: PrismColors,
}

impl Door {
    pub fn new(
        x: i32,
        y: i32,
        floor_z: i32,
        drop_depth: i32,
        wall_top: i32,
        open: bool,
    ) -> Self {
        let top = floor_z - drop_depth;
        Self {
            x,
            y,
            floor: ColumnSpan::new(top - BLOCK_Z + 1, top),
            closed: ColumnSpan::new(floor_z - BLOCK_Z + 1, wall_top),
            open,
            floor_colors: PrismColors::shaded(EgaColor::DarkGray),
            wall_colors: PrismColors::shaded(EgaColor::LightGray),
        }
    }

    pub fn with_colors(mut self, floor: EgaColor, wall: EgaColor) -> Self {
        self.floor_colors = PrismColors::shaded(floor);
        self.wall_colors = PrismColors::shaded(wall);
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn span(&self) -> ColumnSpan {
        if self.open {
            self.floor
        } else {
            self.closed
        }
    }

    fn at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

impl Obstacle for Door {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool {
        self.at(x, y) && self.span().is_platform(z)
    }

    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool {
        !self.at(x, y) || self.span().is_empty(z)
    }

    fn is_void(&self, x: i32, y: i32, z: i32) -> bool {
        !self.at(x, y) || self.span().is_void(z)
    }
}

impl Sprite for Door {
    fn name(&self) -> &'static str {
        "door"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        if !near_screen(camera, self.x, self.y) {
            return;
        }
        let span = self.span();
        let colors = if self.open {
            self.floor_colors
        } else {
            self.wall_colors
        };
        draw_prism(canvas, camera, self.x, self.y, span.base, span.top, 0, colors);
    }

    fn obstacle(&self) -> Option<&dyn Obstacle> {
        Some(self)
    }

    impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, GridPos};
    use crate::sim::{can_stand, find_step, ObstacleQuery, SpriteManager, StepTarget};
    use crate::sprites::test_support::flat_floor;

    #[test]
    fn open_door_is_a_lowered_floor_and_closed_door_a_wall() {
        let mut door = Door::new(5, 2, 0, 2, 12, true);

        assert!(door.is_platform(5, 2, -2));
        assert!(door.is_empty(5, 2, 0));
        assert!(!door.is_void(5, 2, -3));

        door.set_open(false);
        assert!(door.is_platform(5, 2, 12));
        assert!(!door.is_empty(5, 2, 1));
        assert!(door.is_empty(4, 2, 1));
    }

    #[test]
    fn stepping_into_a_doorway_follows_the_toggle() {
        let mut sprites = SpriteManager::new();
        sprites.add(Box::new(flat_floor(3, 1)));
        let id = sprites.add(Box::new(Door::new(3, 0, 0, 2, 12, true)));
        sprites.apply_pending();
        let from = GridPos::new(2, 0, 0);

        assert_eq!(
            find_step(&sprites.view(), from, Direction::PosX, 6, 1, 2),
            StepTarget::Stand(-2)
        );
        assert!(can_stand(&sprites.view(), GridPos::new(3, 0, -2), 6));

        sprites.get_as_mut::<Door>(id).expect("door").set_open(false);

        assert_eq!(
            find_step(&sprites.view(), from, Direction::PosX, 6, 1, 2),
            StepTarget::Blocked
        );
        assert!(!can_stand(&sprites.view(), GridPos::new(3, 0, -2), 6));
        assert!(!sprites.view().is_empty(3, 0, 1));
        assert!(sprites.view().is_platform(3, 0, 12));
    }
}
