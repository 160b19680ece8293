use crate::geometry::{screen_origin, SCREEN_BLOCKS};

/// World-to-screen translation shared by every sprite draw.
///
/// Owned by the sprite manager so it survives room clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Camera {
    origin_x: i32,
    origin_y: i32,
    level: usize,
    level_z: i32,
    offset_px: (i32, i32),
}

impl Camera {
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.origin_x = x;
        self.origin_y = y;
    }

    /// Move the origin to the screen containing the column.
    pub fn focus_on(&mut self, x: i32, y: i32) {
        self.set_origin(screen_origin(x), screen_origin(y));
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_z(&self) -> i32 {
        self.level_z
    }

    pub fn set_level(&mut self, level: usize, level_z: i32) {
        self.level = level;
        self.level_z = level_z;
    }

    pub fn offset_px(&self) -> (i32, i32) {
        self.offset_px
    }

    pub fn set_offset_px(&mut self, dx: i32, dy: i32) {
        self.offset_px = (dx, dy);
    }

    pub fn shows_column(&self, x: i32, y: i32) -> bool {
        (self.origin_x..self.origin_x + SCREEN_BLOCKS).contains(&x)
            && (self.origin_y..self.origin_y + SCREEN_BLOCKS).contains(&y)
    }

    /// Camera after a scroll by whole blocks and camera-level z.
    pub fn shifted(&self, dx: i32, dy: i32, dz: i32) -> Camera {
        let level = match dz.signum() {
            1 => self.level.saturating_add(1),
            -1 => self.level.saturating_sub(1),
            _ => self.level,
        };
        Camera {
            origin_x: self.origin_x + dx,
            origin_y: self.origin_y + dy,
            level,
            level_z: self.level_z + dz,
            offset_px: (0, 0),
        }
    }
}
