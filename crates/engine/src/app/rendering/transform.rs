use crate::sim::Camera;

pub const ISO_HALF_WIDTH_PX: i32 = 12;
pub const ISO_HALF_HEIGHT_PX: i32 = 6;
pub const Z_UNIT_PX: i32 = 3;
pub const SCREEN_ORIGIN_X: i32 = 160;
pub const SCREEN_ORIGIN_Y: i32 = 60;
const DEPTH_PER_DIAGONAL: i32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// Screen position of the north corner of grid point `(x, y, z)`.
pub fn project(camera: &Camera, x: i32, y: i32, z: i32) -> ScreenPoint {
    let (origin_x, origin_y) = camera.origin();
    let (offset_x, offset_y) = camera.offset_px();
    let rx = x - origin_x;
    let ry = y - origin_y;
    let rz = z - camera.level_z();
    ScreenPoint {
        x: SCREEN_ORIGIN_X + (rx - ry) * ISO_HALF_WIDTH_PX + offset_x,
        y: SCREEN_ORIGIN_Y + (rx + ry) * ISO_HALF_HEIGHT_PX - rz * Z_UNIT_PX + offset_y,
    }
}

/// Painter's depth: further down-screen diagonals and higher z are nearer.
pub fn depth_at(x: i32, y: i32, z: i32) -> i32 {
    (x + y) * DEPTH_PER_DIAGONAL + z
}

/// Pixel translation that turns the `from` view into the `to` view.
pub fn scroll_delta_px(from: &Camera, to: &Camera) -> (i32, i32) {
    let before = project(from, 0, 0, 0);
    let after = project(to, 0, 0, 0);
    (after.x - before.x, after.y - before.y)
}
