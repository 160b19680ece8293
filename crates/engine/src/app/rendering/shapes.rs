use crate::sim::Camera;

use super::transform::{depth_at, project, ISO_HALF_HEIGHT_PX, ISO_HALF_WIDTH_PX, Z_UNIT_PX};
use super::{Canvas, EgaColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrismColors {
    pub top: EgaColor,
    pub left: EgaColor,
    pub right: EgaColor,
}

impl PrismColors {
    pub fn shaded(color: EgaColor) -> Self {
        Self {
            top: color,
            left: color.darker(),
            right: color.darker().darker(),
        }
    }
}

/// Isometric prism filling z range `[base, top]` of column `(x, y)`,
/// shrunk horizontally by `inset_px`.
pub fn draw_prism(
    canvas: &mut dyn Canvas,
    camera: &Camera,
    x: i32,
    y: i32,
    base: i32,
    top: i32,
    inset_px: i32,
    colors: PrismColors,
) {
    let half_w = (ISO_HALF_WIDTH_PX - inset_px).max(1);
    let half_h = (half_w * ISO_HALF_HEIGHT_PX / ISO_HALF_WIDTH_PX).max(1);
    let north = project(camera, x, y, top + 1);
    let center_x = north.x;
    let center_y = north.y + ISO_HALF_HEIGHT_PX;
    let side_px = (top + 1 - base).max(0) * Z_UNIT_PX;
    let depth = depth_at(x, y, top);

    for row in 0..=2 * half_h {
        let reach = if row <= half_h {
            row * half_w / half_h
        } else {
            (2 * half_h - row) * half_w / half_h
        };
        canvas.fill(
            center_x - reach,
            center_x + reach,
            center_y - half_h + row,
            depth,
            colors.top,
        );
    }

    for dx in -half_w..=half_w {
        let edge_y = center_y + (half_w - dx.abs()) * half_h / half_w;
        let color = if dx < 0 { colors.left } else { colors.right };
        for dy in 1..=side_px {
            canvas.plot(center_x + dx, edge_y + dy, depth, color);
        }
    }
}

/// Small upright marker, used for flat pickups and plates.
pub fn draw_plate(
    canvas: &mut dyn Canvas,
    camera: &Camera,
    x: i32,
    y: i32,
    z: i32,
    color: EgaColor,
) {
    draw_prism(
        canvas,
        camera,
        x,
        y,
        z,
        z,
        ISO_HALF_WIDTH_PX / 2,
        PrismColors::shaded(color),
    );
}
