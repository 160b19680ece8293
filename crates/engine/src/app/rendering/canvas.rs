use crate::content::PaletteImage;

use super::EgaColor;

pub const CANVAS_WIDTH: u32 = 320;
pub const CANVAS_HEIGHT: u32 = 200;

/// Indexed-colour drawing surface. Greater depth is nearer the viewer; a
/// pixel is only replaced by one at equal or greater depth.
pub trait Canvas {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn plot(&mut self, x: i32, y: i32, depth: i32, color: EgaColor);

    /// Horizontal span `x0..=x1` on row `y`.
    fn fill(&mut self, x0: i32, x1: i32, y: i32, depth: i32, color: EgaColor) {
        let (start, end) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        for x in start.max(0)..=end.min(self.width() - 1) {
            self.plot(x, y, depth, color);
        }
    }

    /// Draws `image` with its reference point at `(x, y)`.
    fn blit(&mut self, image: &PaletteImage, x: i32, y: i32, depth: i32) {
        let (ref_x, ref_y) = image.reference_point();
        for row in 0..image.height() {
            for column in 0..image.width() {
                if let Some((color, depth_offset)) = image.pixel(column, row) {
                    self.plot(
                        x - ref_x + column as i32,
                        y - ref_y + row as i32,
                        depth + depth_offset,
                        color,
                    );
                }
            }
        }
    }
}

/// Software canvas with a per-pixel depth buffer.
#[derive(Debug, Clone)]
pub struct EgaCanvas {
    width: u32,
    height: u32,
    colors: Vec<EgaColor>,
    depth: Vec<i32>,
}

impl EgaCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            colors: vec![EgaColor::Black; len],
            depth: vec![i32::MIN; len],
        }
    }

    pub fn clear(&mut self, color: EgaColor) {
        self.colors.fill(color);
        self.depth.fill(i32::MIN);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<EgaColor> {
        self.offset(x, y).map(|offset| self.colors[offset])
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Expands palette indices into an RGBA frame of the same size.
    pub fn write_rgba(&self, frame: &mut [u8]) {
        for (pixel, color) in frame.chunks_exact_mut(4).zip(&self.colors) {
            pixel.copy_from_slice(&color.rgba());
        }
    }
}

impl Canvas for EgaCanvas {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    fn plot(&mut self, x: i32, y: i32, depth: i32, color: EgaColor) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        if depth >= self.depth[offset] {
            self.depth[offset] = depth;
            self.colors[offset] = color;
        }
    }
}
