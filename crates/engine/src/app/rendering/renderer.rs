use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::{EgaCanvas, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Presents the indexed canvas through `pixels`, scaled to the window.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self { window, pixels })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(CANVAS_WIDTH, CANVAS_HEIGHT, surface)
    }

    pub fn render(&mut self, canvas: &EgaCanvas) -> Result<(), Error> {
        canvas.write_rgba(self.pixels.frame_mut());
        self.pixels.render()
    }
}
