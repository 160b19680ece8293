mod canvas;
mod palette;
mod renderer;
mod shapes;
mod transform;

pub use canvas::{Canvas, EgaCanvas, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use palette::EgaColor;
pub use renderer::Renderer;
pub use shapes::{draw_plate, draw_prism, PrismColors};
pub use transform::{
    depth_at, project, scroll_delta_px, ScreenPoint, ISO_HALF_HEIGHT_PX, ISO_HALF_WIDTH_PX,
    Z_UNIT_PX,
};
