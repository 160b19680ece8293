mod audio;
mod input;
mod loop_runner;
mod rendering;

pub use audio::{Audio, NullAudio, SoundId};
#[cfg(test)]
pub(crate) use audio::{AudioCall, RecordingAudio};
pub use input::{InputAction, InputMode, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use rendering::{
    depth_at, draw_plate, draw_prism, project, scroll_delta_px, Canvas, EgaCanvas, EgaColor,
    PrismColors, Renderer, ScreenPoint, CANVAS_HEIGHT, CANVAS_WIDTH, ISO_HALF_HEIGHT_PX,
    ISO_HALF_WIDTH_PX, Z_UNIT_PX,
};
