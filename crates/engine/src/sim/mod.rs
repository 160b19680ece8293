mod camera;
mod env;
mod manager;
mod obstacle;
mod rng;
mod sprite;

pub use camera::Camera;
pub use env::Env;
pub use manager::{FrozenSet, SpriteManager, TickReport, WorldView};
pub use obstacle::{
    body_fits, can_stand, choose_direction, find_step, footing, legal_directions, ColumnSpan,
    Footing, Obstacle, ObstacleQuery, StepTarget,
};
pub use rng::GameRng;
pub use sprite::{HitBox, HitKind, InteractView, Sprite, SpriteId, TickContext};
