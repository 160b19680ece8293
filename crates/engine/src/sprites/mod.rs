mod block;
mod bullet;
mod checkpoint;
mod critter;
mod door;
mod floor;
mod goal;
mod marker;
mod player;
mod switch;

pub use block::Block;
pub use bullet::Bullet;
pub use checkpoint::Checkpoint;
pub use critter::Critter;
pub use door::Door;
pub use floor::Floor;
pub use goal::Goal;
pub use marker::QuestMarker;
pub use player::Player;
pub use switch::Switch;

use crate::geometry::{GridPos, BLOCK_Z};
use crate::sim::{footing, Camera, Footing, HitBox, HitKind, InteractView, WorldView};

macro_rules! impl_as_any {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
pub(crate) use impl_as_any;

/// Counts one tick toward `period`; true once the period has elapsed.
pub(crate) fn cadence(counter: &mut u32, period: u32) -> bool {
    *counter = counter.saturating_add(1);
    if *counter >= period.max(1) {
        *counter = 0;
        true
    } else {
        false
    }
}

/// Scripted gravity: a mover without a platform drops one z unit every
/// `fall_ticks`. Returns the footing found before any drop.
pub(crate) fn apply_gravity(
    world: &WorldView<'_>,
    pos: &mut GridPos,
    counter: &mut u32,
    fall_ticks: u32,
) -> Footing {
    let found = footing(world, *pos);
    match found {
        Footing::Standing => *counter = 0,
        Footing::Falling => {
            if cadence(counter, fall_ticks) {
                pos.z -= 1;
            }
        }
        Footing::Void => {}
    }
    found
}

/// Collision box of a mover standing at `pos`: the body starts one unit up.
pub(crate) fn body_box(kind: HitKind, pos: GridPos, height: i32) -> HitBox {
    HitBox {
        kind,
        pos: pos.with_z(pos.z + 1),
        height,
        trail: None,
    }
}

/// Body box of a mover that started this tick at `from`.
pub(crate) fn moving_box(kind: HitKind, from: GridPos, pos: GridPos, height: i32) -> HitBox {
    let mut hit = body_box(kind, pos, height);
    if from != pos {
        hit.trail = Some(from.with_z(from.z + 1));
    }
    hit
}

/// Whether a watched player stands on (or just above) the plate at `pos`.
pub(crate) fn player_on_plate(view: &InteractView<'_>, pos: GridPos) -> bool {
    let trigger = HitBox {
        kind: HitKind::Hazard,
        pos: pos.with_z(pos.z + 1),
        height: BLOCK_Z,
        trail: None,
    };
    view.first_overlap(&trigger, &[HitKind::Player]).is_some()
}

/// Wall and door columns sit one block outside the interior; draw them when
/// they border the visible screen.
pub(crate) fn near_screen(camera: &Camera, x: i32, y: i32) -> bool {
    [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]
        .into_iter()
        .any(|(dx, dy)| camera.shows_column(x + dx, y + dy))
}
