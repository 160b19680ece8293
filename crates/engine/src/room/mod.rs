mod exit;
mod layout;
mod runtime;
mod table;

pub use exit::{DoorSpec, Exit, ExitTarget};
pub use layout::{
    BlockSpec, CameraLevel, CheckpointSpec, CritterSpec, RoomLayout, SwitchSpec, MAX_EXITS,
    MAX_ROOM_BLOCKS, MAX_SWITCHES,
};
pub use runtime::{Room, RoomId};
pub use table::RoomTable;
