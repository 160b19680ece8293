mod bits;
mod state;
mod store;

pub use bits::{BitError, BitReader, BitString, BitWriter};
pub use state::{
    decode, encode, DecodeError, ResumeSnapshot, SaveRecord, SaveState, CURRENT_VERSION,
    MAX_ROOM_STATE_BITS, MAX_SCORE, MAX_SNAPSHOT_DEATHS, MAX_SNAPSHOT_ROOMS, QUEST_COUNT,
};
pub use store::{FileSaveStore, MemorySaveStore, SaveError, SaveStore};
