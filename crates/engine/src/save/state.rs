use thiserror::Error;
use tracing::{info, warn};

use super::bits::{BitError, BitReader, BitString, BitWriter};
use super::store::{SaveError, SaveStore};

pub const QUEST_COUNT: usize = 4;
pub const MAX_SCORE: u8 = 5;
pub const CURRENT_VERSION: u8 = 2;

const VERSION_BITS: u32 = 8;
const SCORE_BITS: u32 = 3;
const QUEST_BITS: u32 = 2;
const ROOM_BITS: u32 = 6;
const ENTRY_BITS: u32 = 4;
const DEATHS_BITS: u32 = 8;
const ROOM_COUNT_BITS: u32 = 6;
const ROOM_STATE_LEN_BITS: u32 = 12;

/// Largest per-room state a snapshot can carry.
pub const MAX_ROOM_STATE_BITS: usize = (1 << ROOM_STATE_LEN_BITS) - 1;
/// Largest room count a snapshot can carry.
pub const MAX_SNAPSHOT_ROOMS: usize = (1 << ROOM_COUNT_BITS) - 1;
/// Death count a snapshot saturates at.
pub const MAX_SNAPSHOT_DEATHS: u8 = ((1u32 << DEATHS_BITS) - 1) as u8;

/// A dungeon run interrupted at a room change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSnapshot {
    pub quest: u8,
    pub room: u8,
    pub entry: u8,
    /// Deaths so far in the run, held at `MAX_SNAPSHOT_DEATHS` once reached.
    pub deaths: u8,
    pub room_states: Vec<BitString>,
}

/// Normalised save contents every format version decodes into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveRecord {
    pub scores: [u8; QUEST_COUNT],
    pub training_done: bool,
    pub resume: Option<ResumeSnapshot>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Bits(#[from] BitError),
    #[error("unknown save version {0}")]
    UnknownVersion(u8),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
    #[error("non-zero bits after the record")]
    TrailingBits,
}

fn check(field: &'static str, value: u64, valid: bool) -> Result<(), DecodeError> {
    if valid {
        Ok(())
    } else {
        Err(DecodeError::OutOfRange { field, value })
    }
}

fn read_scores(reader: &mut BitReader<'_>) -> Result<[u8; QUEST_COUNT], DecodeError> {
    let mut scores = [0; QUEST_COUNT];
    for score in &mut scores {
        let value = reader.read(SCORE_BITS)?;
        check("score", value, value <= u64::from(MAX_SCORE))?;
        *score = value as u8;
    }
    Ok(scores)
}

fn read_resume(reader: &mut BitReader<'_>) -> Result<ResumeSnapshot, DecodeError> {
    let quest = reader.read(QUEST_BITS)? as u8;
    let room = reader.read(ROOM_BITS)?;
    let entry = reader.read(ENTRY_BITS)? as u8;
    let deaths = reader.read(DEATHS_BITS)? as u8;
    let room_count = reader.read(ROOM_COUNT_BITS)?;
    check("room_count", room_count, room_count > 0)?;
    check("room", room, room < room_count)?;

    let mut room_states = Vec::with_capacity(room_count as usize);
    for _ in 0..room_count {
        let len = reader.read(ROOM_STATE_LEN_BITS)? as usize;
        room_states.push(reader.read_bit_string(len)?);
    }
    Ok(ResumeSnapshot {
        quest,
        room: room as u8,
        entry,
        deaths,
        room_states,
    })
}

/// Version 1: scores only.
fn decode_v1(reader: &mut BitReader<'_>) -> Result<SaveRecord, DecodeError> {
    Ok(SaveRecord {
        scores: read_scores(reader)?,
        ..SaveRecord::default()
    })
}

/// Version 2: scores, training flag and an optional resume snapshot.
fn decode_v2(reader: &mut BitReader<'_>) -> Result<SaveRecord, DecodeError> {
    let scores = read_scores(reader)?;
    let training_done = reader.read_bool()?;
    let resume = if reader.read_bool()? {
        Some(read_resume(reader)?)
    } else {
        None
    };
    Ok(SaveRecord {
        scores,
        training_done,
        resume,
    })
}

pub fn decode(bytes: &[u8]) -> Result<SaveRecord, DecodeError> {
    let mut reader = BitReader::new(bytes);
    let version = reader.read(VERSION_BITS)? as u8;
    let record = match version {
        1 => decode_v1(&mut reader)?,
        2 => decode_v2(&mut reader)?,
        other => return Err(DecodeError::UnknownVersion(other)),
    };
    if !reader.rest_is_zero() {
        return Err(DecodeError::TrailingBits);
    }
    Ok(record)
}

/// Always writes the current version.
pub fn encode(record: &SaveRecord) -> Result<Vec<u8>, BitError> {
    let mut writer = BitWriter::new();
    writer.write(u64::from(CURRENT_VERSION), VERSION_BITS)?;
    for score in record.scores {
        writer.write(u64::from(score), SCORE_BITS)?;
    }
    writer.write_bool(record.training_done);
    writer.write_bool(record.resume.is_some());
    if let Some(resume) = &record.resume {
        writer.write(u64::from(resume.quest), QUEST_BITS)?;
        writer.write(u64::from(resume.room), ROOM_BITS)?;
        writer.write(u64::from(resume.entry), ENTRY_BITS)?;
        writer.write(u64::from(resume.deaths), DEATHS_BITS)?;
        writer.write(resume.room_states.len() as u64, ROOM_COUNT_BITS)?;
        for state in &resume.room_states {
            writer.write(state.len() as u64, ROOM_STATE_LEN_BITS)?;
            writer.write_bits(state);
        }
    }
    Ok(writer.into_bytes())
}

/// Live save state with a dirty flag gating persistence.
#[derive(Debug, Clone, Default)]
pub struct SaveState {
    record: SaveRecord,
    dirty: bool,
}

impl SaveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: SaveRecord) -> Self {
        Self {
            record,
            dirty: false,
        }
    }

    /// Anything that fails to decode is discarded whole.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match decode(bytes) {
            Ok(record) => Self::from_record(record),
            Err(error) => {
                warn!(error = %error, len = bytes.len(), "save_rejected");
                Self::default()
            }
        }
    }

    pub fn load(store: &dyn SaveStore) -> Result<Self, SaveError> {
        Ok(match store.load()? {
            Some(bytes) => Self::from_bytes(&bytes),
            None => Self::default(),
        })
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn score(&self, quest: usize) -> u8 {
        self.record.scores.get(quest).copied().unwrap_or(0)
    }

    /// Keeps the better of the stored and new score. Returns whether it changed.
    pub fn set_score_if_better(&mut self, quest: usize, score: u8) -> bool {
        let score = score.min(MAX_SCORE);
        match self.record.scores.get_mut(quest) {
            Some(best) if score > *best => {
                *best = score;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn training_done(&self) -> bool {
        self.record.training_done
    }

    pub fn mark_training_done(&mut self) {
        if !self.record.training_done {
            self.record.training_done = true;
            self.dirty = true;
        }
    }

    pub fn resume(&self) -> Option<&ResumeSnapshot> {
        self.record.resume.as_ref()
    }

    pub fn set_resume(&mut self, snapshot: ResumeSnapshot) {
        if self.record.resume.as_ref() != Some(&snapshot) {
            self.record.resume = Some(snapshot);
            self.dirty = true;
        }
    }

    pub fn clear_resume(&mut self) {
        if self.record.resume.take().is_some() {
            self.dirty = true;
        }
    }

    /// Whether an interrupted quest can be resumed.
    pub fn has_restart_data(&self) -> bool {
        self.record.resume.is_some()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BitError> {
        encode(&self.record)
    }

    /// Writes through `store` only when something changed since the last
    /// write. Returns whether a write happened.
    pub fn persist_if_dirty(&mut self, store: &mut dyn SaveStore) -> Result<bool, SaveError> {
        if !self.dirty {
            return Ok(false);
        }
        let bytes = self.to_bytes()?;
        store.store(&bytes)?;
        self.dirty = false;
        info!(bytes = bytes.len(), "save_written");
        Ok(true)
    }
}
