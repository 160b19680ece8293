use std::collections::HashSet;

use serde::Deserialize;

use crate::app::EgaColor;
use crate::content::ContentError;
use crate::geometry::Direction;

use super::Exit;

pub const MAX_ROOM_BLOCKS: i32 = 64;
/// Entry indexes are stored in four bits.
pub const MAX_EXITS: usize = 16;
pub const MAX_SWITCHES: usize = 15;

fn default_wall_height() -> i32 {
    12
}

fn default_floor_color() -> EgaColor {
    EgaColor::DarkGray
}

fn default_wall_color() -> EgaColor {
    EgaColor::LightGray
}

fn default_block_color() -> EgaColor {
    EgaColor::Brown
}

fn default_heading() -> Direction {
    Direction::PosX
}

/// Authored content of one room. Coordinates are interior blocks
/// `0..width` by `0..depth`; z is in sub-block units with the floor surface at
/// `floor_z`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomLayout {
    pub name: String,
    pub width: i32,
    pub depth: i32,
    #[serde(default)]
    pub floor_z: i32,
    #[serde(default = "default_wall_height")]
    pub wall_height: i32,
    #[serde(default = "default_floor_color")]
    pub floor_color: EgaColor,
    #[serde(default = "default_wall_color")]
    pub wall_color: EgaColor,
    #[serde(default)]
    pub holes: Vec<[i32; 2]>,
    #[serde(default)]
    pub exits: Vec<Exit>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub critters: Vec<CritterSpec>,
    #[serde(default)]
    pub switches: Vec<SwitchSpec>,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointSpec>,
    #[serde(default)]
    pub goal: Option<[i32; 2]>,
    #[serde(default)]
    pub camera_levels: Vec<CameraLevel>,
}

/// Solid block standing `lift` units above the floor, `height` units tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSpec {
    pub x: i32,
    pub y: i32,
    pub height: i32,
    #[serde(default)]
    pub lift: i32,
    #[serde(default = "default_block_color")]
    pub color: EgaColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CritterSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_heading")]
    pub heading: Direction,
}

/// Floor plate toggling the doors of the listed exits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub opens: Vec<usize>,
    #[serde(default)]
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointSpec {
    pub x: i32,
    pub y: i32,
    pub entry: u8,
}

/// Camera band: applies while the player stands at or above `z_min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraLevel {
    pub z_min: i32,
    pub z_offset: i32,
}

impl BlockSpec {
    pub fn new(x: i32, y: i32, height: i32) -> Self {
        Self {
            x,
            y,
            height,
            lift: 0,
            color: default_block_color(),
        }
    }
}

impl RoomLayout {
    pub fn new(name: &str, width: i32, depth: i32) -> Self {
        Self {
            name: name.to_string(),
            width,
            depth,
            floor_z: 0,
            wall_height: default_wall_height(),
            floor_color: default_floor_color(),
            wall_color: default_wall_color(),
            holes: Vec::new(),
            exits: Vec::new(),
            blocks: Vec::new(),
            critters: Vec::new(),
            switches: Vec::new(),
            checkpoints: Vec::new(),
            goal: None,
            camera_levels: Vec::new(),
        }
    }

    pub fn with_exit(mut self, exit: Exit) -> Self {
        self.exits.push(exit);
        self
    }

    pub fn with_block(mut self, block: BlockSpec) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_hole(mut self, x: i32, y: i32) -> Self {
        self.holes.push([x, y]);
        self
    }

    pub fn with_critter(mut self, x: i32, y: i32, heading: Direction) -> Self {
        self.critters.push(CritterSpec { x, y, heading });
        self
    }

    pub fn with_switch(mut self, x: i32, y: i32, opens: &[usize]) -> Self {
        self.switches.push(SwitchSpec {
            x,
            y,
            opens: opens.to_vec(),
            on: false,
        });
        self
    }

    pub fn with_checkpoint(mut self, x: i32, y: i32, entry: u8) -> Self {
        self.checkpoints.push(CheckpointSpec { x, y, entry });
        self
    }

    pub fn with_goal(mut self, x: i32, y: i32) -> Self {
        self.goal = Some([x, y]);
        self
    }

    pub fn with_camera_levels(mut self, levels: &[CameraLevel]) -> Self {
        self.camera_levels = levels.to_vec();
        self
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.depth).contains(&y)
    }

    /// Camera level whose band holds `z`; level 0 when none is declared.
    pub fn camera_band(&self, z: i32) -> usize {
        self.camera_levels
            .iter()
            .rposition(|level| z >= level.z_min)
            .unwrap_or(0)
    }

    pub fn camera_offset(&self, level: usize) -> i32 {
        self.camera_levels
            .get(level)
            .map_or(0, |level| level.z_offset)
    }

    /// Checks everything that only depends on this room. `path` prefixes
    /// error locations.
    pub fn validate(&self, path: &str) -> Result<(), ContentError> {
        if self.name.is_empty() {
            return Err(ContentError::invalid(format!("{path}.name"), "must not be empty"));
        }
        for (field, value) in [("width", self.width), ("depth", self.depth)] {
            if !(1..=MAX_ROOM_BLOCKS).contains(&value) {
                return Err(ContentError::expected_actual(
                    format!("{path}.{field}"),
                    format!("1..={MAX_ROOM_BLOCKS}"),
                    value,
                ));
            }
        }
        if self.wall_height <= 0 {
            return Err(ContentError::expected_actual(
                format!("{path}.wall_height"),
                "> 0",
                self.wall_height,
            ));
        }
        if self.exits.len() > MAX_EXITS {
            return Err(ContentError::expected_actual(
                format!("{path}.exits"),
                format!("at most {MAX_EXITS} exits"),
                self.exits.len(),
            ));
        }
        let mut doors = HashSet::new();
        for (index, exit) in self.exits.iter().enumerate() {
            let exit_path = format!("{path}.exits[{index}]");
            let length = exit.wall_length(self.width, self.depth);
            if !(0..length).contains(&exit.position) {
                return Err(ContentError::expected_actual(
                    format!("{exit_path}.position"),
                    format!("0..{length}"),
                    exit.position,
                ));
            }
            if !doors.insert(exit.door_cell(self.width, self.depth)) {
                return Err(ContentError::invalid(exit_path, "two exits share a door cell"));
            }
            if exit.door.drop_depth < 0 {
                return Err(ContentError::expected_actual(
                    format!("{exit_path}.door.drop_depth"),
                    ">= 0",
                    exit.door.drop_depth,
                ));
            }
            if let Some(level) = exit.camera_level {
                if level >= self.camera_levels.len().max(1) {
                    return Err(ContentError::expected_actual(
                        format!("{exit_path}.camera_level"),
                        format!("< {}", self.camera_levels.len().max(1)),
                        level,
                    ));
                }
            }
        }
        let cells = self
            .blocks
            .iter()
            .map(|block| ("blocks", block.x, block.y))
            .chain(self.critters.iter().map(|c| ("critters", c.x, c.y)))
            .chain(self.switches.iter().map(|s| ("switches", s.x, s.y)))
            .chain(self.checkpoints.iter().map(|c| ("checkpoints", c.x, c.y)))
            .chain(self.holes.iter().map(|[x, y]| ("holes", *x, *y)))
            .chain(self.goal.iter().map(|[x, y]| ("goal", *x, *y)));
        for (field, x, y) in cells {
            if !self.contains(x, y) {
                return Err(ContentError::invalid(
                    format!("{path}.{field}"),
                    format!("cell ({x}, {y}) lies outside {}x{}", self.width, self.depth),
                ));
            }
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.height <= 0 || block.lift < 0 {
                return Err(ContentError::invalid(
                    format!("{path}.blocks[{index}]"),
                    "height must be positive and lift not negative",
                ));
            }
        }
        if self.switches.len() > MAX_SWITCHES {
            return Err(ContentError::expected_actual(
                format!("{path}.switches"),
                format!("at most {MAX_SWITCHES} switches"),
                self.switches.len(),
            ));
        }
        for (index, switch) in self.switches.iter().enumerate() {
            if let Some(bad) = switch.opens.iter().find(|exit| **exit >= self.exits.len()) {
                return Err(ContentError::expected_actual(
                    format!("{path}.switches[{index}].opens"),
                    format!("exit index < {}", self.exits.len()),
                    bad,
                ));
            }
        }
        for (index, checkpoint) in self.checkpoints.iter().enumerate() {
            if usize::from(checkpoint.entry) >= self.exits.len() {
                return Err(ContentError::expected_actual(
                    format!("{path}.checkpoints[{index}].entry"),
                    format!("< {}", self.exits.len()),
                    checkpoint.entry,
                ));
            }
        }
        let ascending = self.camera_levels.windows(2).all(|pair| {
            pair[0].z_min < pair[1].z_min && pair[0].z_offset < pair[1].z_offset
        });
        if !ascending {
            return Err(ContentError::invalid(
                format!("{path}.camera_levels"),
                "z_min and z_offset must both be strictly ascending",
            ));
        }
        Ok(())
    }
}
