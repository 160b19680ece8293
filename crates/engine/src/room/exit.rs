use serde::Deserialize;

use crate::app::EgaColor;
use crate::geometry::Direction;

/// A doorway in one of the room's four walls.
///
/// `wall` points outward; `position` runs along the wall. The door cell is the
/// wall-line cell just outside the interior, the entry cell is the interior
/// cell in front of it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Exit {
    pub wall: Direction,
    pub position: i32,
    #[serde(default)]
    pub destination: Option<ExitTarget>,
    #[serde(default)]
    pub camera_level: Option<usize>,
    #[serde(default)]
    pub door: DoorSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExitTarget {
    pub room: String,
    pub entry: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoorSpec {
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub floor_color: Option<EgaColor>,
    /// How far the door's floor sits below room floor level.
    #[serde(default)]
    pub drop_depth: i32,
}

impl Exit {
    pub fn new(wall: Direction, position: i32) -> Self {
        Self {
            wall,
            position,
            destination: None,
            camera_level: None,
            door: DoorSpec::default(),
        }
    }

    pub fn to(mut self, room: &str, entry: u8) -> Self {
        self.destination = Some(ExitTarget {
            room: room.to_string(),
            entry,
        });
        self
    }

    pub fn closed(mut self) -> Self {
        self.door.closed = true;
        self
    }

    pub fn with_camera_level(mut self, level: usize) -> Self {
        self.camera_level = Some(level);
        self
    }

    pub fn with_drop_depth(mut self, depth: i32) -> Self {
        self.door.drop_depth = depth;
        self
    }

    /// Facing of a player who just came through this door.
    pub fn inward(&self) -> Direction {
        self.wall.reverse()
    }

    pub fn door_cell(&self, width: i32, depth: i32) -> (i32, i32) {
        match self.wall {
            Direction::PosX => (width, self.position),
            Direction::NegX => (-1, self.position),
            Direction::PosY => (self.position, depth),
            Direction::NegY => (self.position, -1),
        }
    }

    pub fn entry_cell(&self, width: i32, depth: i32) -> (i32, i32) {
        let (x, y) = self.door_cell(width, depth);
        let (dx, dy) = self.inward().delta();
        (x + dx, y + dy)
    }

    /// Length of the wall this exit sits in.
    pub(crate) fn wall_length(&self, width: i32, depth: i32) -> i32 {
        match self.wall {
            Direction::PosX | Direction::NegX => depth,
            Direction::PosY | Direction::NegY => width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_and_entry_cells_straddle_each_wall() {
        let cases = [
            (Direction::PosX, (8, 2), (7, 2)),
            (Direction::NegX, (-1, 2), (0, 2)),
            (Direction::PosY, (2, 6), (2, 5)),
            (Direction::NegY, (2, -1), (2, 0)),
        ];
        for (wall, door, entry) in cases {
            let exit = Exit::new(wall, 2);
            assert_eq!(exit.door_cell(8, 6), door, "{wall:?}");
            assert_eq!(exit.entry_cell(8, 6), entry, "{wall:?}");
        }
    }

    #[test]
    fn exits_deserialize_with_defaults() {
        let exit: Exit = serde_json::from_str(
            r#"{ "wall": "pos_x", "position": 3, "destination": { "room": "B2", "entry": 3 } }"#,
        )
        .expect("exit");

        assert_eq!(exit, Exit::new(Direction::PosX, 3).to("B2", 3));
        assert!(!exit.door.closed);
    }
}
