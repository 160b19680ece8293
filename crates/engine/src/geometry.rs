use serde::Deserialize;

/// Blocks visible along one horizontal axis of a screen.
pub const SCREEN_BLOCKS: i32 = 10;
/// Sub-block z units making up one block of height.
pub const BLOCK_Z: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }

    pub fn with_z(self, z: i32) -> Self {
        Self { z, ..self }
    }

    pub fn same_column(self, other: GridPos) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
    ];

    pub const fn reverse(self) -> Self {
        match self {
            Direction::PosX => Direction::NegX,
            Direction::NegX => Direction::PosX,
            Direction::PosY => Direction::NegY,
            Direction::NegY => Direction::PosY,
        }
    }

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::PosX => (1, 0),
            Direction::NegX => (-1, 0),
            Direction::PosY => (0, 1),
            Direction::NegY => (0, -1),
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Direction::PosX => 0b0001,
            Direction::NegX => 0b0010,
            Direction::PosY => 0b0100,
            Direction::NegY => 0b1000,
        }
    }
}

/// Small set of directions, iterated in `Direction::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Direction::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }

    pub fn without(mut self, direction: Direction) -> Self {
        self.remove(direction);
        self
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }

    pub fn nth(self, index: usize) -> Option<Direction> {
        self.iter().nth(index)
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        let mut set = DirectionSet::empty();
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Origin of the screen-sized window containing `value` along one axis.
pub fn screen_origin(value: i32) -> i32 {
    value.div_euclid(SCREEN_BLOCKS) * SCREEN_BLOCKS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_an_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction.reverse(), direction);
            assert_eq!(direction.reverse().reverse(), direction);
        }
    }

    #[test]
    fn direction_set_tracks_membership_in_fixed_order() {
        let set: DirectionSet = [Direction::NegY, Direction::PosX].into_iter().collect();

        assert_eq!(set.len(), 2);
        assert!(set.contains(Direction::PosX));
        assert!(!set.contains(Direction::NegX));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Direction::PosX, Direction::NegY]
        );
        assert!(set.without(Direction::PosX).without(Direction::NegY).is_empty());
    }

    #[test]
    fn screen_origin_floors_negative_coordinates() {
        assert_eq!(screen_origin(0), 0);
        assert_eq!(screen_origin(9), 0);
        assert_eq!(screen_origin(10), 10);
        assert_eq!(screen_origin(-1), -10);
    }
}
