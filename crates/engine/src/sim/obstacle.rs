use crate::geometry::{Direction, DirectionSet, GridPos};

use super::GameRng;

/// Space-occupying capability. All predicates are pure.
///
/// An obstacle that fills `[base, top]` of a column is not empty anywhere in
/// that range, is a platform exactly at `top` (a walker standing there has its
/// body at `top + 1` and above), and is void below `base`.
pub trait Obstacle {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool;
    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool;
    fn is_void(&self, x: i32, y: i32, z: i32) -> bool;
}

/// Inclusive z range filled by a solid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub base: i32,
    pub top: i32,
}

impl ColumnSpan {
    pub const fn new(base: i32, top: i32) -> Self {
        Self { base, top }
    }

    pub fn is_platform(self, z: i32) -> bool {
        z == self.top
    }

    pub fn is_empty(self, z: i32) -> bool {
        z < self.base || z > self.top
    }

    pub fn is_void(self, z: i32) -> bool {
        z < self.base
    }
}

/// Composed view over every obstacle in a world: platform if any obstacle is
/// a platform, empty and void only if all of them agree.
pub trait ObstacleQuery {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool;
    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool;
    fn is_void(&self, x: i32, y: i32, z: i32) -> bool;
}

impl<T: Obstacle> ObstacleQuery for [T] {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool {
        self.iter().any(|obstacle| obstacle.is_platform(x, y, z))
    }

    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool {
        self.iter().all(|obstacle| obstacle.is_empty(x, y, z))
    }

    fn is_void(&self, x: i32, y: i32, z: i32) -> bool {
        self.iter().all(|obstacle| obstacle.is_void(x, y, z))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footing {
    Standing,
    /// No platform yet but something below; the mover drops one unit at a time.
    Falling,
    /// Nothing at or below; the mover has left the world.
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget {
    Stand(i32),
    /// Body fits at the current level but nothing is underfoot.
    Drop,
    Blocked,
}

pub fn body_fits<Q: ObstacleQuery + ?Sized>(query: &Q, pos: GridPos, height: i32) -> bool {
    (pos.z + 1..=pos.z + height).all(|z| query.is_empty(pos.x, pos.y, z))
}

pub fn can_stand<Q: ObstacleQuery + ?Sized>(query: &Q, pos: GridPos, height: i32) -> bool {
    query.is_platform(pos.x, pos.y, pos.z) && body_fits(query, pos, height)
}

pub fn footing<Q: ObstacleQuery + ?Sized>(query: &Q, pos: GridPos) -> Footing {
    if query.is_platform(pos.x, pos.y, pos.z) {
        Footing::Standing
    } else if query.is_void(pos.x, pos.y, pos.z) {
        Footing::Void
    } else {
        Footing::Falling
    }
}

/// Same level first, then climbing up to `climb`, then dropping up to `drop`.
pub fn find_step<Q: ObstacleQuery + ?Sized>(
    query: &Q,
    from: GridPos,
    direction: Direction,
    height: i32,
    climb: i32,
    drop: i32,
) -> StepTarget {
    let target = from.step(direction);
    let offsets = std::iter::once(0)
        .chain(1..=climb.max(0))
        .chain((1..=drop.max(0)).map(|dz| -dz));

    for dz in offsets {
        let candidate = target.with_z(from.z + dz);
        if can_stand(query, candidate, height) {
            return StepTarget::Stand(candidate.z);
        }
    }

    if body_fits(query, target, height) {
        StepTarget::Drop
    } else {
        StepTarget::Blocked
    }
}

pub fn legal_directions<Q: ObstacleQuery + ?Sized>(
    query: &Q,
    from: GridPos,
    height: i32,
    climb: i32,
    drop: i32,
) -> DirectionSet {
    Direction::ALL
        .into_iter()
        .filter(|direction| {
            matches!(
                find_step(query, from, *direction, height, climb, drop),
                StepTarget::Stand(_)
            )
        })
        .collect()
}

/// Heading policy for wandering movers.
///
/// A committed turn is kept while still legal. Otherwise any legal direction
/// other than the one just arrived from is picked at random, then the reverse,
/// then anything at all.
pub fn choose_direction(
    legal: DirectionSet,
    turning: Option<Direction>,
    heading: Direction,
    rng: &mut GameRng,
) -> Direction {
    if let Some(turn) = turning {
        if legal.contains(turn) {
            return turn;
        }
    }

    let arrival = heading.reverse();
    let candidates = legal.without(arrival);
    if !candidates.is_empty() {
        let index = rng.below(candidates.len() as u32) as usize;
        if let Some(direction) = candidates.nth(index) {
            return direction;
        }
    }

    if legal.contains(arrival) {
        return arrival;
    }

    Direction::ALL[rng.below(Direction::ALL.len() as u32) as usize]
}
