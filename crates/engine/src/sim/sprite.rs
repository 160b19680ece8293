use std::any::Any;

use crate::app::Canvas;
use crate::geometry::GridPos;
use crate::story::StoryEvent;

use super::{Camera, Env, Obstacle, WorldView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u64);

#[derive(Debug, Default)]
pub(crate) struct SpriteIdAllocator {
    next: u64,
}

impl SpriteIdAllocator {
    pub(crate) fn allocate(&mut self) -> SpriteId {
        let id = SpriteId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Closed set of things that take part in collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitKind {
    Player,
    Monster,
    Projectile,
    Hazard,
}

/// Collision capability record: what a sprite is and the cells it fills.
///
/// `trail` is where the box stood before this tick's move, if it moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitBox {
    pub kind: HitKind,
    pub pos: GridPos,
    pub height: i32,
    pub trail: Option<GridPos>,
}

impl HitBox {
    /// Boxes overlap when they share cells now, or when both moved and
    /// traded places (each ended up where the other started).
    pub fn overlaps(&self, other: &HitBox) -> bool {
        if spans_meet(self.pos, self.height, other.pos, other.height) {
            return true;
        }
        match (self.trail, other.trail) {
            (Some(mine), Some(theirs)) => {
                spans_meet(self.pos, self.height, theirs, other.height)
                    && spans_meet(mine, self.height, other.pos, other.height)
            }
            _ => false,
        }
    }
}

fn spans_meet(a: GridPos, a_height: i32, b: GridPos, b_height: i32) -> bool {
    a.same_column(b) && a.z < b.z + b_height && b.z < a.z + a_height
}

/// Simulated entity driven by the sprite manager's three-phase tick.
///
/// `advance` computes the sprite's own next state. `interact` reads the
/// sprites on its watch list and may only record pending effects on itself.
/// `aftermath` turns those pending effects into kills, spawns and events.
/// Structural changes always go through the context and take effect between
/// phases.
pub trait Sprite: Any {
    fn name(&self) -> &'static str;

    fn advance(&mut self, ctx: &mut TickContext<'_>);

    fn interact(&mut self, _view: &InteractView<'_>) {}

    fn aftermath(&mut self, _ctx: &mut TickContext<'_>) {}

    fn draw(&self, _canvas: &mut dyn Canvas, _camera: &Camera) {}

    /// Whether this sprite keeps `other` on its watch list when it arrives.
    fn watches(&self, _other: &dyn Sprite) -> bool {
        true
    }

    fn on_arrival(&mut self, _id: SpriteId, _other: &dyn Sprite) {}

    fn on_departure(&mut self, _id: SpriteId) {}

    fn obstacle(&self) -> Option<&dyn Obstacle> {
        None
    }

    fn hit_box(&self) -> Option<HitBox> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Structural changes requested during one phase.
#[derive(Default)]
pub(crate) struct SpriteOutputs {
    pub(crate) adds: Vec<Box<dyn Sprite>>,
    pub(crate) kills: Vec<SpriteId>,
    pub(crate) events: Vec<StoryEvent>,
}

/// What an advancing sprite sees: the rest of the world read-only, the
/// environment, and the buffered output lists.
pub struct TickContext<'a> {
    id: SpriteId,
    world: WorldView<'a>,
    pub env: &'a mut Env,
    outputs: &'a mut SpriteOutputs,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(
        id: SpriteId,
        world: WorldView<'a>,
        env: &'a mut Env,
        outputs: &'a mut SpriteOutputs,
    ) -> Self {
        Self {
            id,
            world,
            env,
            outputs,
        }
    }

    pub fn id(&self) -> SpriteId {
        self.id
    }

    pub fn world(&self) -> WorldView<'a> {
        self.world
    }

    pub fn spawn(&mut self, sprite: Box<dyn Sprite>) {
        self.outputs.adds.push(sprite);
    }

    pub fn kill(&mut self, id: SpriteId) {
        self.outputs.kills.push(id);
    }

    pub fn kill_self(&mut self) {
        let id = self.id;
        self.kill(id);
    }

    pub fn emit(&mut self, event: StoryEvent) {
        self.outputs.events.push(event);
    }
}

/// Read-only view handed to `interact`, limited to the watch list.
pub struct InteractView<'a> {
    id: SpriteId,
    world: WorldView<'a>,
    watching: &'a [SpriteId],
}

impl<'a> InteractView<'a> {
    pub(crate) fn new(id: SpriteId, world: WorldView<'a>, watching: &'a [SpriteId]) -> Self {
        Self {
            id,
            world,
            watching,
        }
    }

    pub fn id(&self) -> SpriteId {
        self.id
    }

    pub fn watched(&self) -> impl Iterator<Item = (SpriteId, &'a dyn Sprite)> + '_ {
        let world = self.world;
        self.watching
            .iter()
            .filter_map(move |id| world.get(*id).map(|sprite| (*id, sprite)))
    }

    pub fn watched_hits(&self) -> impl Iterator<Item = (SpriteId, HitBox)> + '_ {
        self.watched()
            .filter_map(|(id, sprite)| sprite.hit_box().map(|hit| (id, hit)))
    }

    /// First watched hit box of one of `kinds` that overlaps `mine`.
    pub fn first_overlap(&self, mine: &HitBox, kinds: &[HitKind]) -> Option<(SpriteId, HitBox)> {
        self.watched_hits()
            .find(|(_, hit)| kinds.contains(&hit.kind) && hit.overlaps(mine))
    }
}
