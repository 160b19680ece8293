use std::collections::HashMap;

use tracing::warn;

use crate::app::Canvas;
use crate::story::StoryEvents;

use super::sprite::{SpriteIdAllocator, SpriteOutputs};
use super::{
    Camera, Env, HitBox, InteractView, ObstacleQuery, Sprite, SpriteId, TickContext,
};

pub(crate) struct Slot {
    id: SpriteId,
    sprite: Option<Box<dyn Sprite>>,
    advance_disabled: bool,
    draw_disabled: bool,
    watching: Vec<SpriteId>,
}

impl Slot {
    fn new(id: SpriteId, sprite: Box<dyn Sprite>) -> Self {
        Self {
            id,
            sprite: Some(sprite),
            advance_disabled: false,
            draw_disabled: false,
            watching: Vec::new(),
        }
    }
}

/// Read-only view over the live sprites.
///
/// During a phase the sprite currently running is taken out of its slot, so
/// it never shows up in its own view.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    slots: &'a [Slot],
    index: &'a HashMap<SpriteId, usize>,
}

impl<'a> WorldView<'a> {
    fn new(slots: &'a [Slot], index: &'a HashMap<SpriteId, usize>) -> Self {
        Self { slots, index }
    }

    pub fn get(&self, id: SpriteId) -> Option<&'a dyn Sprite> {
        let index = *self.index.get(&id)?;
        self.slots.get(index)?.sprite.as_deref()
    }

    pub fn get_as<T: Sprite>(&self, id: SpriteId) -> Option<&'a T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &'a dyn Sprite)> + 'a {
        self.slots
            .iter()
            .filter_map(|slot| slot.sprite.as_deref().map(|sprite| (slot.id, sprite)))
    }

    pub fn hits(&self) -> impl Iterator<Item = (SpriteId, HitBox)> + 'a {
        self.iter()
            .filter_map(|(id, sprite)| sprite.hit_box().map(|hit| (id, hit)))
    }

    pub fn first_of<T: Sprite>(&self) -> Option<(SpriteId, &'a T)> {
        self.iter().find_map(|(id, sprite)| {
            sprite
                .as_any()
                .downcast_ref::<T>()
                .map(|typed| (id, typed))
        })
    }
}

impl ObstacleQuery for WorldView<'_> {
    fn is_platform(&self, x: i32, y: i32, z: i32) -> bool {
        self.iter()
            .filter_map(|(_, sprite)| sprite.obstacle())
            .any(|obstacle| obstacle.is_platform(x, y, z))
    }

    fn is_empty(&self, x: i32, y: i32, z: i32) -> bool {
        self.iter()
            .filter_map(|(_, sprite)| sprite.obstacle())
            .all(|obstacle| obstacle.is_empty(x, y, z))
    }

    fn is_void(&self, x: i32, y: i32, z: i32) -> bool {
        self.iter()
            .filter_map(|(_, sprite)| sprite.obstacle())
            .all(|obstacle| obstacle.is_void(x, y, z))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub advanced: usize,
    pub interacted: usize,
    pub aftermath: usize,
    pub added: usize,
    pub removed: usize,
}

/// Sprites a story disabled, so exactly those can be re-enabled later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrozenSet {
    advance: Vec<SpriteId>,
    draw: Vec<SpriteId>,
}

impl FrozenSet {
    pub fn advance_ids(&self) -> &[SpriteId] {
        &self.advance
    }

    pub fn draw_ids(&self) -> &[SpriteId] {
        &self.draw
    }

    pub fn is_empty(&self) -> bool {
        self.advance.is_empty() && self.draw.is_empty()
    }
}

#[derive(Clone, Copy)]
enum OutputPhase {
    Advance,
    Aftermath,
}

/// Owns every live sprite in draw order and drives the three-phase tick.
#[derive(Default)]
pub struct SpriteManager {
    slots: Vec<Slot>,
    index: HashMap<SpriteId, usize>,
    ids: SpriteIdAllocator,
    pending_adds: Vec<(SpriteId, Box<dyn Sprite>)>,
    pending_kills: Vec<SpriteId>,
    camera: Camera,
}

impl SpriteManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a sprite for the next `apply_pending`; its id is fixed now.
    pub fn add(&mut self, sprite: Box<dyn Sprite>) -> SpriteId {
        let id = self.ids.allocate();
        self.pending_adds.push((id, sprite));
        id
    }

    pub fn kill(&mut self, id: SpriteId) {
        self.pending_kills.push(id);
    }

    /// Apply buffered adds and kills, broadcasting departures then arrivals.
    /// Returns `(added, removed)`.
    pub fn apply_pending(&mut self) -> (usize, usize) {
        let mut kills = std::mem::take(&mut self.pending_kills);
        kills.sort_unstable();
        kills.dedup();

        let mut adds = std::mem::take(&mut self.pending_adds);
        adds.retain(|(id, _)| kills.binary_search(id).is_err());

        let departed: Vec<SpriteId> = kills
            .into_iter()
            .filter(|id| self.index.contains_key(id))
            .collect();

        if !departed.is_empty() {
            self.slots
                .retain(|slot| departed.binary_search(&slot.id).is_err());
            for slot in &mut self.slots {
                let (gone, kept): (Vec<SpriteId>, Vec<SpriteId>) = slot
                    .watching
                    .iter()
                    .copied()
                    .partition(|id| departed.binary_search(id).is_ok());
                slot.watching = kept;
                if let Some(sprite) = slot.sprite.as_mut() {
                    for id in gone {
                        sprite.on_departure(id);
                    }
                }
            }
        }

        let added = adds.len();
        let first_new = self.slots.len();
        self.slots
            .extend(adds.into_iter().map(|(id, sprite)| Slot::new(id, sprite)));

        for arrival in first_new..self.slots.len() {
            for other in 0..self.slots.len() {
                if other == arrival {
                    continue;
                }
                self.introduce(other, arrival);
                if other < first_new {
                    self.introduce(arrival, other);
                }
            }
        }

        if added > 0 || !departed.is_empty() {
            self.rebuild_index();
        }

        (added, departed.len())
    }

    fn introduce(&mut self, observer: usize, arrival: usize) {
        let arrival_id = self.slots[arrival].id;
        let Some(mut sprite) = self.slots[observer].sprite.take() else {
            return;
        };

        let mut keep = false;
        if let Some(other) = self.slots[arrival].sprite.as_deref() {
            if sprite.watches(other) {
                sprite.on_arrival(arrival_id, other);
                keep = true;
            }
        }
        if keep {
            self.slots[observer].watching.push(arrival_id);
        }
        self.slots[observer].sprite = Some(sprite);
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, slot) in self.slots.iter().enumerate() {
            self.index.insert(slot.id, position);
        }
    }

    /// Advance, apply, interact, aftermath, apply.
    pub fn tick(&mut self, env: &mut Env, events: &mut StoryEvents) -> TickReport {
        let mut report = TickReport::default();

        let advanced = self.run_output_phase(OutputPhase::Advance, env, events, &mut report);
        report.advanced = advanced;
        report.interacted = self.run_interact_phase();
        let aftermath = self.run_output_phase(OutputPhase::Aftermath, env, events, &mut report);
        report.aftermath = aftermath;

        report
    }

    fn run_output_phase(
        &mut self,
        phase: OutputPhase,
        env: &mut Env,
        events: &mut StoryEvents,
        report: &mut TickReport,
    ) -> usize {
        let mut outputs = SpriteOutputs::default();
        let mut ran = 0;

        for position in 0..self.slots.len() {
            if self.slots[position].advance_disabled {
                continue;
            }
            let id = self.slots[position].id;
            debug_assert!(
                self.slots[position].sprite.is_some(),
                "sprite slot {id:?} empty at phase start"
            );
            let Some(mut sprite) = self.slots[position].sprite.take() else {
                warn!(sprite = id.0, "sprite_slot_empty");
                continue;
            };
            {
                let world = WorldView::new(&self.slots, &self.index);
                let mut ctx = TickContext::new(id, world, env, &mut outputs);
                match phase {
                    OutputPhase::Advance => sprite.advance(&mut ctx),
                    OutputPhase::Aftermath => sprite.aftermath(&mut ctx),
                }
            }
            self.slots[position].sprite = Some(sprite);
            ran += 1;
        }

        let SpriteOutputs {
            adds,
            kills,
            events: emitted,
        } = outputs;
        for sprite in adds {
            self.add(sprite);
        }
        self.pending_kills.extend(kills);
        let (added, removed) = self.apply_pending();
        report.added += added;
        report.removed += removed;
        events.extend(emitted);

        ran
    }

    fn run_interact_phase(&mut self) -> usize {
        let mut ran = 0;

        for position in 0..self.slots.len() {
            if self.slots[position].advance_disabled {
                continue;
            }
            let id = self.slots[position].id;
            let Some(mut sprite) = self.slots[position].sprite.take() else {
                continue;
            };
            {
                let world = WorldView::new(&self.slots, &self.index);
                let view = InteractView::new(id, world, &self.slots[position].watching);
                sprite.interact(&view);
            }
            self.slots[position].sprite = Some(sprite);
            ran += 1;
        }

        ran
    }

    /// Remove every sprite. The camera is kept.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.pending_adds.clear();
        self.pending_kills.clear();
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for slot in &self.slots {
            if slot.draw_disabled {
                continue;
            }
            if let Some(sprite) = slot.sprite.as_deref() {
                sprite.draw(canvas, &self.camera);
            }
        }
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(&self.slots, &self.index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> Vec<SpriteId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: SpriteId) -> Option<&dyn Sprite> {
        self.view().get(id)
    }

    pub fn get_as<T: Sprite>(&self, id: SpriteId) -> Option<&T> {
        self.view().get_as(id)
    }

    pub fn get_as_mut<T: Sprite>(&mut self, id: SpriteId) -> Option<&mut T> {
        let index = *self.index.get(&id)?;
        self.slots
            .get_mut(index)?
            .sprite
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    pub fn watching(&self, id: SpriteId) -> Option<&[SpriteId]> {
        let index = *self.index.get(&id)?;
        self.slots.get(index).map(|slot| slot.watching.as_slice())
    }

    pub fn set_advance_disabled(&mut self, id: SpriteId, disabled: bool) -> bool {
        self.slot_mut(id)
            .map(|slot| slot.advance_disabled = disabled)
            .is_some()
    }

    pub fn set_draw_disabled(&mut self, id: SpriteId, disabled: bool) -> bool {
        self.slot_mut(id)
            .map(|slot| slot.draw_disabled = disabled)
            .is_some()
    }

    pub fn is_advance_disabled(&self, id: SpriteId) -> Option<bool> {
        self.slot(id).map(|slot| slot.advance_disabled)
    }

    pub fn is_draw_disabled(&self, id: SpriteId) -> Option<bool> {
        self.slot(id).map(|slot| slot.draw_disabled)
    }

    /// Disable advance and/or draw on every sprite not already disabled and
    /// record which ones were flipped.
    pub fn freeze(&mut self, advance: bool, draw: bool) -> FrozenSet {
        let mut frozen = FrozenSet::default();
        for slot in &mut self.slots {
            if advance && !slot.advance_disabled {
                slot.advance_disabled = true;
                frozen.advance.push(slot.id);
            }
            if draw && !slot.draw_disabled {
                slot.draw_disabled = true;
                frozen.draw.push(slot.id);
            }
        }
        frozen
    }

    /// Re-enable exactly the sprites a `freeze` flipped, where still alive.
    pub fn thaw(&mut self, frozen: FrozenSet) {
        for id in frozen.advance {
            if let Some(slot) = self.slot_mut(id) {
                slot.advance_disabled = false;
            }
        }
        for id in frozen.draw {
            if let Some(slot) = self.slot_mut(id) {
                slot.draw_disabled = false;
            }
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn slot(&self, id: SpriteId) -> Option<&Slot> {
        let index = *self.index.get(&id)?;
        self.slots.get(index)
    }

    fn slot_mut(&mut self, id: SpriteId) -> Option<&mut Slot> {
        let index = *self.index.get(&id)?;
        self.slots.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::story::StoryEvent;
    use crate::testing::test_env;

    type Log = Rc<RefCell<Vec<(&'static str, &'static str, Option<SpriteId>)>>>;

    #[derive(Default)]
    struct Tracer {
        tag: &'static str,
        log: Log,
        spawn_on_advance: Option<&'static str>,
        kill_on_advance: Option<SpriteId>,
        kill_self_in_aftermath: bool,
        emit_on_advance: Option<StoryEvent>,
        shy: bool,
    }

    impl Tracer {
        fn new(tag: &'static str, log: &Log) -> Self {
            Self {
                tag,
                log: Rc::clone(log),
                ..Self::default()
            }
        }

        fn record(&self, what: &'static str, other: Option<SpriteId>) {
            self.log.borrow_mut().push((self.tag, what, other));
        }
    }

    impl Sprite for Tracer {
        fn name(&self) -> &'static str {
            "tracer"
        }

        fn advance(&mut self, ctx: &mut TickContext<'_>) {
            self.record("advance", None);
            if let Some(tag) = self.spawn_on_advance.take() {
                ctx.spawn(Box::new(Tracer::new(tag, &self.log)));
            }
            if let Some(victim) = self.kill_on_advance.take() {
                ctx.kill(victim);
            }
            if let Some(event) = self.emit_on_advance.take() {
                ctx.emit(event);
            }
        }

        fn interact(&mut self, _view: &InteractView<'_>) {
            self.record("interact", None);
        }

        fn aftermath(&mut self, ctx: &mut TickContext<'_>) {
            self.record("aftermath", None);
            if self.kill_self_in_aftermath {
                ctx.kill_self();
            }
        }

        fn watches(&self, other: &dyn Sprite) -> bool {
            !other
                .as_any()
                .downcast_ref::<Tracer>()
                .is_some_and(|tracer| tracer.shy)
        }

        fn on_arrival(&mut self, id: SpriteId, _other: &dyn Sprite) {
            self.record("arrival", Some(id));
        }

        fn on_departure(&mut self, id: SpriteId) {
            self.record("departure", Some(id));
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn calls(log: &Log, tag: &'static str, what: &'static str) -> usize {
        log.borrow()
            .iter()
            .filter(|(t, w, _)| *t == tag && *w == what)
            .count()
    }

    #[test]
    fn live_list_is_start_plus_adds_minus_kills() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        let a = sprites.add(Box::new(Tracer::new("a", &log)));
        let b = sprites.add(Box::new(Tracer {
            spawn_on_advance: Some("c"),
            ..Tracer::new("b", &log)
        }));
        let d = sprites.add(Box::new(Tracer {
            kill_self_in_aftermath: true,
            ..Tracer::new("d", &log)
        }));
        let _killer = sprites.add(Box::new(Tracer {
            kill_on_advance: Some(a),
            ..Tracer::new("killer", &log)
        }));
        sprites.apply_pending();
        let before = sprites.ids();

        let mut env = test_env();
        let mut events = StoryEvents::default();
        let report = sprites.tick(&mut env, &mut events);

        let after = sprites.ids();
        assert_eq!(after.len(), before.len() + 1 - 2);
        assert!(!after.contains(&a));
        assert!(!after.contains(&d));
        assert!(after.contains(&b));
        assert_eq!(report.added, 1);
        assert_eq!(report.removed, 2);
        // new sprite is appended after the survivors
        assert_eq!(
            after
                .last()
                .and_then(|id| sprites.get_as::<Tracer>(*id))
                .map(|tracer| tracer.tag),
            Some("c")
        );
        assert_eq!(calls(&log, "c", "advance"), 0);
        assert_eq!(calls(&log, "c", "interact"), 1);
    }

    #[test]
    fn no_sprite_observes_itself() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        let mut ids = Vec::new();
        for tag in ["a", "b", "c"] {
            ids.push((tag, sprites.add(Box::new(Tracer::new(tag, &log)))));
        }
        sprites.apply_pending();
        let (_, b) = ids[1];
        sprites.kill(b);
        sprites.apply_pending();

        for (tag, id) in &ids {
            assert!(
                !log.borrow()
                    .iter()
                    .any(|(t, _, other)| t == tag && *other == Some(*id)),
                "{tag} observed itself"
            );
            if let Some(watching) = sprites.watching(*id) {
                assert!(!watching.contains(id));
            }
        }
        assert_eq!(calls(&log, "a", "arrival"), 2);
        assert_eq!(calls(&log, "a", "departure"), 1);
        assert_eq!(calls(&log, "b", "departure"), 0);
    }

    #[test]
    fn departures_only_reach_sprites_that_watched() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        sprites.add(Box::new(Tracer::new("a", &log)));
        let shy = sprites.add(Box::new(Tracer {
            shy: true,
            ..Tracer::new("shy", &log)
        }));
        let b = sprites.add(Box::new(Tracer::new("b", &log)));
        sprites.apply_pending();

        sprites.kill(shy);
        sprites.kill(b);
        sprites.apply_pending();

        let departures: Vec<Option<SpriteId>> = log
            .borrow()
            .iter()
            .filter(|(tag, what, _)| *tag == "a" && *what == "departure")
            .map(|(_, _, other)| *other)
            .collect();
        assert_eq!(departures, vec![Some(b)]);
    }

    #[test]
    fn sprites_killed_in_advance_skip_interact_and_aftermath() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        let victim = sprites.add(Box::new(Tracer::new("victim", &log)));
        sprites.add(Box::new(Tracer {
            kill_on_advance: Some(victim),
            ..Tracer::new("killer", &log)
        }));
        sprites.apply_pending();

        let mut env = test_env();
        let mut events = StoryEvents::default();
        sprites.tick(&mut env, &mut events);

        assert_eq!(calls(&log, "victim", "advance"), 1);
        assert_eq!(calls(&log, "victim", "interact"), 0);
        assert_eq!(calls(&log, "victim", "aftermath"), 0);
        assert_eq!(calls(&log, "killer", "aftermath"), 1);
    }

    #[test]
    fn added_and_killed_in_one_batch_never_arrives() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        sprites.add(Box::new(Tracer::new("watcher", &log)));
        sprites.apply_pending();

        let ghost = sprites.add(Box::new(Tracer::new("ghost", &log)));
        sprites.kill(ghost);
        sprites.kill(ghost);
        sprites.kill(SpriteId(9_999));
        let (added, removed) = sprites.apply_pending();

        assert_eq!((added, removed), (0, 0));
        assert!(!sprites.contains(ghost));
        assert_eq!(calls(&log, "watcher", "arrival"), 0);
    }

    #[test]
    fn watch_lists_follow_the_watches_filter() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        let a = sprites.add(Box::new(Tracer::new("a", &log)));
        let shy = sprites.add(Box::new(Tracer {
            shy: true,
            ..Tracer::new("shy", &log)
        }));
        sprites.apply_pending();

        assert_eq!(sprites.watching(a), Some(&[][..]));
        assert_eq!(sprites.watching(shy), Some(&[a][..]));
    }

    #[test]
    fn emitted_events_reach_the_queue_in_order() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        sprites.add(Box::new(Tracer {
            emit_on_advance: Some(StoryEvent::MonsterKilled),
            ..Tracer::new("a", &log)
        }));
        sprites.add(Box::new(Tracer {
            emit_on_advance: Some(StoryEvent::PlayerKilled),
            ..Tracer::new("b", &log)
        }));
        sprites.apply_pending();

        let mut env = test_env();
        let mut events = StoryEvents::default();
        sprites.tick(&mut env, &mut events);

        assert_eq!(
            events.drain(),
            vec![StoryEvent::MonsterKilled, StoryEvent::PlayerKilled]
        );
    }

    #[test]
    fn thaw_restores_exactly_the_frozen_subset() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        let a = sprites.add(Box::new(Tracer::new("a", &log)));
        let b = sprites.add(Box::new(Tracer::new("b", &log)));
        let c = sprites.add(Box::new(Tracer::new("c", &log)));
        sprites.apply_pending();
        sprites.set_advance_disabled(b, true);
        sprites.set_draw_disabled(c, true);

        let frozen = sprites.freeze(true, true);
        assert_eq!(frozen.advance_ids(), &[a, c]);
        assert_eq!(frozen.draw_ids(), &[a, b]);

        let mut env = test_env();
        let mut events = StoryEvents::default();
        let report = sprites.tick(&mut env, &mut events);
        assert_eq!(report.advanced, 0);

        sprites.thaw(frozen);
        assert_eq!(sprites.is_advance_disabled(a), Some(false));
        assert_eq!(sprites.is_advance_disabled(b), Some(true));
        assert_eq!(sprites.is_advance_disabled(c), Some(false));
        assert_eq!(sprites.is_draw_disabled(b), Some(false));
        assert_eq!(sprites.is_draw_disabled(c), Some(true));
    }

    #[test]
    fn clear_keeps_the_camera() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        sprites.add(Box::new(Tracer::new("a", &log)));
        sprites.apply_pending();
        sprites.camera_mut().set_origin(10, 20);

        sprites.clear();

        assert!(sprites.is_empty());
        assert_eq!(sprites.camera().origin(), (10, 20));
    }

    #[test]
    fn typed_access_downcasts_by_id() {
        let log = Log::default();
        let mut sprites = SpriteManager::new();
        let a = sprites.add(Box::new(Tracer::new("a", &log)));
        sprites.apply_pending();

        sprites
            .get_as_mut::<Tracer>(a)
            .expect("tracer")
            .tag = "renamed";

        assert_eq!(sprites.get_as::<Tracer>(a).map(|tracer| tracer.tag), Some("renamed"));
        assert!(sprites.view().first_of::<Tracer>().is_some());
    }
}
