use tracing::{debug, warn};

use crate::content::GameConfig;
use crate::geometry::{Direction, GridPos, BLOCK_Z, SCREEN_BLOCKS};
use crate::save::{BitError, BitReader, BitString, BitWriter};
use crate::sim::{can_stand, ColumnSpan, SpriteId, SpriteManager};
use crate::sprites::{Block, Checkpoint, Critter, Door, Floor, Goal, Player, Switch};
use crate::story::StoryEvent;

use super::{Exit, RoomLayout};

/// Index of a room inside its quest's `RoomTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub usize);

const FORMAT_VERSION: u64 = 1;
const FORMAT_VERSION_BITS: u32 = 4;
const SWITCH_COUNT_BITS: u32 = 4;

struct PuzzleState {
    switches: Vec<bool>,
    doors: Vec<bool>,
}

/// Authored layout plus the puzzle state that survives leaving the room.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    layout: RoomLayout,
    switch_states: Vec<bool>,
    door_open: Vec<bool>,
    doors: Vec<Option<SpriteId>>,
    player: Option<SpriteId>,
}

impl Room {
    pub fn new(id: RoomId, layout: RoomLayout) -> Self {
        let switch_states = layout.switches.iter().map(|switch| switch.on).collect();
        let door_open = layout.exits.iter().map(|exit| !exit.door.closed).collect();
        Self {
            id,
            switch_states,
            door_open,
            doors: Vec::new(),
            player: None,
            layout,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.layout.name
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn exits(&self) -> &[Exit] {
        &self.layout.exits
    }

    pub fn switch_states(&self) -> &[bool] {
        &self.switch_states
    }

    pub fn is_door_open(&self, exit: usize) -> Option<bool> {
        self.door_open.get(exit).copied()
    }

    pub fn player(&self) -> Option<SpriteId> {
        self.player
    }

    /// Replace every sprite with this room's contents. The player is not
    /// created here; see `create_player`.
    pub fn populate(&mut self, sprites: &mut SpriteManager, config: &GameConfig) {
        sprites.clear();
        self.player = None;
        let layout = &self.layout;
        let floor_z = layout.floor_z;
        let wall_top = floor_z + layout.wall_height;
        let (width, depth) = (layout.width, layout.depth);

        sprites.add(Box::new(Floor::new(
            width,
            depth,
            floor_z,
            layout.holes.iter().map(|[x, y]| (*x, *y)).collect(),
            layout.floor_color,
        )));

        let door_cells: Vec<(i32, i32)> = layout
            .exits
            .iter()
            .map(|exit| exit.door_cell(width, depth))
            .collect();
        let wall_span = ColumnSpan::new(floor_z - BLOCK_Z + 1, wall_top);
        for (x, y) in perimeter(width, depth) {
            if door_cells.contains(&(x, y)) {
                continue;
            }
            let mut wall = Block::new(x, y, wall_span, layout.wall_color);
            if x == width || y == depth {
                wall = wall.with_draw_top(floor_z);
            }
            sprites.add(Box::new(wall));
        }

        self.doors = layout
            .exits
            .iter()
            .zip(&self.door_open)
            .zip(&door_cells)
            .map(|((exit, open), (x, y))| {
                let door = Door::new(*x, *y, floor_z, exit.door.drop_depth, wall_top, *open)
                    .with_colors(
                        exit.door.floor_color.unwrap_or(layout.floor_color),
                        layout.wall_color,
                    );
                Some(sprites.add(Box::new(door)))
            })
            .collect();

        for block in &layout.blocks {
            let base = floor_z + block.lift + 1;
            sprites.add(Box::new(Block::new(
                block.x,
                block.y,
                ColumnSpan::new(base, base + block.height - 1),
                block.color,
            )));
        }
        for (index, (switch, on)) in layout.switches.iter().zip(&self.switch_states).enumerate() {
            sprites.add(Box::new(Switch::new(
                index as u8,
                GridPos::new(switch.x, switch.y, floor_z),
                *on,
            )));
        }
        for checkpoint in &layout.checkpoints {
            sprites.add(Box::new(Checkpoint::new(
                GridPos::new(checkpoint.x, checkpoint.y, floor_z),
                checkpoint.entry,
            )));
        }
        if let Some([x, y]) = layout.goal {
            sprites.add(Box::new(Goal::new(GridPos::new(x, y, floor_z))));
        }
        for critter in &layout.critters {
            sprites.add(Box::new(Critter::new(
                GridPos::new(critter.x, critter.y, floor_z),
                critter.heading,
                config.movement.critter_height_z,
            )));
        }

        let (added, _) = sprites.apply_pending();
        debug!(room = %layout.name, sprites = added, "room_populated");
    }

    /// Place the player just inside exit `entry`, facing into the room, and
    /// point the camera at it.
    pub fn create_player(
        &mut self,
        entry: usize,
        sprites: &mut SpriteManager,
        config: &GameConfig,
    ) -> Option<SpriteId> {
        let Some(exit) = self.layout.exits.get(entry) else {
            warn!(room = %self.layout.name, entry, "player_entry_missing");
            return None;
        };
        let (x, y) = exit.entry_cell(self.layout.width, self.layout.depth);
        let height = config.movement.player_height_z;
        let floor_z = self.layout.floor_z;
        let lowest = floor_z - exit.door.drop_depth;
        let z = {
            let view = sprites.view();
            (lowest..=floor_z + self.layout.wall_height)
                .find(|z| can_stand(&view, GridPos::new(x, y, *z), height))
                .unwrap_or(floor_z)
        };

        let pos = GridPos::new(x, y, z);
        let id = sprites.add(Box::new(Player::new(pos, exit.inward(), height)));
        sprites.apply_pending();
        self.player = Some(id);

        let level = exit
            .camera_level
            .unwrap_or_else(|| self.layout.camera_band(z));
        let camera = sprites.camera_mut();
        camera.focus_on(x, y);
        camera.set_level(level, self.layout.camera_offset(level));
        camera.set_offset_px(0, 0);
        Some(id)
    }

    fn player_state(&self, sprites: &SpriteManager) -> Option<(GridPos, Direction)> {
        let player = sprites.get_as::<Player>(self.player?)?;
        Some((player.pos(), player.facing()))
    }

    /// Exit whose door cell the player stands in while facing out through it.
    pub fn check_exits(&self, sprites: &SpriteManager) -> Option<usize> {
        let (pos, facing) = self.player_state(sprites)?;
        self.layout.exits.iter().position(|exit| {
            exit.destination.is_some()
                && exit.wall == facing
                && exit.door_cell(self.layout.width, self.layout.depth) == (pos.x, pos.y)
        })
    }

    /// A screen-sized scroll once the player walks off the visible screen.
    pub fn check_horizontal_scroll(&self, sprites: &SpriteManager) -> Option<StoryEvent> {
        let (pos, _) = self.player_state(sprites)?;
        if !self.layout.contains(pos.x, pos.y) {
            return None;
        }
        let (origin_x, origin_y) = sprites.camera().origin();
        let step = |value: i32, origin: i32| {
            if value < origin {
                -SCREEN_BLOCKS
            } else if value >= origin + SCREEN_BLOCKS {
                SCREEN_BLOCKS
            } else {
                0
            }
        };
        let dx = step(pos.x, origin_x);
        let dy = step(pos.y, origin_y);
        if dx != 0 {
            Some(StoryEvent::RoomScroll { dx, dy: 0, dz: 0 })
        } else if dy != 0 {
            Some(StoryEvent::RoomScroll { dx: 0, dy, dz: 0 })
        } else {
            None
        }
    }

    /// One camera level toward the band the player's z falls in.
    pub fn check_vertical_scroll(&self, sprites: &SpriteManager) -> Option<StoryEvent> {
        if self.layout.camera_levels.is_empty() {
            return None;
        }
        let (pos, _) = self.player_state(sprites)?;
        let current = sprites.camera().level();
        let band = self.layout.camera_band(pos.z);
        let next = match band.cmp(&current) {
            std::cmp::Ordering::Equal => return None,
            std::cmp::Ordering::Greater => current + 1,
            std::cmp::Ordering::Less => current - 1,
        };
        let dz = self.layout.camera_offset(next) - self.layout.camera_offset(current);
        Some(StoryEvent::RoomScroll { dx: 0, dy: 0, dz })
    }

    /// Room-local reaction to an event; returns whether it was consumed.
    pub fn handle_event(&mut self, event: &StoryEvent, sprites: &mut SpriteManager) -> bool {
        let StoryEvent::SwitchToggled { switch, on } = event else {
            return false;
        };
        let index = usize::from(*switch);
        let Some(spec) = self.layout.switches.get(index) else {
            warn!(room = %self.layout.name, switch, "switch_unknown");
            return true;
        };
        self.switch_states[index] = *on;
        for exit in &spec.opens {
            let Some(open) = self.door_open.get_mut(*exit) else {
                continue;
            };
            *open = !*open;
            let live = self.doors.get(*exit).copied().flatten();
            if let Some(door) = live.and_then(|id| sprites.get_as_mut::<Door>(id)) {
                door.set_open(*open);
            }
            debug!(room = %self.layout.name, exit, open = *open, "door_toggled");
        }
        true
    }

    pub fn save(&self, writer: &mut BitWriter) -> Result<(), BitError> {
        writer.write(FORMAT_VERSION, FORMAT_VERSION_BITS)?;
        writer.write(self.switch_states.len() as u64, SWITCH_COUNT_BITS)?;
        for on in &self.switch_states {
            writer.write_bool(*on);
        }
        for open in &self.door_open {
            writer.write_bool(*open);
        }
        Ok(())
    }

    /// Reads state written by `save`. Leaves the room untouched and returns
    /// false on any mismatch with this room's layout.
    pub fn restore(&mut self, reader: &mut BitReader<'_>) -> bool {
        match self.read_state(reader) {
            Ok(Some(state)) => {
                self.switch_states = state.switches;
                self.door_open = state.doors;
                true
            }
            Ok(None) => false,
            Err(error) => {
                debug!(room = %self.layout.name, error = %error, "room_restore_truncated");
                false
            }
        }
    }

    fn read_state(&self, reader: &mut BitReader<'_>) -> Result<Option<PuzzleState>, BitError> {
        if reader.read(FORMAT_VERSION_BITS)? != FORMAT_VERSION {
            return Ok(None);
        }
        let count = reader.read(SWITCH_COUNT_BITS)? as usize;
        if count != self.layout.switches.len() {
            return Ok(None);
        }
        let switches = (0..count)
            .map(|_| reader.read_bool())
            .collect::<Result<Vec<_>, _>>()?;
        let doors = (0..self.layout.exits.len())
            .map(|_| reader.read_bool())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(PuzzleState { switches, doors }))
    }

    pub fn save_state(&self) -> Result<BitString, BitError> {
        let mut writer = BitWriter::new();
        self.save(&mut writer)?;
        Ok(writer.into_bit_string())
    }

    /// Like `restore`, but the state must be consumed exactly.
    pub fn restore_state(&mut self, state: &BitString) -> bool {
        let mut reader = state.reader();
        let before = (self.switch_states.clone(), self.door_open.clone());
        if self.restore(&mut reader) && reader.remaining() == 0 {
            return true;
        }
        (self.switch_states, self.door_open) = before;
        false
    }
}

/// Wall-line cells around a `width` x `depth` interior, corners included.
fn perimeter(width: i32, depth: i32) -> impl Iterator<Item = (i32, i32)> {
    let rows = (-1..=width).flat_map(move |x| [(x, -1), (x, depth)]);
    let columns = (0..depth).flat_map(move |y| [(-1, y), (width, y)]);
    rows.chain(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{InputAction, InputSnapshot};
    use crate::room::CameraLevel;
    use crate::story::StoryEvents;
    use crate::testing::test_env;

    fn corridor() -> RoomLayout {
        RoomLayout::new("A1", 25, 4)
            .with_exit(Exit::new(Direction::NegX, 1).to("A0", 0))
            .with_exit(Exit::new(Direction::PosX, 2).to("B2", 3))
            .with_exit(Exit::new(Direction::PosY, 5).closed())
            .with_switch(3, 3, &[2])
    }

    fn entered(layout: RoomLayout, entry: usize) -> (Room, SpriteManager) {
        let config = GameConfig::default();
        let mut room = Room::new(RoomId(0), layout);
        let mut sprites = SpriteManager::new();
        room.populate(&mut sprites, &config);
        room.create_player(entry, &mut sprites, &config)
            .expect("player");
        (room, sprites)
    }

    #[test]
    fn perimeter_surrounds_the_interior_once() {
        let cells: Vec<_> = perimeter(3, 2).collect();

        assert_eq!(cells.len(), 2 * (3 + 2) + 4);
        assert!(cells.contains(&(-1, -1)));
        assert!(cells.contains(&(3, 2)));
        assert!(!cells.iter().any(|(x, y)| (0..3).contains(x) && (0..2).contains(y)));
    }

    #[test]
    fn player_enters_facing_inward_with_the_camera_on_its_screen() {
        let (room, sprites) = entered(corridor(), 1);
        let player = sprites
            .get_as::<Player>(room.player().expect("id"))
            .expect("player");

        assert_eq!(player.pos(), GridPos::new(24, 2, 0));
        assert_eq!(player.facing(), Direction::NegX);
        assert_eq!(sprites.camera().origin(), (20, 0));
        assert_eq!(room.check_exits(&sprites), None);
    }

    #[test]
    fn stepping_into_a_door_facing_out_reports_the_exit() {
        let (room, mut sprites) = entered(corridor(), 1);
        let mut env = test_env();
        let mut events = StoryEvents::default();

        env.begin_tick(InputSnapshot::empty().with_held(InputAction::Right, true));
        sprites.tick(&mut env, &mut events);

        assert_eq!(room.check_exits(&sprites), Some(1));
        assert_eq!(room.exits()[1].destination.as_ref().map(|t| t.entry), Some(3));
    }

    #[test]
    fn crossing_the_screen_edge_scrolls_once() {
        let (room, mut sprites) = entered(corridor(), 0);
        let mut env = test_env();
        env.config.timings.player_step_ticks = 1;
        let mut events = StoryEvents::default();

        let mut scrolls = Vec::new();
        for _ in 0..12 {
            env.begin_tick(InputSnapshot::empty().with_held(InputAction::Right, true));
            sprites.tick(&mut env, &mut events);
            if let Some(scroll) = room.check_horizontal_scroll(&sprites) {
                let StoryEvent::RoomScroll { dx, dy, dz } = scroll else {
                    panic!("not a scroll: {scroll:?}");
                };
                let camera = sprites.camera().shifted(dx, dy, dz);
                *sprites.camera_mut() = camera;
                scrolls.push(scroll);
            }
        }

        assert_eq!(
            scrolls,
            vec![StoryEvent::RoomScroll {
                dx: SCREEN_BLOCKS,
                dy: 0,
                dz: 0
            }]
        );
    }

    #[test]
    fn vertical_scroll_moves_one_level_at_a_time() {
        let layout = RoomLayout::new("tower", 6, 6)
            .with_exit(Exit::new(Direction::NegX, 0))
            .with_camera_levels(&[
                CameraLevel { z_min: i32::MIN, z_offset: 0 },
                CameraLevel { z_min: 8, z_offset: 10 },
                CameraLevel { z_min: 16, z_offset: 24 },
            ]);
        let (mut room, mut sprites) = entered(layout, 0);
        assert_eq!(sprites.camera().level(), 0);

        // lift the player high enough to be two bands up
        let player = room.player().expect("player");
        sprites.kill(player);
        sprites.apply_pending();
        let id = sprites.add(Box::new(Player::new(GridPos::new(0, 0, 20), Direction::PosX, 6)));
        sprites.apply_pending();
        room.player = Some(id);

        assert_eq!(
            room.check_vertical_scroll(&sprites),
            Some(StoryEvent::RoomScroll { dx: 0, dy: 0, dz: 10 })
        );
        sprites.camera_mut().set_level(1, 10);
        assert_eq!(
            room.check_vertical_scroll(&sprites),
            Some(StoryEvent::RoomScroll { dx: 0, dy: 0, dz: 14 })
        );
    }

    #[test]
    fn switch_event_toggles_the_live_door() {
        let (mut room, mut sprites) = entered(corridor(), 0);
        let door = room.doors[2].expect("door sprite");
        assert_eq!(sprites.get_as::<Door>(door).map(Door::is_open), Some(false));

        let event = StoryEvent::SwitchToggled { switch: 0, on: true };
        assert!(room.handle_event(&event, &mut sprites));

        assert_eq!(room.is_door_open(2), Some(true));
        assert_eq!(sprites.get_as::<Door>(door).map(Door::is_open), Some(true));
        assert_eq!(room.switch_states(), &[true]);
        assert!(!room.handle_event(&StoryEvent::MonsterKilled, &mut sprites));
    }

    #[test]
    fn puzzle_state_survives_save_and_restore() {
        let mut sprites = SpriteManager::new();
        let mut room = Room::new(RoomId(0), corridor());
        room.populate(&mut sprites, &GameConfig::default());
        room.handle_event(&StoryEvent::SwitchToggled { switch: 0, on: true }, &mut sprites);
        let state = room.save_state().expect("save");

        let mut fresh = Room::new(RoomId(0), corridor());
        assert!(fresh.restore_state(&state));
        assert_eq!(fresh.switch_states(), &[true]);
        assert_eq!(fresh.is_door_open(2), Some(true));
    }

    #[test]
    fn restore_fails_closed_on_a_layout_mismatch() {
        let state = Room::new(RoomId(0), corridor()).save_state().expect("save");
        let other = RoomLayout::new("A1", 25, 4).with_exit(Exit::new(Direction::NegX, 1));
        let mut room = Room::new(RoomId(0), other);

        assert!(!room.restore_state(&state));
        assert!(!room.restore_state(&BitString::default()));
        assert_eq!(room.is_door_open(0), Some(true));
    }
}
