use crate::app::{draw_plate, draw_prism, Canvas, EgaColor, PrismColors};
use crate::sim::{Camera, Sprite, TickContext};

use super::impl_as_any;

/// Overworld map marker for one quest: a tower whose colour shows whether the
/// quest is open, with one pip per score point.
pub struct QuestMarker {
    quest: usize,
    x: i32,
    y: i32,
    unlocked: bool,
    score: u8,
    selected: bool,
}

impl QuestMarker {
    pub fn new(quest: usize, x: i32, y: i32, unlocked: bool, score: u8) -> Self {
        Self {
            quest,
            x,
            y,
            unlocked,
            score,
            selected: false,
        }
    }

    pub fn quest(&self) -> usize {
        self.quest
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

impl Sprite for QuestMarker {
    fn name(&self) -> &'static str {
        "quest_marker"
    }

    fn advance(&mut self, _ctx: &mut TickContext<'_>) {}

    fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        let color = match (self.unlocked, self.selected) {
            (_, true) => EgaColor::White,
            (true, false) => EgaColor::LightBlue,
            (false, false) => EgaColor::DarkGray,
        };
        draw_prism(
            canvas,
            camera,
            self.x,
            self.y,
            0,
            8,
            3,
            PrismColors::shaded(color),
        );
        for pip in 0..i32::from(self.score) {
            draw_plate(canvas, camera, self.x + 1, self.y + pip - 2, 0, EgaColor::Yellow);
        }
    }

    impl_as_any!();
}
