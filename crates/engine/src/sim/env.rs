use crate::app::{Audio, InputMode, InputSnapshot, SoundId};
use crate::content::{GameConfig, ImageBank, QuestCatalog};
use crate::save::SaveState;

use super::GameRng;

/// Everything a tick may touch besides the sprites themselves.
///
/// Passed explicitly into every sprite phase and story advance; tests build
/// one with a fixed seed, scripted input and a recording audio sink.
pub struct Env {
    pub config: GameConfig,
    pub quests: QuestCatalog,
    pub images: ImageBank,
    pub rng: GameRng,
    pub input: InputSnapshot,
    pub audio: Box<dyn Audio>,
    pub save: SaveState,
    input_mode: InputMode,
    tick: u64,
}

impl Env {
    pub fn new(
        config: GameConfig,
        quests: QuestCatalog,
        save: SaveState,
        audio: Box<dyn Audio>,
        rng: GameRng,
    ) -> Self {
        Self {
            config,
            quests,
            images: ImageBank::default(),
            rng,
            input: InputSnapshot::empty(),
            audio,
            save,
            input_mode: InputMode::default(),
            tick: 0,
        }
    }

    pub fn with_images(mut self, images: ImageBank) -> Self {
        self.images = images;
        self
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Changes which actions are interpreted, effective immediately.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input = self.input.with_mode(mode);
    }

    pub fn begin_tick(&mut self, input: InputSnapshot) {
        self.tick = self.tick.saturating_add(1);
        self.input = input.with_mode(self.input_mode);
    }

    pub fn play(&mut self, sound: SoundId) {
        self.audio.play(sound, 0);
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{InputAction, InputMode, InputSnapshot};
    use crate::testing::test_env;

    #[test]
    fn begin_tick_applies_the_current_mode() {
        let mut env = test_env();
        env.set_input_mode(InputMode::Query);

        env.begin_tick(
            InputSnapshot::empty()
                .with_held(InputAction::Left, true)
                .with_pressed(InputAction::Fire, true),
        );

        assert_eq!(env.tick_count(), 1);
        assert!(!env.input.is_down(InputAction::Left));
        assert!(env.input.was_pressed(InputAction::Fire));
    }
}
