use crate::geometry::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Escape,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    fn any(&self) -> bool {
        self.down.iter().any(|down| *down)
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::Up,
        InputAction::Down,
        InputAction::Left,
        InputAction::Right,
        InputAction::Fire,
        InputAction::Escape,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::Up => 0,
            InputAction::Down => 1,
            InputAction::Left => 2,
            InputAction::Right => 3,
            InputAction::Fire => 4,
            InputAction::Escape => 5,
        }
    }
}

/// Which actions the current screen interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Game,
    /// Overworld selection: left/right, fire, escape.
    Map,
    /// Yes/no prompts and briefing pages: fire and escape only.
    Query,
}

impl InputMode {
    fn interprets(self, action: InputAction) -> bool {
        match self {
            InputMode::Game => true,
            InputMode::Map => !matches!(action, InputAction::Up | InputAction::Down),
            InputMode::Query => matches!(action, InputAction::Fire | InputAction::Escape),
        }
    }
}

/// Polled input for one tick: held state plus presses that started since the
/// previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: ActionStates,
    pressed: ActionStates,
    mode: InputMode,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_states(held: ActionStates, pressed: ActionStates) -> Self {
        Self {
            held,
            pressed,
            mode: InputMode::default(),
        }
    }

    pub fn with_held(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    /// Marks a fresh press; a pressed action is also held.
    pub fn with_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.pressed.set(action, pressed);
        if pressed {
            self.held.set(action, true);
        }
        self
    }

    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.mode.interprets(action) && self.held.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.mode.interprets(action) && self.pressed.is_down(action)
    }

    /// Any interpreted action pressed this tick.
    pub fn any_pressed(&self) -> bool {
        InputAction::ALL
            .into_iter()
            .any(|action| self.was_pressed(action))
    }

    pub fn any_held(&self) -> bool {
        self.held.any()
    }

    /// Held movement direction on the isometric grid, first match wins.
    pub fn direction(&self) -> Option<Direction> {
        [
            (InputAction::Up, Direction::NegY),
            (InputAction::Down, Direction::PosY),
            (InputAction::Left, Direction::NegX),
            (InputAction::Right, Direction::PosX),
        ]
        .into_iter()
        .find(|(action, _)| self.is_down(*action))
        .map(|(_, direction)| direction)
    }
}
