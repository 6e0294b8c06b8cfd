use std::time::Duration;

use artgen::{ConfigAction, RenderConfiguration};
use winit::event::ElementState;
use winit::keyboard::{Key, NamedKey};

/// Commands bound to single key releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputCommand {
    Regenerate,
    ToggleFullscreen,
    ToggleDimensions,
    ToggleCoordinates,
    ToggleNormalizer,
    ToggleColorModel,
    Quit,
}

impl InputCommand {
    /// Configuration change requested by this command, relative to `config`.
    pub(crate) fn action(self, config: &RenderConfiguration) -> Option<ConfigAction> {
        match self {
            InputCommand::ToggleDimensions => Some(config.toggled_dimensions()),
            InputCommand::ToggleCoordinates => Some(config.toggled_coordinates()),
            InputCommand::ToggleNormalizer => Some(config.toggled_normalizer()),
            InputCommand::ToggleColorModel => Some(config.toggled_color_model()),
            InputCommand::Regenerate | InputCommand::ToggleFullscreen | InputCommand::Quit => None,
        }
    }
}

/// Maps a released key to its command. Letters match either case.
pub(crate) fn command_for_key(key: &Key) -> Option<InputCommand> {
    match key {
        Key::Named(NamedKey::Escape) => Some(InputCommand::Quit),
        Key::Character(value) => {
            let mut chars = value.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            match ch.to_ascii_lowercase() {
                'r' => Some(InputCommand::Regenerate),
                'f' => Some(InputCommand::ToggleFullscreen),
                'd' => Some(InputCommand::ToggleDimensions),
                'p' => Some(InputCommand::ToggleCoordinates),
                'n' => Some(InputCommand::ToggleNormalizer),
                'c' => Some(InputCommand::ToggleColorModel),
                'q' => Some(InputCommand::Quit),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Moves the fourth coordinate while the arrow keys are held.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WDrift {
    w: f32,
    rate: f32,
    up: bool,
    down: bool,
}

impl WDrift {
    pub(crate) fn new(rate: f32) -> Self {
        Self {
            w: 0.0,
            rate,
            up: false,
            down: false,
        }
    }

    pub(crate) fn value(&self) -> f32 {
        self.w
    }

    /// Tracks arrow key state; returns `true` if the key was an arrow.
    pub(crate) fn handle_key(&mut self, key: &Key, state: ElementState) -> bool {
        let held = state == ElementState::Pressed;
        match key {
            Key::Named(NamedKey::ArrowUp) => self.up = held,
            Key::Named(NamedKey::ArrowDown) => self.down = held,
            _ => return false,
        }
        true
    }

    /// Advances `w` by `rate` per second in the held direction.
    pub(crate) fn advance(&mut self, dt: Duration) -> f32 {
        let direction = match (self.up, self.down) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        self.w += direction * self.rate * dt.as_secs_f32();
        self.w
    }
}
