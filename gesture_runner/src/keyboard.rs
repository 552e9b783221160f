use anyhow::{Context, Result};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use gesture_vision::{ActionSink, Command};
use tracing::warn;

/// Presses the arrow key matching each command.
pub struct ArrowKeys {
    enigo: Enigo,
}

impl ArrowKeys {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("failed to connect to the input system")?;
        Ok(Self { enigo })
    }
}

fn arrow_for(command: Command) -> Key {
    match command {
        Command::Jump => Key::UpArrow,
        Command::Duck => Key::DownArrow,
        Command::Left => Key::LeftArrow,
        Command::Right => Key::RightArrow,
    }
}

impl ActionSink for ArrowKeys {
    fn execute(&mut self, command: Command) {
        if let Err(e) = self.enigo.key(arrow_for(command), Direction::Click) {
            warn!(%command, "Key press failed: {:?}", e);
        }
    }
}
