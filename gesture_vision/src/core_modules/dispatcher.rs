// THEORY:
// The `ActionDispatcher` sits between the classifier and the outside world. A
// player holds a gesture for many frames, and every one of those frames classifies
// to the same action; without a gate the game would receive a flood of key presses.
//
// The dispatcher enforces a cooldown: a command is forwarded only when strictly
// more than `cooldown` has passed since the previous forwarded command. Anything
// suppressed is dropped, not queued; the next frame's classification supersedes it.
//
// Time is passed in by the caller rather than read from a clock, which keeps the
// gate deterministic under test.

use crate::config::DispatchConfig;
use crate::core_modules::zone_classifier::Action;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// The dispatchable subset of `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Jump,
    Duck,
    Left,
    Right,
}

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::Jump => "Jump",
            Command::Duck => "Duck",
            Command::Left => "Left",
            Command::Right => "Right",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The external side effect a command triggers, e.g. a key press.
/// Fire-and-forget: implementations report their own failures.
pub trait ActionSink {
    fn execute(&mut self, command: Command);
}

impl<F: FnMut(Command)> ActionSink for F {
    fn execute(&mut self, command: Command) {
        self(command)
    }
}

pub struct ActionDispatcher {
    cooldown: Duration,
    /// When the last command was forwarded; `None` until the first dispatch.
    last_action_time: Option<Instant>,
}

impl ActionDispatcher {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_action_time: None,
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(config.cooldown())
    }

    #[cfg(test)]
    fn last_action_time(&self) -> Option<Instant> {
        self.last_action_time
    }

    /// Forwards `action` to `sink` if it is directional and the cooldown has elapsed.
    /// Returns the forwarded command.
    pub fn dispatch<S: ActionSink + ?Sized>(
        &mut self,
        action: Action,
        now: Instant,
        sink: &mut S,
    ) -> Option<Command> {
        let command = action.command()?;

        if let Some(last) = self.last_action_time {
            if now.saturating_duration_since(last) <= self.cooldown {
                debug!(%action, "Action suppressed by cooldown");
                return None;
            }
        }

        sink.execute(command);
        self.last_action_time = Some(now);
        Some(command)
    }
}
