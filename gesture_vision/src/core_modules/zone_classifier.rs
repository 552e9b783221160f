// THEORY:
// The `ZoneClassifier` is the decision layer. It divides the frame into bands and
// reports which band the tracked object's centroid falls into.
//
// The vertical bands are checked first and always win: an object that is both high
// and to the left is a JUMP, never a LEFT. A jump or duck gesture almost always
// drifts sideways a little, while a sideways gesture rarely drifts up or down, so
// giving the vertical bands priority resolves the ambiguous corners the way a
// player intends. There are no diagonal actions.
//
// Thresholds are recomputed from the frame dimensions on every call and all
// comparisons are strict, so a centroid sitting exactly on a boundary stays in
// the middle band.

use crate::config::ZoneConfig;
use crate::core_modules::dispatcher::Command;
use crate::core_modules::region::Point;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Jump,
    Duck,
    Left,
    Right,
    /// The object is in the middle band.
    Neutral,
    /// No object was found this frame.
    None,
}

impl Action {
    /// The command this action dispatches, if any.
    pub fn command(self) -> Option<Command> {
        match self {
            Action::Jump => Some(Command::Jump),
            Action::Duck => Some(Command::Duck),
            Action::Left => Some(Command::Left),
            Action::Right => Some(Command::Right),
            Action::Neutral | Action::None => None,
        }
    }

    pub fn is_dispatchable(self) -> bool {
        self.command().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Jump => "JUMP",
            Action::Duck => "DUCK",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Neutral => "NEUTRAL",
            Action::None => "NONE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries in pixels for one frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneThresholds {
    pub jump_y: u32,
    pub duck_y: u32,
    pub left_x: u32,
    pub right_x: u32,
}

impl ZoneThresholds {
    pub fn from_dimensions(width: u32, height: u32, zones: &ZoneConfig) -> Self {
        Self {
            jump_y: scale(height, zones.jump_fraction),
            duck_y: scale(height, zones.duck_fraction),
            left_x: scale(width, zones.left_fraction),
            right_x: scale(width, zones.right_fraction),
        }
    }

    pub fn classify(&self, point: Point) -> Action {
        if point.y < self.jump_y {
            Action::Jump
        } else if point.y > self.duck_y {
            Action::Duck
        } else if point.x < self.left_x {
            Action::Left
        } else if point.x > self.right_x {
            Action::Right
        } else {
            Action::Neutral
        }
    }
}

// Truncates toward zero.
fn scale(length: u32, fraction: f64) -> u32 {
    (length as f64 * fraction) as u32
}

pub struct ZoneClassifier {
    zones: ZoneConfig,
}

impl ZoneClassifier {
    pub fn new(zones: &ZoneConfig) -> Self {
        Self {
            zones: zones.clone(),
        }
    }

    pub fn thresholds(&self, width: u32, height: u32) -> ZoneThresholds {
        ZoneThresholds::from_dimensions(width, height, &self.zones)
    }

    pub fn classify(&self, centroid: Option<Point>, width: u32, height: u32) -> Action {
        match centroid {
            None => Action::None,
            Some(point) => self.thresholds(width, height).classify(point),
        }
    }
}
