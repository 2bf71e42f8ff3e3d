//! Pointer and keyboard input types plus double-click detection.

use crate::platform::Clock;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Double-click detection constants.
pub const DOUBLE_CLICK_TIME_MS: u64 = 500;
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn action(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Logical keys the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// Printable input, already composed by the platform.
    Character(String),
    Enter,
    Escape,
    Backspace,
    Delete,
    Space,
    Other(String),
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Character(c.to_string())
    }

    /// Case-insensitive comparison for single-letter shortcuts.
    pub fn is_letter(&self, letter: char) -> bool {
        match self {
            Key::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&letter))
            }
            _ => false,
        }
    }
}

/// A key press or release with the modifiers held at that time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Detects double clicks from raw primary-button presses.
#[derive(Debug, Default, Clone)]
pub struct ClickTracker {
    last_click: Option<(u64, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a press; returns true when it completes a double click.
    pub fn register(&mut self, clock: &dyn Clock, input: &PointerInput) -> bool {
        if input.button != MouseButton::Left {
            return false;
        }
        let now = clock.now_ms();
        if let Some((time, pos)) = self.last_click {
            let elapsed = now.saturating_sub(time);
            if elapsed < DOUBLE_CLICK_TIME_MS && pos.distance(input.position) < DOUBLE_CLICK_DISTANCE {
                // A third click starts a new sequence.
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((now, input.position));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualClock;

    #[test]
    fn test_action_modifier() {
        assert!(Modifiers { ctrl: true, ..Modifiers::NONE }.action());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.action());
        assert!(!Modifiers { shift: true, ..Modifiers::NONE }.action());
    }

    #[test]
    fn test_key_letter() {
        assert!(Key::char('Z').is_letter('z'));
        assert!(!Key::Character("zz".into()).is_letter('z'));
        assert!(!Key::Enter.is_letter('z'));
    }

    #[test]
    fn test_double_click_detection() {
        let clock = ManualClock::new(1_000);
        let mut tracker = ClickTracker::new();
        let input = PointerInput::new(Point::new(10.0, 10.0));

        assert!(!tracker.register(&clock, &input));
        clock.advance(200);
        assert!(tracker.register(&clock, &PointerInput::new(Point::new(12.0, 11.0))));
        clock.advance(100);
        assert!(!tracker.register(&clock, &input));
    }

    #[test]
    fn test_double_click_too_slow_or_far() {
        let clock = ManualClock::new(0);
        let mut tracker = ClickTracker::new();
        tracker.register(&clock, &PointerInput::new(Point::ZERO));
        clock.advance(600);
        assert!(!tracker.register(&clock, &PointerInput::new(Point::ZERO)));
        clock.advance(100);
        assert!(!tracker.register(&clock, &PointerInput::new(Point::new(20.0, 0.0))));
    }

    #[test]
    fn test_right_button_ignored() {
        let clock = ManualClock::new(0);
        let mut tracker = ClickTracker::new();
        let right = PointerInput::new(Point::ZERO).with_button(MouseButton::Right);
        assert!(!tracker.register(&clock, &right));
        assert!(!tracker.register(&clock, &right));
    }

    #[test]
    fn test_pointer_input_defaults_from_json() {
        let input: PointerInput = serde_json::from_str(r#"{"position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(input.button, MouseButton::Left);
        assert_eq!(input.modifiers, Modifiers::NONE);
    }
}
