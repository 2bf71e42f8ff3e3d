//! Scripted input replay.
//!
//! A script is a JSON array of steps, e.g.
//!
//! ```json
//! [
//!   { "type": "tool", "tool": "rect" },
//!   { "type": "drag", "from": [100, 100], "to": [300, 200] },
//!   { "type": "key_down", "key": "z", "modifiers": { "ctrl": true } }
//! ]
//! ```

use inkroom_core::{
    CanvasSession, Key, KeyInput, ManualClock, Modifiers, MouseButton, PointerInput, SerializableColor,
    TextInputHost, ToolKind,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Simulated time between two steps.
pub const STEP_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    PointerLeave,
    /// Press, move in `steps` increments and release.
    Drag {
        from: [f64; 2],
        to: [f64; 2],
        #[serde(default = "default_drag_steps")]
        steps: u32,
    },
    /// Two presses at the same spot inside the double-click window.
    DoubleClick { x: f64, y: f64 },
    Wheel { delta_y: f64 },
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// One key press per character.
    Type { text: String },
    Blur,
    Tool { tool: ToolKind },
    Color { color: SerializableColor },
    Thickness { value: f64 },
    FontSize { value: f64 },
    Undo,
    Redo,
    Clear,
    Wait { ms: u64 },
}

fn default_drag_steps() -> u32 {
    4
}

/// `Enter`, `Escape`, `Backspace`, `Delete` and `Space` by name, any single
/// character as itself.
pub fn parse_key(name: &str) -> Key {
    match name {
        "Enter" => Key::Enter,
        "Escape" => Key::Escape,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Space" | " " => Key::Space,
        _ if name.chars().count() == 1 => Key::Character(name.to_string()),
        _ => Key::Other(name.to_string()),
    }
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    serde_json::from_str(json)
}

fn pointer(x: f64, y: f64, button: MouseButton) -> PointerInput {
    PointerInput::new(Point::new(x, y)).with_button(button)
}

/// Feed `steps` into `session`, advancing `clock` between steps.
pub fn replay<H: TextInputHost>(session: &mut CanvasSession<H>, clock: &ManualClock, steps: &[ScriptStep]) {
    for (index, step) in steps.iter().enumerate() {
        log::debug!("step {index}: {step:?}");
        apply_step(session, clock, step);
        clock.advance(STEP_INTERVAL_MS);
    }
}

fn apply_step<H: TextInputHost>(session: &mut CanvasSession<H>, clock: &ManualClock, step: &ScriptStep) {
    match step {
        ScriptStep::PointerDown { x, y, button, modifiers } => {
            session.pointer_down(&pointer(*x, *y, *button).with_modifiers(*modifiers));
        }
        ScriptStep::PointerMove { x, y, button } => {
            session.pointer_move(&pointer(*x, *y, *button));
        }
        ScriptStep::PointerUp { x, y, button } => {
            session.pointer_up(&pointer(*x, *y, *button));
        }
        ScriptStep::PointerLeave => session.pointer_leave(),
        ScriptStep::Drag { from, to, steps } => {
            let start = Point::new(from[0], from[1]);
            let end = Point::new(to[0], to[1]);
            session.pointer_down(&PointerInput::new(start));
            let steps = (*steps).max(1);
            for i in 1..=steps {
                clock.advance(STEP_INTERVAL_MS);
                let p = start.lerp(end, f64::from(i) / f64::from(steps));
                session.pointer_move(&PointerInput::new(p));
            }
            session.pointer_up(&PointerInput::new(end));
        }
        ScriptStep::DoubleClick { x, y } => {
            let input = PointerInput::new(Point::new(*x, *y));
            session.pointer_down(&input);
            session.pointer_up(&input);
            clock.advance(STEP_INTERVAL_MS);
            session.pointer_down(&input);
            session.pointer_up(&input);
        }
        ScriptStep::Wheel { delta_y } => {
            session.wheel(*delta_y);
        }
        ScriptStep::KeyDown { key, modifiers } => {
            session.key_down(&KeyInput::new(parse_key(key)).with_modifiers(*modifiers));
        }
        ScriptStep::KeyUp { key, modifiers } => {
            session.key_up(&KeyInput::new(parse_key(key)).with_modifiers(*modifiers));
        }
        ScriptStep::Type { text } => {
            for c in text.chars() {
                let key = if c == ' ' { Key::Space } else { Key::char(c) };
                session.key_down(&KeyInput::new(key));
            }
        }
        ScriptStep::Blur => session.blur(),
        ScriptStep::Tool { tool } => session.set_tool(*tool),
        ScriptStep::Color { color } => session.set_color(*color),
        ScriptStep::Thickness { value } => session.set_thickness(*value),
        ScriptStep::FontSize { value } => session.set_font_size(*value),
        ScriptStep::Undo => {
            session.undo();
        }
        ScriptStep::Redo => {
            session.redo();
        }
        ScriptStep::Clear => session.clear_canvas(),
        ScriptStep::Wait { ms } => clock.advance(*ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LoggingTextHost;
    use inkroom_core::elements::ElementKind;
    use inkroom_core::{EngineConfig, MemoryStorage, RoomId};
    use std::sync::Arc;

    fn session(clock: Arc<ManualClock>) -> CanvasSession<LoggingTextHost> {
        pollster::block_on(CanvasSession::open(
            &EngineConfig::default(),
            &RoomId::new("script"),
            Arc::new(MemoryStorage::new()),
            clock,
            LoggingTextHost::default(),
        ))
    }

    #[test]
    fn test_parse_steps() {
        let steps = parse_script(
            r##"[
                { "type": "tool", "tool": "arrow" },
                { "type": "pointer_down", "x": 1, "y": 2, "button": "middle" },
                { "type": "key_down", "key": "z", "modifiers": { "ctrl": true, "shift": true } },
                { "type": "color", "color": "#00ff00" },
                { "type": "drag", "from": [0, 0], "to": [10, 10] }
            ]"##,
        )
        .unwrap();
        assert_eq!(steps[0], ScriptStep::Tool { tool: ToolKind::Arrow });
        assert!(matches!(steps[1], ScriptStep::PointerDown { button: MouseButton::Middle, .. }));
        let ScriptStep::KeyDown { modifiers, .. } = &steps[2] else {
            panic!("expected key_down");
        };
        assert!(modifiers.ctrl && modifiers.shift && !modifiers.alt);
        assert_eq!(steps[4], ScriptStep::Drag { from: [0.0, 0.0], to: [10.0, 10.0], steps: 4 });
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(parse_script(r#"[{ "type": "teleport" }]"#).is_err());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("Enter"), Key::Enter);
        assert_eq!(parse_key("a"), Key::Character("a".into()));
        assert_eq!(parse_key(" "), Key::Space);
        assert_eq!(parse_key("F5"), Key::Other("F5".into()));
    }

    #[test]
    fn test_replay_draws_rect() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session(clock.clone());
        let steps = parse_script(
            r#"[
                { "type": "tool", "tool": "rect" },
                { "type": "drag", "from": [100, 100], "to": [300, 200] }
            ]"#,
        )
        .unwrap();
        replay(&mut session, &clock, &steps);

        let elements = session.store().elements();
        assert_eq!(elements.len(), 1);
        let ElementKind::Rect(rect) = &elements[0].kind else {
            panic!("expected rect");
        };
        assert_eq!((rect.x, rect.y, rect.w, rect.h), (100.0, 100.0, 200.0, 100.0));
        assert!(session.can_undo());
    }

    #[test]
    fn test_replay_text_edit() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session(clock.clone());
        let steps = parse_script(
            r#"[
                { "type": "tool", "tool": "text" },
                { "type": "pointer_down", "x": 40, "y": 40 },
                { "type": "pointer_up", "x": 40, "y": 40 },
                { "type": "type", "text": "hello there" },
                { "type": "key_down", "key": "Enter" }
            ]"#,
        )
        .unwrap();
        replay(&mut session, &clock, &steps);

        let text = session.store().elements()[0].as_text().unwrap();
        assert_eq!(text.text, "hello there");
        assert!(!session.host().is_visible());
    }
}
