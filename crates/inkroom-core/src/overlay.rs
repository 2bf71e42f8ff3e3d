//! Text-edit overlay: drives a platform text input positioned over a text element.

use crate::elements::{ElementId, SerializableColor};
use crate::input::{Key, KeyInput};
use crate::store::SceneStore;
use kurbo::Point;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("text input host failed: {0}")]
    Host(String),
    #[error("element {0} is not a text element")]
    NotText(ElementId),
}

/// Screen-space placement of the text input.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: SerializableColor,
}

/// The platform text input the overlay controls.
pub trait TextInputHost {
    fn open(&mut self, layout: &OverlayLayout, text: &str) -> Result<(), OverlayError>;
    fn update(&mut self, layout: &OverlayLayout, text: &str) -> Result<(), OverlayError>;
    fn close(&mut self) -> Result<(), OverlayError>;
}

/// Result of routing a key to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOutcome {
    /// No edit in progress, the key belongs to the canvas.
    NotHandled,
    Handled,
    Committed,
    Cancelled,
}

#[derive(Debug, Clone)]
struct EditSession {
    id: ElementId,
    buffer: String,
}

/// At most one text edit at a time.
#[derive(Debug, Clone, Default)]
pub struct TextEditOverlay {
    session: Option<EditSession>,
}

impl TextEditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn editing(&self) -> Option<ElementId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn text(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.buffer.as_str())
    }

    /// Layout for editing `id` with `text`, from the current camera.
    pub fn layout_for(store: &SceneStore, id: ElementId, text: &str) -> Option<OverlayLayout> {
        let element = store.element(id)?;
        let tb = element.as_text()?;
        let camera = store.camera();
        Some(OverlayLayout {
            position: camera.world_to_screen(Point::new(tb.x, tb.y)),
            width: tb.w * camera.z,
            height: tb.fitted_height(text) * camera.z,
            font_size: tb.font_size * camera.z,
            bold: tb.bold,
            italic: tb.italic,
            color: element.style.stroke,
        })
    }

    /// Current layout, `None` when idle.
    pub fn layout(&self, store: &SceneStore) -> Option<OverlayLayout> {
        let session = self.session.as_ref()?;
        Self::layout_for(store, session.id, &session.buffer)
    }

    /// Start editing `id`, pre-filled with its text. Commits any edit in progress first.
    pub fn open(
        &mut self,
        store: &mut SceneStore,
        host: &mut dyn TextInputHost,
        id: ElementId,
    ) -> Result<(), OverlayError> {
        if self.editing() == Some(id) {
            return Ok(());
        }
        if self.is_active() {
            self.commit(store, host);
        }

        let text = store
            .element(id)
            .and_then(|el| el.as_text())
            .map(|tb| tb.text.clone())
            .ok_or(OverlayError::NotText(id))?;
        let layout = Self::layout_for(store, id, &text).ok_or(OverlayError::NotText(id))?;

        host.open(&layout, &text)?;
        log::debug!("editing text {id}");
        self.session = Some(EditSession { id, buffer: text });
        Ok(())
    }

    pub fn handle_key(&mut self, store: &mut SceneStore, host: &mut dyn TextInputHost, input: &KeyInput) -> OverlayOutcome {
        let Some(session) = self.session.as_mut() else {
            return OverlayOutcome::NotHandled;
        };

        match &input.key {
            Key::Enter if input.modifiers.shift => session.buffer.push('\n'),
            Key::Enter => {
                self.commit(store, host);
                return OverlayOutcome::Committed;
            }
            Key::Escape => {
                self.cancel(host);
                return OverlayOutcome::Cancelled;
            }
            Key::Backspace => {
                session.buffer.pop();
            }
            Key::Space => session.buffer.push(' '),
            Key::Character(s) if !input.modifiers.action() => session.buffer.push_str(s),
            _ => return OverlayOutcome::Handled,
        }

        self.refresh(store, host);
        OverlayOutcome::Handled
    }

    /// Replace the whole buffer, e.g. from a platform input event.
    pub fn set_text(&mut self, store: &SceneStore, host: &mut dyn TextInputHost, text: &str) {
        if let Some(session) = self.session.as_mut() {
            session.buffer = text.to_string();
            self.refresh(store, host);
        }
    }

    /// Re-position the host after text or camera changes.
    pub fn refresh(&self, store: &SceneStore, host: &mut dyn TextInputHost) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let Some(layout) = self.layout(store) {
            if let Err(err) = host.update(&layout, &session.buffer) {
                log::warn!("text overlay update failed: {err}");
            }
        }
    }

    /// Losing focus commits.
    pub fn blur(&mut self, store: &mut SceneStore, host: &mut dyn TextInputHost) -> bool {
        self.commit(store, host)
    }

    /// Write the buffer into the element, close the host and record history.
    /// Returns false when nothing was being edited.
    pub fn commit(&mut self, store: &mut SceneStore, host: &mut dyn TextInputHost) -> bool {
        let Some(EditSession { id, buffer }) = self.session.take() else {
            return false;
        };
        let updated = store.update_element(id, |el| {
            if let Some(tb) = el.as_text_mut() {
                tb.set_text(buffer);
            }
        });
        Self::close_host(host);
        if updated {
            store.push_history();
        } else {
            log::debug!("edited text {id} vanished before commit");
        }
        true
    }

    /// Close without touching the element.
    pub fn cancel(&mut self, host: &mut dyn TextInputHost) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        Self::close_host(host);
        true
    }

    fn close_host(host: &mut dyn TextInputHost) {
        if let Err(err) = host.close() {
            log::warn!("text overlay close failed: {err}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::elements::{BoxGeometry, Element, ElementKind, ElementStyle, TextBox};
    use crate::input::Modifiers;

    /// Host that records calls and can be told to fail on close.
    #[derive(Debug, Default)]
    pub(crate) struct FakeHost {
        pub opened: Vec<(OverlayLayout, String)>,
        pub updates: Vec<String>,
        pub closes: usize,
        pub fail_close: bool,
    }

    impl TextInputHost for FakeHost {
        fn open(&mut self, layout: &OverlayLayout, text: &str) -> Result<(), OverlayError> {
            self.opened.push((layout.clone(), text.to_string()));
            Ok(())
        }

        fn update(&mut self, _layout: &OverlayLayout, text: &str) -> Result<(), OverlayError> {
            self.updates.push(text.to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<(), OverlayError> {
            self.closes += 1;
            if self.fail_close {
                Err(OverlayError::Host("gone".into()))
            } else {
                Ok(())
            }
        }
    }

    fn text_element(store: &mut SceneStore, text: &str) -> ElementId {
        let mut tb = TextBox::new(Point::new(10.0, 20.0), 200.0, 20.0);
        tb.text = text.to_string();
        let el = Element::new(ElementKind::Text(tb), ElementStyle::default());
        let id = el.id();
        store.add_element(el).unwrap();
        id
    }

    fn type_str(overlay: &mut TextEditOverlay, store: &mut SceneStore, host: &mut FakeHost, s: &str) {
        for c in s.chars() {
            overlay.handle_key(store, host, &KeyInput::new(Key::char(c)));
        }
    }

    #[test]
    fn test_open_prefills_and_positions() {
        let mut store = SceneStore::new();
        store.set_camera(Camera::new(5.0, 5.0, 2.0));
        let id = text_element(&mut store, "abc");
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();

        overlay.open(&mut store, &mut host, id).unwrap();
        let (layout, text) = &host.opened[0];
        assert_eq!(text, "abc");
        assert_eq!(layout.position, Point::new(25.0, 45.0));
        assert_eq!(layout.width, 400.0);
        assert_eq!(layout.font_size, 40.0);
        assert!((layout.height - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_type_and_enter_commits() {
        let mut store = SceneStore::new();
        let id = text_element(&mut store, "");
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();

        overlay.open(&mut store, &mut host, id).unwrap();
        type_str(&mut overlay, &mut store, &mut host, "hello");
        let outcome = overlay.handle_key(&mut store, &mut host, &KeyInput::new(Key::Enter));

        assert_eq!(outcome, OverlayOutcome::Committed);
        assert!(!overlay.is_active());
        assert_eq!(host.closes, 1);
        assert_eq!(store.element(id).and_then(|el| el.as_text()).unwrap().text, "hello");
        assert!(store.can_undo());
    }

    #[test]
    fn test_shift_enter_inserts_newline_and_grows() {
        let mut store = SceneStore::new();
        let id = text_element(&mut store, "a");
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();
        overlay.open(&mut store, &mut host, id).unwrap();

        let shift = Modifiers { shift: true, ..Modifiers::NONE };
        overlay.handle_key(&mut store, &mut host, &KeyInput::new(Key::Enter).with_modifiers(shift));
        type_str(&mut overlay, &mut store, &mut host, "b");
        assert_eq!(overlay.text(), Some("a\nb"));
        assert!((overlay.layout(&store).unwrap().height - 56.0).abs() < 1e-9);

        overlay.blur(&mut store, &mut host);
        let tb = store.element(id).and_then(|el| el.as_text()).unwrap().clone();
        assert_eq!(tb.text, "a\nb");
        assert!((tb.h - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_backspace_and_escape() {
        let mut store = SceneStore::new();
        let id = text_element(&mut store, "keep");
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();
        overlay.open(&mut store, &mut host, id).unwrap();

        overlay.handle_key(&mut store, &mut host, &KeyInput::new(Key::Backspace));
        assert_eq!(overlay.text(), Some("kee"));
        let outcome = overlay.handle_key(&mut store, &mut host, &KeyInput::new(Key::Escape));
        assert_eq!(outcome, OverlayOutcome::Cancelled);
        assert_eq!(store.element(id).and_then(|el| el.as_text()).unwrap().text, "keep");
        assert!(!store.can_undo());
    }

    #[test]
    fn test_opening_another_commits_current() {
        let mut store = SceneStore::new();
        let first = text_element(&mut store, "");
        let second = text_element(&mut store, "two");
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();

        overlay.open(&mut store, &mut host, first).unwrap();
        type_str(&mut overlay, &mut store, &mut host, "one");
        overlay.open(&mut store, &mut host, second).unwrap();

        assert_eq!(overlay.editing(), Some(second));
        assert_eq!(store.element(first).and_then(|el| el.as_text()).unwrap().text, "one");
        assert_eq!(host.opened.len(), 2);
    }

    #[test]
    fn test_close_failure_is_swallowed() {
        let mut store = SceneStore::new();
        let id = text_element(&mut store, "");
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost {
            fail_close: true,
            ..FakeHost::default()
        };
        overlay.open(&mut store, &mut host, id).unwrap();
        type_str(&mut overlay, &mut store, &mut host, "x");
        assert!(overlay.commit(&mut store, &mut host));
        assert_eq!(store.element(id).and_then(|el| el.as_text()).unwrap().text, "x");
    }

    #[test]
    fn test_open_rejects_non_text() {
        let mut store = SceneStore::new();
        let el = Element::new(ElementKind::Rect(BoxGeometry::default()), ElementStyle::default());
        let id = el.id();
        store.add_element(el).unwrap();
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();
        assert_eq!(overlay.open(&mut store, &mut host, id), Err(OverlayError::NotText(id)));
        assert!(host.opened.is_empty());
    }

    #[test]
    fn test_idle_overlay_passes_keys_through() {
        let mut store = SceneStore::new();
        let mut overlay = TextEditOverlay::new();
        let mut host = FakeHost::default();
        assert_eq!(
            overlay.handle_key(&mut store, &mut host, &KeyInput::new(Key::Delete)),
            OverlayOutcome::NotHandled
        );
    }
}
