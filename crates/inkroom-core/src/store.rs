//! The scene store: single source of truth for elements, selection, tool
//! settings, camera and history.

use crate::camera::Camera;
use crate::elements::{Element, ElementId, SerializableColor};
use crate::events::{ChangeOrigin, EventBus, ListenerId, StoreEvent};
use crate::history::History;
use crate::tools::{ToolKind, ToolSettings};
use kurbo::Point;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("element {0} already exists")]
    DuplicateId(ElementId),
}

/// Observable scene state shared by the interaction engine, the renderer and
/// the sync engine.
#[derive(Debug, Default)]
pub struct SceneStore {
    elements: Vec<Element>,
    selection: Option<ElementId>,
    tool: ToolKind,
    settings: ToolSettings,
    pointer: Option<Point>,
    camera: Camera,
    history: History,
    collab_connected: bool,
    revision: u64,
    camera_revision: u64,
    events: EventBus<StoreEvent>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ToolSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + Send + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    fn elements_changed(&mut self, origin: ChangeOrigin) {
        self.revision += 1;
        self.events.emit(&StoreEvent::ElementsChanged { origin });
    }

    fn drop_dangling_selection(&mut self) {
        if let Some(id) = self.selection {
            if self.element(id).is_none() {
                self.selection = None;
                self.events.emit(&StoreEvent::SelectionChanged);
            }
        }
    }

    // --- elements ---

    /// Append an element on top of the others.
    pub fn add_element(&mut self, element: Element) -> Result<(), StoreError> {
        if self.element(element.id()).is_some() {
            return Err(StoreError::DuplicateId(element.id()));
        }
        log::debug!("add {} {}", element.kind.type_name(), element.id());
        self.elements.push(element);
        self.elements_changed(ChangeOrigin::Local);
        Ok(())
    }

    /// Apply `patch` to the element with `id`. The id cannot be changed by the patch.
    /// Returns false when no such element exists.
    pub fn update_element(&mut self, id: ElementId, patch: impl FnOnce(&mut Element)) -> bool {
        let Some(element) = self.elements.iter_mut().find(|el| el.id == id) else {
            return false;
        };
        patch(element);
        element.id = id;
        self.elements_changed(ChangeOrigin::Local);
        true
    }

    /// Remove an element, clearing the selection if it pointed at it.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let index = self.element_index(id)?;
        let removed = self.elements.remove(index);
        self.elements_changed(ChangeOrigin::Local);
        self.drop_dangling_selection();
        Some(removed)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        if self.elements.is_empty() {
            return;
        }
        self.elements.clear();
        self.elements_changed(ChangeOrigin::Local);
        self.drop_dangling_selection();
    }

    /// Swap in a whole element list (hydration and remote merges).
    ///
    /// The difference is folded into the history baseline and every undo/redo
    /// entry: it is not a local action, and undoing a local action keeps it.
    pub fn replace_elements(&mut self, elements: Vec<Element>, origin: ChangeOrigin) {
        if elements == self.elements {
            return;
        }
        let before = std::mem::replace(&mut self.elements, elements);
        self.history.merge_external(&before, &self.elements);
        self.elements_changed(origin);
        self.drop_dangling_selection();
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn element_index(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|el| el.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- selection ---

    pub fn select_element(&mut self, id: Option<ElementId>) {
        let id = id.filter(|id| self.element(*id).is_some());
        if self.selection != id {
            self.selection = id;
            self.events.emit(&StoreEvent::SelectionChanged);
        }
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selection.and_then(|id| self.element(id))
    }

    // --- tool settings ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool != tool {
            self.tool = tool;
            self.events.emit(&StoreEvent::ToolChanged);
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.settings.color = color;
        self.events.emit(&StoreEvent::StyleChanged);
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.settings.thickness = thickness.max(0.0);
        self.events.emit(&StoreEvent::StyleChanged);
    }

    pub fn set_font_size(&mut self, font_size: f64) {
        self.settings.font_size = font_size.max(1.0);
        self.events.emit(&StoreEvent::StyleChanged);
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    // --- pointer & camera ---

    /// Local pointer in world coordinates, `None` when outside the canvas.
    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        if self.pointer != pointer {
            self.pointer = pointer;
            self.events.emit(&StoreEvent::PointerMoved);
        }
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn set_camera(&mut self, camera: Camera) {
        let camera = camera.clamped();
        if self.camera != camera {
            self.camera = camera;
            self.camera_revision += 1;
            self.events.emit(&StoreEvent::CameraChanged);
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn camera_revision(&self) -> u64 {
        self.camera_revision
    }

    // --- history ---

    /// Record the current elements as one undoable action.
    pub fn push_history(&mut self) {
        self.history.commit(&self.elements);
        self.events.emit(&StoreEvent::HistoryChanged);
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo(&self.elements) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo(&self.elements) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Vec<Element>) {
        self.elements = snapshot;
        self.elements_changed(ChangeOrigin::Local);
        self.drop_dangling_selection();
        self.events.emit(&StoreEvent::HistoryChanged);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop all history, keeping the current elements as the baseline.
    pub fn reset_history(&mut self) {
        self.history.reset(&self.elements);
        self.events.emit(&StoreEvent::HistoryChanged);
    }

    // --- collaboration status ---

    pub fn set_collab_connected(&mut self, connected: bool) {
        if self.collab_connected != connected {
            self.collab_connected = connected;
            self.events.emit(&StoreEvent::CollabStatusChanged);
        }
    }

    pub fn collab_connected(&self) -> bool {
        self.collab_connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BoxGeometry, ElementKind, ElementStyle};
    use std::sync::{Arc, Mutex};

    fn rect(x: f64) -> Element {
        Element::new(ElementKind::Rect(BoxGeometry::new(x, 0.0, 10.0, 10.0)), ElementStyle::default())
    }

    fn recorder(store: &mut SceneStore) -> Arc<Mutex<Vec<StoreEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        store.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        log
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = SceneStore::new();
        let el = rect(0.0);
        store.add_element(el.clone()).unwrap();
        assert_eq!(store.add_element(el.clone()), Err(StoreError::DuplicateId(el.id())));
        assert_eq!(store.elements().len(), 1);
    }

    #[test]
    fn test_update_preserves_id() {
        let mut store = SceneStore::new();
        let el = rect(0.0);
        let id = el.id();
        store.add_element(el).unwrap();

        assert!(store.update_element(id, |el| {
            el.id = ElementId::new_v4();
            el.translate(kurbo::Vec2::new(5.0, 0.0));
        }));
        let updated = store.element(id).unwrap();
        assert_eq!(updated.origin(), Point::new(5.0, 0.0));
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = SceneStore::new();
        let revision = store.revision();
        assert!(!store.update_element(ElementId::new_v4(), |_| panic!("should not run")));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut store = SceneStore::new();
        let el = rect(0.0);
        let id = el.id();
        store.add_element(el).unwrap();
        store.select_element(Some(id));
        assert_eq!(store.selection(), Some(id));

        assert!(store.remove_element(id).is_some());
        assert!(store.element(id).is_none());
        assert_eq!(store.selection(), None);
        assert!(store.remove_element(id).is_none());
    }

    #[test]
    fn test_select_unknown_id_clears() {
        let mut store = SceneStore::new();
        store.select_element(Some(ElementId::new_v4()));
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_undo_redo_after_push() {
        let mut store = SceneStore::new();
        store.add_element(rect(0.0)).unwrap();
        store.push_history();
        let before = store.elements().to_vec();

        store.add_element(rect(50.0)).unwrap();
        store.push_history();
        let after = store.elements().to_vec();

        assert!(store.undo());
        assert_eq!(store.elements(), before.as_slice());
        assert!(store.can_redo());
        assert!(store.redo());
        assert_eq!(store.elements(), after.as_slice());
        assert!(!store.redo());
    }

    #[test]
    fn test_undo_at_boundary() {
        let mut store = SceneStore::new();
        assert!(!store.can_undo());
        assert!(!store.undo());
        store.add_element(rect(0.0)).unwrap();
        store.push_history();
        assert!(store.undo());
        assert!(store.elements().is_empty());
        assert!(!store.undo());
    }

    #[test]
    fn test_undo_drops_selection_of_vanished_element() {
        let mut store = SceneStore::new();
        let el = rect(0.0);
        let id = el.id();
        store.add_element(el).unwrap();
        store.push_history();
        store.select_element(Some(id));
        assert!(store.undo());
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_replace_elements_rebases_history() {
        let mut store = SceneStore::new();
        let remote = rect(1.0);
        store.replace_elements(vec![remote.clone()], ChangeOrigin::Remote);
        assert!(!store.can_undo());

        store.add_element(rect(2.0)).unwrap();
        store.push_history();
        assert!(store.undo());
        assert_eq!(store.elements(), &[remote]);
    }

    #[test]
    fn test_events_emitted() {
        let mut store = SceneStore::new();
        let log = recorder(&mut store);

        store.add_element(rect(0.0)).unwrap();
        store.set_tool(ToolKind::Rect);
        store.set_tool(ToolKind::Rect);
        store.set_camera(Camera::new(1.0, 2.0, 1.0));
        store.set_collab_connected(true);
        store.replace_elements(Vec::new(), ChangeOrigin::Remote);

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                StoreEvent::ElementsChanged { origin: ChangeOrigin::Local },
                StoreEvent::ToolChanged,
                StoreEvent::CameraChanged,
                StoreEvent::CollabStatusChanged,
                StoreEvent::ElementsChanged { origin: ChangeOrigin::Remote },
            ]
        );
    }

    #[test]
    fn test_set_camera_clamps_and_bumps_revision() {
        let mut store = SceneStore::new();
        store.set_camera(Camera { x: 0.0, y: 0.0, z: 50.0 });
        assert_eq!(store.camera().z, crate::camera::MAX_ZOOM);
        assert_eq!(store.camera_revision(), 1);
        store.set_camera(store.camera());
        assert_eq!(store.camera_revision(), 1);
    }

    #[test]
    fn test_style_setters() {
        let mut store = SceneStore::new();
        store.set_color(SerializableColor::rgb(0, 128, 255));
        store.set_thickness(6.0);
        store.set_font_size(32.0);
        let settings = store.settings();
        assert_eq!(settings.color, SerializableColor::rgb(0, 128, 255));
        assert_eq!(settings.thickness, 6.0);
        assert_eq!(settings.font_size, 32.0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut store = SceneStore::new();
        let el = rect(0.0);
        let id = el.id();
        store.add_element(el).unwrap();
        store.add_element(rect(20.0)).unwrap();
        store.select_element(Some(id));
        store.clear();
        assert!(store.elements().is_empty());
        assert_eq!(store.selection(), None);
    }
}
