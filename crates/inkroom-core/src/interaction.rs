//! Pointer/keyboard state machine that turns input into store mutations.

use crate::elements::{ElementId, ElementKind};
use crate::geometry::hit_test;
use crate::input::{Key, KeyInput, MouseButton, PointerInput};
use crate::store::SceneStore;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

/// Gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Camera follows the pointer; `last` is the previous screen position.
    Panning { last: Point },
    /// Moving an element; `offset` is world point minus element origin.
    Dragging { id: ElementId, offset: Vec2, moved: bool },
    /// Dragging out a draft element from `origin` (world).
    Drawing { id: ElementId, origin: Point },
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ignored,
    Handled,
    /// Open the text overlay for this element.
    EditText(ElementId),
}

/// Interaction engine. Holds only gesture state; everything else lives in the store.
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    gesture: Gesture,
    space_held: bool,
    text_width: f64,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(200.0)
    }
}

impl InteractionEngine {
    /// `text_width` is the width of boxes created by the text tool.
    pub fn new(text_width: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            space_held: false,
            text_width,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    /// Id of the draft being drawn, if any.
    pub fn draft(&self) -> Option<ElementId> {
        match self.gesture {
            Gesture::Drawing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, store: &mut SceneStore, input: &PointerInput) -> Response {
        let tool = store.tool();
        if tool == ToolKind::Hand || input.button == MouseButton::Middle || self.space_held {
            self.gesture = Gesture::Panning { last: input.position };
            return Response::Handled;
        }
        if input.button != MouseButton::Left {
            return Response::Ignored;
        }

        let world = store.camera().screen_to_world(input.position);
        match tool {
            ToolKind::Select => {
                let hit = hit_test(world, store.elements()).map(|el| (el.id(), world - el.origin()));
                match hit {
                    Some((id, offset)) => {
                        store.select_element(Some(id));
                        self.gesture = Gesture::Dragging { id, offset, moved: false };
                    }
                    None => {
                        store.select_element(None);
                        self.gesture = Gesture::Idle;
                    }
                }
                Response::Handled
            }
            ToolKind::Text => {
                let element = ToolKind::text_element(world, self.text_width, store.settings());
                let id = element.id();
                if let Err(err) = store.add_element(element) {
                    log::warn!("text element not created: {err}");
                    return Response::Ignored;
                }
                store.select_element(Some(id));
                self.gesture = Gesture::Idle;
                Response::EditText(id)
            }
            _ => {
                let Some(draft) = tool.draft_element(world, store.settings()) else {
                    return Response::Ignored;
                };
                let id = draft.id();
                if let Err(err) = store.add_element(draft) {
                    log::warn!("draft not created: {err}");
                    return Response::Ignored;
                }
                store.select_element(None);
                self.gesture = Gesture::Drawing { id, origin: world };
                Response::Handled
            }
        }
    }

    pub fn pointer_move(&mut self, store: &mut SceneStore, input: &PointerInput) -> Response {
        let camera = store.camera();
        let world = camera.screen_to_world(input.position);
        store.set_pointer(Some(world));

        match &mut self.gesture {
            Gesture::Idle => Response::Ignored,
            Gesture::Panning { last } => {
                let delta = input.position - *last;
                *last = input.position;
                let mut camera = camera;
                camera.pan(delta);
                store.set_camera(camera);
                Response::Handled
            }
            Gesture::Dragging { id, offset, moved } => {
                let target = world - *offset;
                let unchanged = store.element(*id).is_some_and(|el| el.origin() == target);
                if !unchanged && store.update_element(*id, |el| el.move_to(target)) {
                    *moved = true;
                }
                Response::Handled
            }
            Gesture::Drawing { id, origin } => {
                let origin = *origin;
                store.update_element(*id, |el| el.extend_draft(origin, world));
                Response::Handled
            }
        }
    }

    pub fn pointer_up(&mut self, store: &mut SceneStore, _input: &PointerInput) -> Response {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Response::Ignored,
            Gesture::Panning { .. } => Response::Handled,
            Gesture::Dragging { id, moved, .. } => {
                if moved && store.element(id).is_some() {
                    store.push_history();
                }
                Response::Handled
            }
            Gesture::Drawing { id, .. } => {
                // The draft may be gone already (undo or a remote delete mid-stroke).
                if store.element(id).is_some() {
                    log::debug!("draft {id} committed");
                    store.push_history();
                }
                Response::Handled
            }
        }
    }

    /// Pointer left the canvas; remote peers stop seeing our cursor.
    pub fn pointer_leave(&mut self, store: &mut SceneStore) {
        store.set_pointer(None);
    }

    pub fn wheel(&mut self, store: &mut SceneStore, delta_y: f64) -> Response {
        let mut camera = store.camera();
        camera.zoom_by_wheel(delta_y);
        store.set_camera(camera);
        Response::Handled
    }

    pub fn double_click(&mut self, store: &mut SceneStore, input: &PointerInput) -> Response {
        let world = store.camera().screen_to_world(input.position);
        let hit = hit_test(world, store.elements())
            .filter(|el| matches!(el.kind, ElementKind::Text(_)))
            .map(|el| el.id());
        match hit {
            Some(id) => {
                self.gesture = Gesture::Idle;
                store.select_element(Some(id));
                Response::EditText(id)
            }
            None => Response::Ignored,
        }
    }

    pub fn key_down(&mut self, store: &mut SceneStore, input: &KeyInput) -> Response {
        let mods = input.modifiers;
        if mods.action() {
            if input.key.is_letter('z') || input.key.is_letter('y') {
                // Restoring a snapshot ends any edit in progress.
                if !self.cancel_draft(store) && matches!(self.gesture, Gesture::Dragging { .. }) {
                    self.gesture = Gesture::Idle;
                }
            }
            if input.key.is_letter('z') {
                let applied = if mods.shift { store.redo() } else { store.undo() };
                log::debug!("history shortcut applied: {applied}");
                return Response::Handled;
            }
            if input.key.is_letter('y') {
                store.redo();
                return Response::Handled;
            }
            return Response::Ignored;
        }

        match input.key {
            Key::Delete | Key::Backspace => {
                let Some(id) = store.selection() else {
                    return Response::Ignored;
                };
                store.remove_element(id);
                store.select_element(None);
                store.push_history();
                Response::Handled
            }
            Key::Space => {
                self.space_held = true;
                Response::Handled
            }
            Key::Escape => {
                if !self.cancel_draft(store) {
                    store.select_element(None);
                }
                Response::Handled
            }
            _ => Response::Ignored,
        }
    }

    /// Drop the draft being drawn, if any, without a history entry.
    fn cancel_draft(&mut self, store: &mut SceneStore) -> bool {
        let Gesture::Drawing { id, .. } = self.gesture else {
            return false;
        };
        store.remove_element(id);
        self.gesture = Gesture::Idle;
        true
    }

    pub fn key_up(&mut self, _store: &mut SceneStore, input: &KeyInput) -> Response {
        if input.key == Key::Space {
            self.space_held = false;
            return Response::Handled;
        }
        Response::Ignored
    }
}
