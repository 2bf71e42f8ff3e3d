//! One open canvas: store, interaction engine, text overlay and sync wired together.

use crate::collaboration::{SyncEngine, SyncError};
use crate::config::EngineConfig;
use crate::crdt::ReplicaError;
use crate::elements::{ElementId, SerializableColor};
use crate::events::{ListenerId, StoreEvent};
use crate::input::{ClickTracker, KeyInput, MouseButton, PointerInput};
use crate::interaction::{InteractionEngine, Response};
use crate::overlay::{OverlayLayout, OverlayOutcome, TextEditOverlay, TextInputHost};
use crate::platform::Clock;
use crate::presence::Presence;
use crate::room::RoomId;
use crate::storage::Storage;
use crate::store::SceneStore;
use crate::tools::ToolKind;
use kurbo::Point;
use std::sync::Arc;

/// Entry point for hosts. Every input method mirrors the resulting changes
/// into the replicated document; hosts call [`CanvasSession::autosave`]
/// from their idle loop to persist.
pub struct CanvasSession<H: TextInputHost> {
    store: SceneStore,
    engine: InteractionEngine,
    clicks: ClickTracker,
    overlay: TextEditOverlay,
    sync: SyncEngine,
    host: H,
    clock: Arc<dyn Clock>,
    published_pointer: Option<Point>,
}

impl<H: TextInputHost> CanvasSession<H> {
    pub async fn open(
        config: &EngineConfig,
        room: &RoomId,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        host: H,
    ) -> Self {
        let sync = SyncEngine::open(&config.sync, room, storage, clock.clone()).await;
        let store = SceneStore::with_settings(config.tools.clone());
        Self::new(store, sync, host, clock, config.text.default_width)
    }

    /// Wire an existing store and sync engine; the store is hydrated from the replica.
    pub fn new(mut store: SceneStore, mut sync: SyncEngine, host: H, clock: Arc<dyn Clock>, text_width: f64) -> Self {
        sync.hydrate(&mut store);
        Self {
            published_pointer: store.pointer(),
            store,
            engine: InteractionEngine::new(text_width),
            clicks: ClickTracker::new(),
            overlay: TextEditOverlay::new(),
            sync,
            host,
            clock,
        }
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Direct store access for embedding UI. Changes are mirrored on the next input or [`Self::flush`].
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn peers(&self) -> &[Presence] {
        self.sync.peers()
    }

    pub fn editing(&self) -> Option<ElementId> {
        self.overlay.editing()
    }

    pub fn overlay_layout(&self) -> Option<OverlayLayout> {
        self.overlay.layout(&self.store)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + Send + 'static) -> ListenerId {
        self.store.subscribe(listener)
    }

    pub fn pointer_down(&mut self, input: &PointerInput) -> Response {
        if self.clicks.register(self.clock.as_ref(), input) {
            let response = self.engine.double_click(&mut self.store, input);
            if let Response::EditText(id) = response {
                self.open_overlay(id);
                self.after_input();
                return response;
            }
        }

        // Clicking the canvas takes focus from the text input; panning does not.
        if input.button != MouseButton::Middle {
            self.overlay.blur(&mut self.store, &mut self.host);
        }

        let response = self.engine.pointer_down(&mut self.store, input);
        if let Response::EditText(id) = response {
            self.open_overlay(id);
        }
        self.after_input();
        response
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> Response {
        let camera_revision = self.store.camera_revision();
        let response = self.engine.pointer_move(&mut self.store, input);
        if self.store.camera_revision() != camera_revision {
            self.overlay.refresh(&self.store, &mut self.host);
        }
        self.after_input();
        response
    }

    pub fn pointer_up(&mut self, input: &PointerInput) -> Response {
        let response = self.engine.pointer_up(&mut self.store, input);
        self.after_input();
        response
    }

    pub fn pointer_leave(&mut self) {
        self.engine.pointer_leave(&mut self.store);
        self.after_input();
    }

    pub fn wheel(&mut self, delta_y: f64) -> Response {
        let response = self.engine.wheel(&mut self.store, delta_y);
        self.overlay.refresh(&self.store, &mut self.host);
        self.after_input();
        response
    }

    /// Keys go to the text overlay first while it is open.
    pub fn key_down(&mut self, input: &KeyInput) -> Response {
        let response = match self.overlay.handle_key(&mut self.store, &mut self.host, input) {
            OverlayOutcome::NotHandled => self.engine.key_down(&mut self.store, input),
            _ => Response::Handled,
        };
        self.after_input();
        response
    }

    pub fn key_up(&mut self, input: &KeyInput) -> Response {
        if self.overlay.is_active() {
            return Response::Handled;
        }
        self.engine.key_up(&mut self.store, input)
    }

    /// Full value of the platform text input, for hosts that report it wholesale.
    pub fn text_input(&mut self, text: &str) {
        self.overlay.set_text(&self.store, &mut self.host, text);
    }

    /// The text input lost focus.
    pub fn blur(&mut self) {
        if self.overlay.blur(&mut self.store, &mut self.host) {
            self.after_input();
        }
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.store.set_tool(tool);
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.store.set_color(color);
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.store.set_thickness(thickness);
    }

    pub fn set_font_size(&mut self, font_size: f64) {
        self.store.set_font_size(font_size);
    }

    pub fn undo(&mut self) -> bool {
        let applied = self.store.undo();
        self.after_input();
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.store.redo();
        self.after_input();
        applied
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    pub fn collab_connected(&self) -> bool {
        self.store.collab_connected()
    }

    /// Remove every element as one undoable step.
    pub fn clear_canvas(&mut self) {
        self.overlay.cancel(&mut self.host);
        self.store.clear();
        self.store.push_history();
        self.after_input();
    }

    /// Import a peer's updates and merge them. A local-only session has no
    /// replicated document to merge into and ignores them.
    pub fn apply_remote(&mut self, bytes: &[u8]) -> Result<bool, ReplicaError> {
        if !self.sync.is_connected() {
            log::warn!("ignoring {} bytes of peer updates: running local-only", bytes.len());
            return Ok(false);
        }
        self.sync.apply_remote(bytes)?;
        Ok(self.poll())
    }

    /// Merge pending remote changes. Returns true when the elements changed.
    pub fn poll(&mut self) -> bool {
        let merged = self.sync.poll_remote(&mut self.store);
        if merged {
            if let Some(id) = self.overlay.editing() {
                if self.store.element(id).is_none() {
                    log::debug!("text {id} was deleted remotely, closing editor");
                    self.overlay.cancel(&mut self.host);
                } else {
                    self.overlay.refresh(&self.store, &mut self.host);
                }
            }
        }
        merged
    }

    pub fn export_updates(&self, since: &[u8]) -> Result<Vec<u8>, ReplicaError> {
        self.sync.export_updates(since)
    }

    pub fn version(&self) -> Vec<u8> {
        self.sync.version()
    }

    /// Mirror pending local changes and publish our cursor if it moved.
    pub fn flush(&mut self) {
        if let Err(err) = self.sync.flush_local(&self.store) {
            log::warn!("could not mirror local changes: {err}");
        }
        let pointer = self.store.pointer();
        if pointer != self.published_pointer {
            match self.sync.update_presence(pointer) {
                Ok(()) => self.published_pointer = pointer,
                Err(err) => log::warn!("could not publish presence: {err}"),
            }
        }
    }

    fn after_input(&mut self) {
        self.flush();
    }

    fn open_overlay(&mut self, id: ElementId) {
        if let Err(err) = self.overlay.open(&mut self.store, &mut self.host, id) {
            log::warn!("could not open text editor: {err}");
        }
    }

    /// Persist if the autosave interval allows. Returns true when written.
    pub async fn autosave(&mut self) -> bool {
        self.flush();
        match self.sync.maybe_persist().await {
            Ok(saved) => saved,
            Err(err) => {
                log::warn!("autosave failed: {err}");
                false
            }
        }
    }

    /// Commit any open edit, withdraw presence and write the snapshot.
    pub async fn close(mut self) -> Result<SceneStore, SyncError> {
        self.overlay.commit(&mut self.store, &mut self.host);
        self.flush();
        if let Err(err) = self.sync.leave() {
            log::warn!("could not withdraw presence: {err}");
        }
        self.sync.persist().await?;
        Ok(self.store)
    }
}
