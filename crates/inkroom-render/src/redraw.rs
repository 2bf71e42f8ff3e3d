//! Redraw requests driven by store notifications.

use inkroom_core::{ListenerId, SceneStore, StoreEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "frame is stale" flag. Cloned handles share the flag.
#[derive(Debug, Clone, Default)]
pub struct RedrawHandle {
    requested: Arc<AtomicBool>,
}

impl RedrawHandle {
    /// A handle that starts out requesting the first frame.
    pub fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Subscribe to `store`; element, camera, selection, history and
    /// collaboration status changes request a redraw.
    pub fn attach(&self, store: &mut SceneStore) -> ListenerId {
        let requested = self.requested.clone();
        store.subscribe(move |event| {
            if Self::affects_frame(event) {
                requested.store(true, Ordering::SeqCst);
            }
        })
    }

    fn affects_frame(event: &StoreEvent) -> bool {
        matches!(
            event,
            StoreEvent::ElementsChanged { .. }
                | StoreEvent::CameraChanged
                | StoreEvent::SelectionChanged
                | StoreEvent::HistoryChanged
                | StoreEvent::CollabStatusChanged
        )
    }

    /// Request a frame, e.g. after a viewport resize or a peer list change.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Returns whether a frame was requested and clears the request.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}
