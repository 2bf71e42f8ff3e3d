//! inkroom core library
//!
//! Platform-agnostic scene model, interaction engine and replicated-document
//! sync for the inkroom collaborative canvas.

pub mod camera;
pub mod collaboration;
pub mod config;
pub mod crdt;
pub mod elements;
pub mod events;
pub mod geometry;
pub mod history;
pub mod identity;
pub mod input;
pub mod interaction;
pub mod overlay;
pub mod platform;
pub mod presence;
pub mod room;
pub mod session;
pub mod storage;
pub mod store;
pub mod tools;

pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM};
pub use collaboration::{SyncEngine, SyncError};
pub use config::{ConfigError, EngineConfig, SyncConfig, TextConfig};
pub use crdt::{LoroReplica, MemoryReplica, ReplicaError, ReplicatedDocument};
pub use elements::{Element, ElementId, ElementKind, ElementStyle, SerializableColor};
pub use events::{ChangeOrigin, EventBus, ListenerId, StoreEvent};
pub use geometry::{Bounds, hit_test};
pub use history::{History, MAX_UNDO_HISTORY};
pub use identity::LocalIdentity;
pub use input::{ClickTracker, Key, KeyInput, Modifiers, MouseButton, PointerInput};
pub use interaction::{Gesture, InteractionEngine, Response};
pub use overlay::{OverlayError, OverlayLayout, OverlayOutcome, TextEditOverlay, TextInputHost};
pub use platform::{Clock, ManualClock, SystemClock};
pub use presence::Presence;
pub use room::RoomId;
pub use session::CanvasSession;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{SceneStore, StoreError};
pub use tools::{ToolKind, ToolSettings};
