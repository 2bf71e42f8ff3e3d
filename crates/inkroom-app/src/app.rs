//! Headless host: opens a room, replays input, merges peer updates and exports.

use crate::config::AppConfig;
use crate::host::LoggingTextHost;
use crate::script::{ScriptStep, parse_script, replay};
use inkroom_core::storage::FileStorage;
use inkroom_core::{
    CanvasSession, Clock, ConfigError, ManualClock, ReplicaError, RoomId, Storage, StorageError, SyncError,
    SystemClock,
};
use inkroom_render::{RedrawHandle, RenderContext, Renderer, RendererError, SceneRenderer, SvgSurface};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid room url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid script: {0}")]
    Script(#[source] serde_json::Error),
    #[error("failed to encode elements: {0}")]
    Export(#[source] serde_json::Error),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Replica(#[from] ReplicaError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

/// What one run should do.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Page URL the room is derived from; `local` when absent.
    pub url: Option<String>,
    /// Directory for persisted documents; the platform data dir when absent.
    pub data_dir: Option<PathBuf>,
    /// Peer update files merged before the script runs.
    pub imports: Vec<PathBuf>,
    pub script: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    /// Element JSON destination, `-` for stdout.
    pub dump_json: Option<PathBuf>,
    /// Where to write this peer's full update log for other peers to import.
    pub export_updates: Option<PathBuf>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub room: RoomId,
    pub connected: bool,
    pub elements: usize,
    pub peers: usize,
    pub frames: usize,
}

fn read(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    std::fs::write(path, bytes).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    storage: Arc<dyn Storage>,
    clock: Arc<ManualClock>,
}

impl App {
    pub fn new(config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        // Replays run on simulated time starting from now.
        let clock = Arc::new(ManualClock::new(SystemClock.now_ms()));
        Self { config, storage, clock }
    }

    pub fn with_data_dir(config: AppConfig, data_dir: Option<&Path>) -> Result<Self, AppError> {
        let storage = match data_dir {
            Some(dir) => FileStorage::new(dir.to_path_buf())?,
            None => FileStorage::default_location()?,
        };
        log::info!("storing documents in {}", storage.base_path().display());
        Ok(Self::new(config, Arc::new(storage)))
    }

    pub fn room_for(url: Option<&str>) -> Result<RoomId, AppError> {
        Ok(match url {
            Some(url) => RoomId::parse(url)?,
            None => RoomId::new("local"),
        })
    }

    pub fn run(&self, options: &RunOptions) -> Result<RunReport, AppError> {
        pollster::block_on(self.run_async(options))
    }

    async fn run_async(&self, options: &RunOptions) -> Result<RunReport, AppError> {
        let room = Self::room_for(options.url.as_deref())?;
        let steps: Vec<ScriptStep> = match &options.script {
            Some(path) => {
                let json = String::from_utf8_lossy(&read(path)?).into_owned();
                parse_script(&json).map_err(AppError::Script)?
            }
            None => Vec::new(),
        };

        let mut session = CanvasSession::open(
            &self.config.engine,
            &room,
            self.storage.clone(),
            self.clock.clone(),
            LoggingTextHost::default(),
        )
        .await;
        log::info!(
            "opened room {room} as {} ({} elements, connected: {})",
            session.sync().identity().name,
            session.store().elements().len(),
            session.collab_connected()
        );

        let redraw = RedrawHandle::new();
        redraw.attach(session.store_mut());

        for path in &options.imports {
            let bytes = read(path)?;
            session.apply_remote(&bytes)?;
            log::info!("merged {}", path.display());
        }

        let mut frames = 0;
        self.draw_if_requested(&redraw, &session, &mut frames)?;
        for step in &steps {
            replay(&mut session, &self.clock, std::slice::from_ref(step));
            session.autosave().await;
            self.draw_if_requested(&redraw, &session, &mut frames)?;
        }

        if let Some(path) = &options.svg {
            self.render_svg(&session, Some(path))?;
        }
        if let Some(path) = &options.dump_json {
            let json = serde_json::to_string_pretty(session.store().elements()).map_err(AppError::Export)?;
            if path.as_os_str() == "-" {
                println!("{json}");
            } else {
                write(path, json.as_bytes())?;
            }
        }
        if let Some(path) = &options.export_updates {
            write(path, &session.export_updates(&[])?)?;
        }

        let report = RunReport {
            room,
            connected: session.collab_connected(),
            elements: session.store().elements().len(),
            peers: session.peers().len(),
            frames,
        };
        session.close().await?;
        Ok(report)
    }

    fn draw_if_requested(
        &self,
        redraw: &RedrawHandle,
        session: &CanvasSession<LoggingTextHost>,
        frames: &mut usize,
    ) -> Result<(), AppError> {
        if redraw.take() {
            self.render_svg(session, None)?;
            *frames += 1;
        }
        Ok(())
    }

    /// Render the current scene to SVG, writing it to `path` when given.
    pub fn render_svg(&self, session: &CanvasSession<LoggingTextHost>, path: Option<&Path>) -> Result<String, AppError> {
        let settings = &self.config.render;
        let mut surface = SvgSurface::new(settings.viewport());
        let ctx = settings.apply(
            RenderContext::new(session.store(), settings.viewport())
                .with_peers(session.peers())
                .with_editing(session.editing()),
        );
        SceneRenderer::new().render(&ctx, &mut surface)?;
        if let Some(path) = path {
            surface.write_to(path)?;
        }
        Ok(surface.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RECT_SCRIPT: &str = r#"[
        { "type": "tool", "tool": "rect" },
        { "type": "drag", "from": [100, 100], "to": [300, 200] }
    ]"#;

    fn app(dir: &TempDir) -> App {
        App::with_data_dir(AppConfig::default(), Some(&dir.path().join("data"))).unwrap()
    }

    fn script(dir: &TempDir, name: &str, json: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_room_for_url() {
        assert_eq!(App::room_for(None).unwrap().as_str(), "local");
        assert_eq!(App::room_for(Some("https://x.io/a/b")).unwrap().as_str(), "local-a-b");
        assert!(matches!(App::room_for(Some("not a url")), Err(AppError::Url(_))));
    }

    #[test]
    fn test_replay_persists_and_exports() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions {
            url: Some("https://example.com/board?room=demo".into()),
            script: Some(script(&dir, "rect.json", RECT_SCRIPT)),
            svg: Some(dir.path().join("out.svg")),
            dump_json: Some(dir.path().join("out.json")),
            ..RunOptions::default()
        };
        let report = app(&dir).run(&options).unwrap();
        assert_eq!(report.room.as_str(), "demo");
        assert!(report.connected);
        assert_eq!(report.elements, 1);
        assert!(report.frames >= 2);

        let svg = std::fs::read_to_string(dir.path().join("out.svg")).unwrap();
        assert!(svg.contains("stroke=\"#1e1e1e\""));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
        assert_eq!(json[0]["type"], "rect");
        assert_eq!(json[0]["w"], 200.0);

        // Reopening the room restores the persisted document.
        let again = app(&dir)
            .run(&RunOptions {
                url: options.url.clone(),
                ..RunOptions::default()
            })
            .unwrap();
        assert_eq!(again.elements, 1);
    }

    #[test]
    fn test_peers_exchange_update_files() {
        let dir = TempDir::new().unwrap();
        let a_updates = dir.path().join("a.bin");
        let a = App::with_data_dir(AppConfig::default(), Some(&dir.path().join("a"))).unwrap();
        a.run(&RunOptions {
            script: Some(script(&dir, "rect.json", RECT_SCRIPT)),
            export_updates: Some(a_updates.clone()),
            ..RunOptions::default()
        })
        .unwrap();

        let b = App::with_data_dir(AppConfig::default(), Some(&dir.path().join("b"))).unwrap();
        let report = b
            .run(&RunOptions {
                imports: vec![a_updates],
                script: Some(script(
                    &dir,
                    "ellipse.json",
                    r#"[
                        { "type": "tool", "tool": "ellipse" },
                        { "type": "drag", "from": [400, 100], "to": [500, 200] }
                    ]"#,
                )),
                ..RunOptions::default()
            })
            .unwrap();
        assert_eq!(report.elements, 2);
    }

    #[test]
    fn test_import_into_local_only_room_still_runs() {
        let dir = TempDir::new().unwrap();
        let peer_updates = dir.path().join("peer.bin");
        let peer = App::with_data_dir(AppConfig::default(), Some(&dir.path().join("peer"))).unwrap();
        peer.run(&RunOptions {
            script: Some(script(&dir, "rect.json", RECT_SCRIPT)),
            export_updates: Some(peer_updates.clone()),
            ..RunOptions::default()
        })
        .unwrap();

        let local = app(&dir);
        std::fs::write(dir.path().join("data").join("inkroom-local.bin"), b"garbage").unwrap();
        let report = local
            .run(&RunOptions {
                imports: vec![peer_updates],
                script: Some(script(
                    &dir,
                    "ellipse.json",
                    r#"[
                        { "type": "tool", "tool": "ellipse" },
                        { "type": "drag", "from": [400, 100], "to": [500, 200] }
                    ]"#,
                )),
                ..RunOptions::default()
            })
            .unwrap();
        assert!(!report.connected);
        assert_eq!(report.elements, 1);
    }

    #[test]
    fn test_bad_script_is_an_error() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions {
            script: Some(script(&dir, "bad.json", "{")),
            ..RunOptions::default()
        };
        assert!(matches!(app(&dir).run(&options), Err(AppError::Script(_))));
    }

    #[test]
    fn test_missing_import_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.bin");
        let options = RunOptions {
            imports: vec![missing.clone()],
            ..RunOptions::default()
        };
        let Err(AppError::Io { path, .. }) = app(&dir).run(&options) else {
            panic!("expected io error");
        };
        assert_eq!(path, missing);
    }
}
