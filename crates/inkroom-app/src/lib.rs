//! inkroom application
//!
//! Headless host for the inkroom canvas: opens a room from a page URL,
//! replays scripted input, exchanges update files with peers and exports
//! the drawing as SVG or JSON.

mod app;
mod config;
mod host;
pub mod script;

pub use app::{App, AppError, RunOptions, RunReport};
pub use config::{AppConfig, RenderSettings};
pub use host::LoggingTextHost;
pub use script::{ScriptStep, parse_script, replay};
