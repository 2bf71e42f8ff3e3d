//! Host configuration: engine settings plus how frames are rendered.

use inkroom_core::{ConfigError, EngineConfig, SerializableColor};
use inkroom_render::{DEFAULT_GRID_SPACING, GridStyle, RenderContext};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
    pub grid_style: GridStyle,
    pub grid_spacing: f64,
    pub background_color: SerializableColor,
    pub selection_color: SerializableColor,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scale_factor: 1.0,
            grid_style: GridStyle::Lines,
            grid_spacing: DEFAULT_GRID_SPACING,
            background_color: SerializableColor::rgb(250, 250, 250),
            selection_color: SerializableColor::rgb(59, 130, 246),
        }
    }
}

impl RenderSettings {
    pub fn viewport(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Apply these settings to a frame context.
    pub fn apply<'a>(&self, ctx: RenderContext<'a>) -> RenderContext<'a> {
        ctx.with_scale_factor(self.scale_factor)
            .with_grid(self.grid_style, self.grid_spacing)
            .with_background(self.background_color.into())
            .with_selection_color(self.selection_color.into())
    }
}

/// Everything the `inkroom` binary reads from its JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub render: RenderSettings,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The config file when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
