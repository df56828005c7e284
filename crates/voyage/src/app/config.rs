use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use navgrid::{Cell, LayerRules, MovementModel, OverlayOptions, Viewport, ZoomLimits};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const CONFIG_ENV_VAR: &str = "VOYAGE_CONFIG";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config '{path}' at {location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value at {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CameraConfig {
    pub(crate) scale: f32,
    pub(crate) min_scale: f32,
    pub(crate) max_scale: f32,
    pub(crate) zoom_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let limits = ZoomLimits::default();
        Self {
            scale: 2.0,
            min_scale: limits.min_scale,
            max_scale: limits.max_scale,
            zoom_step: limits.step,
        }
    }
}

impl CameraConfig {
    pub(crate) fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            step: self.zoom_step,
        }
    }
}

/// How a scripted pointer position is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PointerSpace {
    /// Window pixels.
    #[default]
    Screen,
    /// `x` is a column and `y` a row; the pointer lands on that cell's centre
    /// under the camera at the time the event fires.
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptedPointer {
    pub(crate) tick: u64,
    pub(crate) x: f32,
    pub(crate) y: f32,
    #[serde(default)]
    pub(crate) click: bool,
    #[serde(default)]
    pub(crate) zoom_steps: i32,
    #[serde(default)]
    pub(crate) space: PointerSpace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct VoyageConfig {
    pub(crate) tile_size: f32,
    pub(crate) viewport: Viewport,
    pub(crate) camera: CameraConfig,
    pub(crate) ship_speed_px_per_second: f32,
    pub(crate) movement_model: MovementModel,
    pub(crate) layer_rules: LayerRules,
    pub(crate) target_tps: u32,
    pub(crate) max_ticks: u64,
    pub(crate) overlay: OverlayOptions,
    pub(crate) start_cell: Option<Cell>,
    pub(crate) script: Vec<ScriptedPointer>,
}

impl Default for VoyageConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            viewport: Viewport::default(),
            camera: CameraConfig::default(),
            ship_speed_px_per_second: 200.0,
            movement_model: MovementModel::default(),
            layer_rules: LayerRules::default(),
            target_tps: 60,
            max_ticks: 1200,
            overlay: OverlayOptions::default(),
            start_cell: None,
            script: Vec::new(),
        }
    }
}

impl VoyageConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("camera.scale", self.camera.scale)?;
        positive("camera.min_scale", self.camera.min_scale)?;
        positive("camera.max_scale", self.camera.max_scale)?;
        if self.camera.min_scale > self.camera.max_scale {
            return Err(ConfigError::Invalid {
                field: "camera.min_scale",
                message: format!(
                    "expected <= camera.max_scale ({}), got {}",
                    self.camera.max_scale, self.camera.min_scale
                ),
            });
        }
        if !self.camera.zoom_step.is_finite() || self.camera.zoom_step < 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.zoom_step",
                message: format!("expected a finite value >= 0, got {}", self.camera.zoom_step),
            });
        }
        positive("ship_speed_px_per_second", self.ship_speed_px_per_second)?;
        nonzero("target_tps", self.target_tps)?;
        nonzero("viewport.width", self.viewport.width)?;
        nonzero("viewport.height", self.viewport.height)?;
        Ok(())
    }

    /// Pulls an out-of-range starting zoom back inside the limits.
    fn normalize(mut self) -> Self {
        let clamped = self.camera.zoom_limits().clamp(self.camera.scale);
        if clamped != self.camera.scale {
            warn!(
                requested = self.camera.scale,
                applied = clamped,
                "camera_scale_clamped"
            );
            self.camera.scale = clamped;
        }
        self
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field,
        message: format!("expected a finite value > 0, got {value}"),
    })
}

fn nonzero(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value > 0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field,
        message: "expected > 0, got 0".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    Defaults,
}

/// `--config` wins over the environment; an empty env value counts as unset.
pub(crate) fn resolve_config_source(
    flag: Option<&Path>,
    env_value: Option<OsString>,
) -> ConfigSource {
    if let Some(path) = flag {
        return ConfigSource::Flag(path.to_path_buf());
    }
    match env_value {
        Some(value) if !value.is_empty() => ConfigSource::Env(PathBuf::from(value)),
        _ => ConfigSource::Defaults,
    }
}

pub(crate) fn load_config(source: &ConfigSource) -> Result<VoyageConfig, ConfigError> {
    let config = match source {
        ConfigSource::Flag(path) | ConfigSource::Env(path) => {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            parse_config_json(&raw, path)?
        }
        ConfigSource::Defaults => VoyageConfig::default(),
    };
    config.validate()?;
    let config = config.normalize();
    info!(
        source = ?source,
        tile_size = config.tile_size,
        movement_model = ?config.movement_model,
        scripted_events = config.script.len(),
        "config_loaded"
    );
    Ok(config)
}

pub(crate) fn parse_config_json(raw: &str, path: &Path) -> Result<VoyageConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, VoyageConfig>(&mut deserializer).map_err(|error| {
        let location = error.path().to_string();
        let location = if location.is_empty() || location == "." {
            "<root>".to_string()
        } else {
            location
        };
        ConfigError::Parse {
            path: path.to_path_buf(),
            location,
            source: error.into_inner(),
        }
    })
}
