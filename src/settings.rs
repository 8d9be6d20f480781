//! Runtime settings with persistence
//!
//! Settings are read from the path given on the command line, or from
//! `~/.config/lumen/runtime.toml`

use std::fs;
use std::path::{Path, PathBuf};

use lumen_core::ClockConfig;
use lumen_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub physics: PhysicsConfig,
    pub viewport: ViewportSettings,
    pub playback: PlaybackSettings,
}

impl RuntimeSettings {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lumen"))
    }

    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("runtime.toml"))
    }

    /// Load settings from `path` (or the default location), falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path` as pretty TOML, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Initial viewport size in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// How the headless runtime drives the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Frames to simulate before stopping
    pub frames: u32,
    /// Wall-clock time fed to the frame clock each frame, in seconds
    pub frame_time: f32,
    /// Simulated seconds per real second
    pub time_scale: f32,
    /// Scene update step, in seconds
    pub fixed_timestep: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            frames: 180,
            frame_time: 1.0 / 60.0,
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
        }
    }
}

impl PlaybackSettings {
    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            time_scale: self.time_scale,
            fixed_timestep: self.fixed_timestep,
            ..Default::default()
        }
    }
}
