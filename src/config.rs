// File: src/config.rs
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::color::DEFAULT_EVENT_COLOR;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the event backend.
    pub backend_url: String,
    /// Bearer token attached to backend requests when present.
    pub auth_token: Option<String>,
    pub basemap: String,
    /// Initial view before geolocation kicks in.
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
    /// Below this zoom the density view replaces discrete features.
    pub density_zoom_threshold: f64,
    pub default_event_color: String,
    /// Delay before the start field is auto-filled when routing is
    /// entered from a feature popup, letting the panel settle first.
    pub nav_start_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8081".to_string(),
            auth_token: None,
            basemap: "streets-vector".to_string(),
            center_lon: -118.73682450024377,
            center_lat: 34.07817583063242,
            zoom: 10.0,
            density_zoom_threshold: 11.0,
            default_event_color: DEFAULT_EVENT_COLOR.to_string(),
            nav_start_delay_ms: 500,
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, String> {
        let dirs = ProjectDirs::from("org", "fairfinder", "fairmap")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads the config, falling back to defaults when none exists yet.
    pub fn load() -> Result<Self, String> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|e| e.to_string())?;
        toml::from_str(&raw).map_err(|e| e.to_string())
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, raw).map_err(|e| e.to_string())
    }
}
