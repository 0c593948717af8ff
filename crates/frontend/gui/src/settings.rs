//! Persisted user settings (JSON next to the executable).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use triflip_core::Camera;

use crate::mode::DEFAULT_MODE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display mode number; the `/m` switch overrides this.
    pub mode: u32,
    /// Mesh to spin: "cube", "ribbon" or "disc".
    pub mesh: String,
    /// Directory holding the demo bitmaps; default is `assets` next to the
    /// executable.
    pub asset_dir: Option<String>,
    /// Camera position, saved on exit.
    pub camera: Camera,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: DEFAULT_MODE,
            mesh: "cube".to_string(),
            asset_dir: None,
            camera: Camera::default(),
        }
    }
}

impl Settings {
    /// Config file path relative to the executable.
    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("triflip.json");
        path
    }

    /// Load settings, falling back to defaults on error.
    pub fn load() -> Self {
        let path = Self::config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("cannot parse {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(Self::config_path(), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.mode, 0x110);
        assert_eq!(s.mesh, "cube");
        assert_eq!(s.camera.object_z, 5.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut s = Settings::default();
        s.mode = 0x115;
        s.mesh = "disc".to_string();
        s.camera.object_z = 7.5;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode, 0x115);
        assert_eq!(back.mesh, "disc");
        assert_eq!(back.camera.object_z, 7.5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let back: Settings = serde_json::from_str(r#"{"mesh":"ribbon"}"#).unwrap();
        assert_eq!(back.mesh, "ribbon");
        assert_eq!(back.mode, 0x110);
    }
}
