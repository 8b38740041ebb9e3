//! Viewer configuration
//!
//! All tunables for interaction feel and presentation, with compiled-in
//! defaults and optional JSON persistence.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::ControllerSettings;

/// Viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial window width in logical pixels
    pub window_width: u32,
    /// Initial window height in logical pixels
    pub window_height: u32,
    /// Degrees of rotation per pixel of drag
    pub drag_sensitivity: f32,
    /// Longitude drift per frame while idle, degrees
    pub auto_rotate_step: f32,
    /// Seconds between drag release and drift resuming
    pub cooldown_secs: f32,
    /// Initial vertical field of view, degrees
    pub fov_deg: f32,
    /// Narrowest allowed field of view
    pub min_fov_deg: f32,
    /// Widest allowed field of view
    pub max_fov_deg: f32,
    /// Field of view change per wheel line, degrees
    pub wheel_zoom_step: f32,
    /// Sphere segments around the equator
    pub sphere_segments: u32,
    /// Sphere rings pole to pole
    pub sphere_rings: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            drag_sensitivity: 0.1,
            auto_rotate_step: 0.1,
            cooldown_secs: 5.0,
            fov_deg: 75.0,
            min_fov_deg: 30.0,
            max_fov_deg: 120.0,
            wheel_zoom_step: 5.0,
            sphere_segments: 60,
            sphere_rings: 40,
        }
    }
}

impl ViewerConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Interaction constants for the orbit controller
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            sensitivity_deg_per_px: self.drag_sensitivity,
            auto_rotate_step_deg: self.auto_rotate_step,
            cooldown: Duration::from_secs_f32(self.cooldown_secs.max(0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ViewerConfig::default();
        assert_eq!(config.drag_sensitivity, 0.1);
        assert_eq!(config.auto_rotate_step, 0.1);
        assert_eq!(config.cooldown_secs, 5.0);
        assert!(config.min_fov_deg < config.fov_deg);
        assert!(config.fov_deg < config.max_fov_deg);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: ViewerConfig = serde_json::from_str(r#"{"fov_deg": 90.0}"#).unwrap();
        assert_eq!(config.fov_deg, 90.0);
        assert_eq!(config.sphere_segments, ViewerConfig::default().sphere_segments);
    }

    #[test]
    fn test_controller_settings_conversion() {
        let settings = ViewerConfig::default().controller_settings();
        assert_eq!(settings.cooldown, Duration::from_secs(5));
        assert_eq!(settings.sensitivity_deg_per_px, 0.1);
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(ViewerConfig::load(Path::new("/nonexistent/viewer.json")).is_err());
    }
}
