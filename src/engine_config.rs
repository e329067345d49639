use log::{debug, info, warn};
use std::fs;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::{geometry_utils::SurfaceGeometry, scene::SceneElement};

/// Which recognizer gesture labels drive which interaction. `drag` and `pan_zoom`
/// may share a label; where the gesture starts then decides which one it is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GestureBindings {
    pub pointer: String,
    pub select: String,
    pub area: String,
    pub drag: String,
    pub pan_zoom: String,
}

impl Default for GestureBindings {
    fn default() -> Self {
        GestureBindings {
            pointer: String::from("point"),
            select: String::from("pinch-select"),
            area: String::from("area-grab"),
            drag: String::from("fist"),
            pan_zoom: String::from("fist"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub gestures: GestureBindings,

    /// Max time (ms) between the select gesture and relaxing back to the pointer
    /// gesture, for this to count as a select
    pub click_window_ms: u64,

    // -------- VIEW TRANSFORM SETTINGS
    pub min_scale: f32,
    pub max_scale: f32,

    /// How far (px) the remaining hand must move after a two-to-one hand handoff
    /// before panning resumes
    pub handoff_threshold_px: f32,

    // -------- HOVER SETTINGS
    /// Samples per axis across the area-hover circle
    pub area_grid_size: usize,

    /// Hands reported below this confidence are ignored, as if not present
    pub min_confidence: f32,

    pub surface: SurfaceGeometry,

    /// Static scene for `RectScene`, in viewport coordinates
    pub elements: Option<Vec<SceneElement>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            gestures: GestureBindings::default(),
            click_window_ms: 200,
            min_scale: 0.5,
            max_scale: 8.,
            handoff_threshold_px: 10.,
            area_grid_size: 8,
            min_confidence: 0.,
            surface: SurfaceGeometry::default(),
            elements: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_scale > 0.) || !(self.max_scale >= self.min_scale) {
            return Err(anyhow!(
                "Invalid scale bounds [{}, {}]",
                self.min_scale,
                self.max_scale
            ));
        }
        if self.click_window_ms == 0 {
            return Err(anyhow!("Click window must be above 0 ms"));
        }
        if self.area_grid_size == 0 {
            return Err(anyhow!("Area grid size must be at least 1"));
        }
        if !(self.surface.width > 0.) || !(self.surface.height > 0.) {
            return Err(anyhow!(
                "Invalid surface size {}x{}",
                self.surface.width,
                self.surface.height
            ));
        }
        if !(self.handoff_threshold_px >= 0.) {
            return Err(anyhow!("Handoff threshold must not be negative"));
        }
        let GestureBindings {
            pointer,
            select,
            area,
            drag,
            pan_zoom,
        } = &self.gestures;
        if [pointer, select, area, drag, pan_zoom]
            .iter()
            .any(|label| label.is_empty())
        {
            return Err(anyhow!("Gesture labels must not be empty"));
        }
        Ok(())
    }

    pub fn elements(&self) -> &[SceneElement] {
        self.elements.as_deref().unwrap_or_default()
    }

    pub fn write_config_to_file(&self, config_file_path: &str) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(config_file_path, text)
            .map_err(|e| anyhow!("Error writing config to {}: {}", config_file_path, e))?;
        info!("Wrote config to file: {:?}", config_file_path);
        Ok(())
    }
}

pub fn load_config_from_file(config_file_path: &str) -> Result<EngineConfig> {
    match fs::read_to_string(config_file_path) {
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                warn!(
                    "Engine config file not found at {}, will use defaults",
                    &config_file_path
                );
                Ok(EngineConfig::default())
            } else {
                Err(anyhow!(
                    "Failed to load engine config from {}: {}",
                    config_file_path,
                    e
                ))
            }
        }
        Ok(s) => {
            info!("Loaded engine config OK from \"{}\"", config_file_path);
            match serde_json::from_str::<EngineConfig>(&s) {
                Ok(loaded_config) => {
                    debug!("Config parsed data from file: {:?}", &loaded_config);
                    Ok(loaded_config)
                }
                Err(e) => Err(anyhow!("Failed to parse config data: {}", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.click_window_ms, 200);
        assert_eq!(config.gestures.drag, config.gestures.pan_zoom);
        assert!(config.elements().is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "clickWindowMs": 300,
                "gestures": {"pointer": "Pointing_Up", "select": "pinch",
                             "area": "Open_Palm", "drag": "ok", "panZoom": "Closed_Fist"},
                "elements": [{"id": 1, "x": 0, "y": 0, "width": 10, "height": 10}]
            }"#,
        )
        .unwrap();
        assert_eq!(config.click_window_ms, 300);
        assert_eq!(config.max_scale, 8.);
        assert_eq!(config.gestures.pan_zoom, "Closed_Fist");
        assert_eq!(config.elements().len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid() {
        let mut config = EngineConfig {
            min_scale: 4.,
            max_scale: 2.,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_scale = 8.;
        config.gestures.select = String::new();
        assert!(config.validate().is_err());

        let config = EngineConfig {
            area_grid_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config_from_file("./definitely/not/here.json").unwrap();
        assert_eq!(config.min_scale, 0.5);
    }

    #[test]
    fn test_write_and_reload() {
        let path = std::env::temp_dir().join("gesture_engine_config_test.json");
        let path = path.to_string_lossy().to_string();
        let config = EngineConfig {
            click_window_ms: 150,
            ..Default::default()
        };
        config.write_config_to_file(&path).unwrap();
        let loaded = load_config_from_file(&path).unwrap();
        assert_eq!(loaded.click_window_ms, 150);
        let _ = fs::remove_file(&path);
    }
}
