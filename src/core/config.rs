//! Application configuration
//!
//! Loaded from a RON or JSON file. Every field has a default, so a partial
//! file (or no file at all) is valid.

use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Camera, lights and background
    pub view: ViewConfig,
    /// Spawner and physics tuning
    pub scene: SceneConfig,
}

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("Shapefall"),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Camera and lighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub ambient_intensity: f32,
    pub light_position: Vec3,
    pub light_intensity: f32,
    /// Background color (sRGB, 0..1)
    pub background: [f32; 3],
    /// Ground color (sRGB, 0..1)
    pub ground_color: [f32; 3],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            camera_position: Vec3::new(0.0, 8.0, 15.0),
            camera_target: Vec3::ZERO,
            fov_degrees: 60.0,
            ambient_intensity: 0.7,
            light_position: Vec3::new(10.0, 10.0, 10.0),
            light_intensity: 0.8,
            // #f0f0f0
            background: [0.941, 0.941, 0.941],
            // #dcdcdc
            ground_color: [0.863, 0.863, 0.863],
        }
    }
}

/// Which collider a shape gets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderFit {
    /// A box for every kind
    #[default]
    Box,
    /// A collider matching the visual geometry
    Geometry,
}

/// Spawner and physics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seconds between spawns while visible
    pub spawn_interval_secs: f32,
    /// Height new shapes appear at
    pub spawn_height: f32,
    /// Spawn x/z are uniform in `[-spawn_half_extent, spawn_half_extent)`
    pub spawn_half_extent: f32,
    pub gravity: Vec3,
    /// Height of the ground plane
    pub ground_height: f32,
    /// Side length of the visual ground plane
    pub ground_extent: f32,
    /// Uniform scale applied to every shape's geometry
    pub shape_scale: f32,
    pub shape_mass: f32,
    /// Upward force applied each frame while a shape is held
    pub lift_force: f32,
    pub collider_fit: ColliderFit,
    /// Longest single physics step in seconds
    pub max_physics_step: f32,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spawn_interval_secs: 3.0,
            spawn_height: 10.0,
            spawn_half_extent: 2.0,
            gravity: Vec3::new(0.0, -2.0, 0.0),
            ground_height: -10.0,
            ground_extent: 1000.0,
            shape_scale: 2.0,
            shape_mass: 1.0,
            lift_force: 8.0,
            collider_fit: ColliderFit::Box,
            max_physics_step: 1.0 / 30.0,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Spawn cadence as a duration
    ///
    /// Saturates at `Duration::MAX` for values no `Duration` can hold;
    /// `validate` rejects those.
    pub fn spawn_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.spawn_interval_secs).unwrap_or(Duration::MAX)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("spawn_interval_secs", self.spawn_interval_secs),
            ("ground_extent", self.ground_extent),
            ("shape_scale", self.shape_scale),
            ("shape_mass", self.shape_mass),
            ("max_physics_step", self.max_physics_step),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }

        if let Err(err) = Duration::try_from_secs_f32(self.spawn_interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "spawn_interval_secs {} is not a valid duration: {err}",
                self.spawn_interval_secs
            )));
        }

        let finite = [
            ("lift_force", self.lift_force),
            ("spawn_height", self.spawn_height),
            ("ground_height", self.ground_height),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be finite, got {value}"
                )));
            }
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }

        if !self.spawn_half_extent.is_finite() || self.spawn_half_extent < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "spawn_half_extent must be non-negative, got {}",
                self.spawn_half_extent
            )));
        }

        if self.spawn_height <= self.ground_height {
            return Err(ConfigError::Invalid(format!(
                "spawn_height ({}) must be above ground_height ({})",
                self.spawn_height, self.ground_height
            )));
        }

        Ok(())
    }
}

impl AppConfig {
    /// Load from a `.ron` or `.json` file, picked by extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron(&content)?,
            Some("json") => Self::from_json(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate RON text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.scene.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.scene.validate()?;
        Ok(config)
    }

    /// Render as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// RON/JSON syntax or type error
    Parse(String),
    /// File extension is neither `ron` nor `json`
    UnsupportedFormat(String),
    /// Value out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported config format: {ext:?}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.scene.validate().is_ok());
        assert_eq!(config.scene.spawn_interval(), Duration::from_secs(3));
        assert_eq!(config.scene.gravity, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = AppConfig::from_ron("(scene: (lift_force: 12.0, seed: Some(7)))").unwrap();

        assert!((config.scene.lift_force - 12.0).abs() < f32::EPSILON);
        assert_eq!(config.scene.seed, Some(7));
        assert_eq!(config.scene.spawn_height, 10.0);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = AppConfig::default();
        config.scene.collider_fit = ColliderFit::Geometry;

        let text = config.to_ron().unwrap();
        let loaded = AppConfig::from_ron(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_config() {
        let config =
            AppConfig::from_json(r#"{"window": {"title": "Demo"}, "scene": {"shape_scale": 3.0}}"#)
                .unwrap();

        assert_eq!(config.window.title, "Demo");
        assert!((config.scene.shape_scale - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = AppConfig::from_ron("(scene: (spawn_interval_secs: 0.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_interval_too_long_for_duration() {
        let scene = SceneConfig {
            spawn_interval_secs: 1e30,
            ..Default::default()
        };
        assert!(matches!(scene.validate(), Err(ConfigError::Invalid(_))));
        assert_eq!(scene.spawn_interval(), Duration::MAX);
    }

    #[test]
    fn test_rejects_non_finite_forces() {
        let gravity = SceneConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
            ..Default::default()
        };
        assert!(matches!(gravity.validate(), Err(ConfigError::Invalid(_))));

        let lift = SceneConfig {
            lift_force: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(lift.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_spawn_below_ground() {
        let scene = SceneConfig {
            spawn_height: -20.0,
            ..Default::default()
        };
        assert!(matches!(scene.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_collider_fit_is_parse_error() {
        let err = AppConfig::from_ron("(scene: (collider_fit: Capsule))").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("shapefall_config_test.toml");
        fs::write(&path, "").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));

        let _ = fs::remove_file(path);
    }
}
