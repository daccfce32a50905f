//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Gravity-well constants shared by the field model and the grid shader.
    pub gravity: GravityConfig,
    /// Orbital constants for the earth and moon.
    pub orbit: OrbitConfig,
    /// Gravity grid mesh and line styling.
    pub grid: GridConfig,
    /// Player spacecraft settings.
    pub spacecraft: SpacecraftConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Background clear color (linear RGB).
    pub clear_color: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Emit a scene summary every N frames (0 disables it).
    pub frame_log_interval: u64,
}

/// Constants of the gravity-well displacement field.
///
/// `falloff` is a visual tuning knob with no physical meaning; it only keeps
/// the dip finite directly under a mass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GravityConfig {
    /// Pseudo-gravitational constant used for the grid dip.
    pub g: f32,
    /// Sun mass in scene units.
    pub sun_mass: f32,
    /// Earth mass in scene units.
    pub earth_mass: f32,
    /// Softening term added to the squared distance.
    pub falloff: f32,
}

/// Orbital constants. Angular rates are derived once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbitConfig {
    /// Orbital pseudo-gravitational constant.
    pub g_orbit: f64,
    /// Earth orbit radius around the sun.
    pub earth_orbit_radius: f64,
    /// Moon orbit radius around the earth.
    pub moon_orbit_radius: f64,
    /// Height of the orbital plane.
    pub orbit_height: f64,
    /// Earth axial spin in radians per second (cosmetic).
    pub earth_spin_rate: f64,
    /// Rendered sun radius.
    pub sun_radius: f32,
    /// Rendered earth radius.
    pub earth_radius: f32,
    /// Rendered moon radius.
    pub moon_radius: f32,
}

/// Gravity grid mesh and line styling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of the square grid plane.
    pub size: f32,
    /// Quads per side. Higher values give a smoother dip at higher vertex cost.
    pub subdivisions: u32,
    /// World distance between grid lines.
    pub line_spacing: f32,
    /// Distance from the reference point where fading begins.
    pub fade_start: f32,
    /// Distance from the reference point where the grid is fully transparent.
    pub fade_end: f32,
    /// Peak grid opacity.
    pub opacity: f32,
    /// Line color (linear RGB).
    pub color: [f32; 3],
}

/// Player spacecraft configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpacecraftConfig {
    /// Optional hull description file (RON). `None` uses the built-in hull.
    pub hull_path: Option<PathBuf>,
    /// Spawn position in world space.
    pub spawn_position: [f32; 3],
    /// Chase camera distance behind the ship.
    pub chase_distance: f32,
    /// Chase camera height above the ship.
    pub chase_height: f32,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.01],
            fov_y_degrees: 60.0,
            near: 0.5,
            far: 20_000.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frame_log_interval: 600,
        }
    }
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            g: 9.8,
            sun_mass: 1.9885e5,
            earth_mass: 5.972e3,
            falloff: 10.0,
        }
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            g_orbit: 0.2,
            earth_orbit_radius: 400.0,
            moon_orbit_radius: 40.0,
            orbit_height: 0.0,
            earth_spin_rate: 0.5,
            sun_radius: 50.0,
            earth_radius: 10.0,
            moon_radius: 2.7,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 2000.0,
            subdivisions: 400,
            line_spacing: 20.0,
            fade_start: 300.0,
            fade_end: 900.0,
            opacity: 0.45,
            color: [0.25, 0.55, 1.0],
        }
    }
}

impl Default for SpacecraftConfig {
    fn default() -> Self {
        Self {
            hull_path: None,
            spawn_position: [0.0, 60.0, 600.0],
            chase_distance: 30.0,
            chase_height: 8.0,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Check the settings that belong to the window and camera.
    ///
    /// Scene constants (radii, masses, falloff, fade range) are checked by the
    /// crates that own them when the scene is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window.width/height",
                reason: "window dimensions must be non-zero".to_string(),
            });
        }
        if !(self.render.near > 0.0 && self.render.far > self.render.near) {
            return Err(ConfigError::Invalid {
                field: "render.near/far",
                reason: format!(
                    "expected 0 < near < far, got near={} far={}",
                    self.render.near, self.render.far
                ),
            });
        }
        if !(self.render.fov_y_degrees > 0.0 && self.render.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "render.fov_y_degrees",
                reason: format!("{} is outside (0, 180)", self.render.fov_y_degrees),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("falloff: 10.0"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), gravity: (falloff: 15.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.gravity.falloff, 15.0);
        assert_eq!(config.gravity.g, 9.8);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_scene_constants() {
        let config = Config::default();
        assert_eq!(config.gravity.sun_mass, 1.9885e5);
        assert_eq!(config.orbit.g_orbit, 0.2);
        assert_eq!(config.orbit.earth_orbit_radius, 400.0);
        assert!(config.grid.fade_start < config.grid.fade_end);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.grid.subdivisions = 128;
        config.spacecraft.hull_path = Some(PathBuf::from("hull.ron"));

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.gravity.falloff = 20.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().gravity.falloff, 20.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.window.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "window.width/height", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_clip_planes() {
        let mut config = Config::default();
        config.render.near = 100.0;
        config.render.far = 10.0;
        assert!(config.validate().is_err());
    }
}
