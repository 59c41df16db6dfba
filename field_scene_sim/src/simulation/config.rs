// field_scene_sim/src/simulation/config.rs

use bevy::prelude::Resource;
use field_scene_core::camera::Perspective;
use field_scene_core::config::SceneConfig;
use field_scene_core::field::Field;
use field_scene_core::render::Antialiasing;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::simulation::error::SimError;
use crate::simulation::utils::serde_helpers;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The primary Bevy resource holding everything needed to play back a match.
/// This struct is the root of the data parsed from a `scenario.toml` file.
#[derive(Resource, Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    /// Pitch layout and scene constants.
    #[serde(default)]
    pub scene: SceneConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    // The TOML has `[[frames]]`, which becomes a Vec of field snapshots.
    #[serde(default)]
    pub frames: Vec<Field>,
}

impl ScenarioConfig {
    /// The snapshot the scene is built from. An empty timeline shows an empty
    /// pitch.
    pub fn first_frame(&self) -> Field {
        self.frames.first().cloned().unwrap_or_default()
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Time each snapshot stays on screen.
    #[serde(with = "serde_helpers::duration_from_secs_f32")]
    pub frame_interval_seconds: Duration,
    /// How long robots and the ball take to glide to their next pose.
    #[serde(with = "serde_helpers::duration_from_secs_f32")]
    pub transition_seconds: Duration,
    /// Start over after the last snapshot.
    pub looping: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_seconds: Duration::from_millis(500),
            transition_seconds: Duration::from_millis(250),
            looping: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    #[serde(with = "serde_helpers::perspective_from_str")]
    pub perspective: Perspective,
    pub antialiasing: Antialiasing,
    /// Bevy lumens per unit of field light intensity.
    pub lumens_per_intensity: f32,
    /// Directory holding `models/<name>.glb`, as seen by Bevy's asset server.
    pub asset_root: PathBuf,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            perspective: Perspective::Sky,
            antialiasing: Antialiasing::Multisample4x,
            lumens_per_intensity: 1000.0,
            asset_root: PathBuf::from("assets"),
            window_width: 1920.0,
            window_height: 1080.0,
        }
    }
}

// =========================================================================
// == Loading ==
// =========================================================================

/// Loads a scenario file.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    if !path.is_file() {
        return Err(SimError::MissingScenario(path.to_path_buf()));
    }
    extract(Figment::new().merge(Toml::file(path)), path)
}

fn extract(figment: Figment, path: &Path) -> Result<ScenarioConfig, SimError> {
    figment.extract().map_err(|source| SimError::Config {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}
