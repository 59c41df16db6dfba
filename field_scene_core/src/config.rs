// field_scene_core/src/config.rs

use serde::{Deserialize, Serialize};

/// Logical asset names requested from the asset provider.
pub const FIELD_ASSET: &str = "field";
pub const GOAL_ASSET: &str = "goal";
pub const BALL_ASSET: &str = "ball";

// =========================================================================
// == Scene Configuration ==
// =========================================================================

/// Every constant the scene needs to lay out the pitch and place entities.
///
/// The defaults reproduce the standard SPL pitch layout; scenario files may
/// override any field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Mesh used for every robot on both sides.
    pub robot_model: RobotModel,
    /// Height at which a robot mesh's origin sits above the pitch.
    pub robot_ground_offset: f64,
    /// Height of the ball's centre when it rests on the pitch.
    pub ball_radius: f64,
    /// Height of the goal meshes' origin above the pitch.
    pub goal_ground_offset: f64,
    /// Distance of each goal from the centre of the pitch, along scene X.
    pub goal_distance: f64,
    pub lighting: LightingConfig,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            robot_model: RobotModel::Nao,
            robot_ground_offset: 0.101,
            ball_radius: 0.144,
            goal_ground_offset: 0.101,
            goal_distance: 4.55,
            lighting: LightingConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotModel {
    #[default]
    Nao,
}

impl RobotModel {
    /// The logical asset name of this model's mesh.
    pub fn asset_name(self) -> &'static str {
        match self {
            RobotModel::Nao => "nao",
        }
    }
}

/// Omni lights hung above the pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightingConfig {
    /// `(x, z)` scene coordinates of each light.
    pub positions: Vec<[f64; 2]>,
    pub height: f64,
    pub attenuation_start: f64,
    pub attenuation_end: f64,
    pub attenuation_falloff_exponent: f64,
    pub casts_shadow: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            positions: vec![
                [0.0, 0.0],
                [4.0, 2.5],
                [-4.0, 2.5],
                [4.0, -2.5],
                [-4.0, -2.5],
            ],
            height: 10.0,
            attenuation_start: 0.0,
            attenuation_end: 20.0,
            attenuation_falloff_exponent: 4.0,
            casts_shadow: true,
        }
    }
}

/// Constants shared by every camera perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Height of the overhead camera above the centre spot.
    pub sky_height: f64,
    /// Near clipping plane distance.
    pub near_plane: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sky_height: 8.0,
            near_plane: 0.3,
        }
    }
}
