// field_scene_core/src/field.rs

//! The field coordinate model: pure data describing where robots, their cameras
//! and the ball are, expressed in the pitch's own reference frame.
//!
//! Lengths are metres. The field frame has `x` along the long axis and `y` along
//! the short axis; headings are measured in that plane.

use crate::units::{Angle, Heading};
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================================
// == Poses on the field plane ==
// =========================================================================

/// A point on the field plane, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartesianPosition {
    pub x: f64,
    pub y: f64,
}

impl CartesianPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rigid 2D pose on the field.
///
/// Equality is exact value equality. The scene synchronizer relies on it to skip
/// node writes for robots that did not move.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldCoordinate {
    pub position: CartesianPosition,
    pub heading: Heading,
}

impl FieldCoordinate {
    pub const fn new(position: CartesianPosition, heading: Heading) -> Self {
        Self { position, heading }
    }
}

// =========================================================================
// == Camera geometry ==
// =========================================================================

/// Fixed offset of a camera pivot relative to the robot's body origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraMount {
    pub yaw: Angle,
    pub pitch: Angle,
    /// Height of the pivot above the robot's body origin.
    pub height: f64,
}

/// Optical properties of one camera relative to its mount.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraLens {
    pub h_fov: Angle,
    pub v_fov: Angle,
    /// Height of the lens above its mount pivot.
    pub height: f64,
    /// Downward tilt of the optical axis relative to the mount.
    pub vertical_direction: Angle,
}

/// Which of a robot's two cameras to look through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountSelector {
    Top,
    Bottom,
}

impl fmt::Display for MountSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountSelector::Top => write!(f, "top"),
            MountSelector::Bottom => write!(f, "bottom"),
        }
    }
}

// --- NAO V5 head geometry ---
const NAO_HEAD_PIVOT_HEIGHT: f64 = 0.417;
const NAO_H_FOV_DEGREES: f64 = 60.97;
const NAO_V_FOV_DEGREES: f64 = 47.64;
const NAO_TOP_LENS_HEIGHT: f64 = 0.06364;
const NAO_TOP_LENS_TILT_DEGREES: f64 = 1.2;
const NAO_BOTTOM_LENS_HEIGHT: f64 = 0.01774;
const NAO_BOTTOM_LENS_TILT_DEGREES: f64 = 39.7;

fn nao_mount() -> CameraMount {
    CameraMount {
        yaw: Angle::ZERO,
        pitch: Angle::ZERO,
        height: NAO_HEAD_PIVOT_HEIGHT,
    }
}

fn nao_top_lens() -> CameraLens {
    CameraLens {
        h_fov: Angle::from_degrees(NAO_H_FOV_DEGREES),
        v_fov: Angle::from_degrees(NAO_V_FOV_DEGREES),
        height: NAO_TOP_LENS_HEIGHT,
        vertical_direction: Angle::from_degrees(NAO_TOP_LENS_TILT_DEGREES),
    }
}

fn nao_bottom_lens() -> CameraLens {
    CameraLens {
        h_fov: Angle::from_degrees(NAO_H_FOV_DEGREES),
        v_fov: Angle::from_degrees(NAO_V_FOV_DEGREES),
        height: NAO_BOTTOM_LENS_HEIGHT,
        vertical_direction: Angle::from_degrees(NAO_BOTTOM_LENS_TILT_DEGREES),
    }
}

// =========================================================================
// == Robots and ball ==
// =========================================================================

/// Telemetry for one robot on the pitch.
///
/// Every robot carries exactly two cameras (top and bottom). A robot without a
/// `field_position` is not localized and must not be drawn anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotState {
    pub field_position: Option<FieldCoordinate>,
    pub top_mount: CameraMount,
    pub top_lens: CameraLens,
    pub bottom_mount: CameraMount,
    pub bottom_lens: CameraLens,
}

impl RobotState {
    /// A NAO V5 with its stock head camera geometry.
    pub fn nao(field_position: Option<FieldCoordinate>) -> Self {
        Self {
            field_position,
            top_mount: nao_mount(),
            top_lens: nao_top_lens(),
            bottom_mount: nao_mount(),
            bottom_lens: nao_bottom_lens(),
        }
    }

    /// A localized NAO at `(x, y)` facing `heading`.
    pub fn nao_at(x: f64, y: f64, heading: Heading) -> Self {
        Self::nao(Some(FieldCoordinate::new(
            CartesianPosition::new(x, y),
            heading,
        )))
    }

    pub fn is_localized(&self) -> bool {
        self.field_position.is_some()
    }

    /// The mount and lens of the selected camera.
    pub fn camera(&self, selector: MountSelector) -> (&CameraMount, &CameraLens) {
        match selector {
            MountSelector::Top => (&self.top_mount, &self.top_lens),
            MountSelector::Bottom => (&self.bottom_mount, &self.bottom_lens),
        }
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self::nao(None)
    }
}

/// Ball orientation as roll/pitch/yaw.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BallOrientation {
    pub roll: Angle,
    pub pitch: Angle,
    pub yaw: Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BallState {
    pub position: CartesianPosition,
    /// Height of the ball's centre above its resting height.
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub orientation: BallOrientation,
}

impl BallState {
    pub fn on_ground(x: f64, y: f64) -> Self {
        Self {
            position: CartesianPosition::new(x, y),
            ..Default::default()
        }
    }
}

// =========================================================================
// == Field snapshot ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSide {
    Home,
    Away,
}

impl fmt::Display for FieldSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSide::Home => write!(f, "home"),
            FieldSide::Away => write!(f, "away"),
        }
    }
}

pub const DEFAULT_LIGHT_INTENSITY: f64 = 6000.0;

fn default_light_intensity() -> f64 {
    DEFAULT_LIGHT_INTENSITY
}

/// The authoritative snapshot consumed once per update tick.
///
/// The index of a robot in `home_robots` / `away_robots` is its identity in the
/// scene: index `i` in consecutive snapshots maps onto the same scene node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    #[serde(default)]
    pub home_robots: Vec<RobotState>,
    #[serde(default)]
    pub away_robots: Vec<RobotState>,
    #[serde(default)]
    pub ball: Option<BallState>,
    #[serde(default = "default_light_intensity")]
    pub light_intensity: f64,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            home_robots: Vec::new(),
            away_robots: Vec::new(),
            ball: None,
            light_intensity: DEFAULT_LIGHT_INTENSITY,
        }
    }
}

impl Field {
    /// The ordered roster of one side.
    pub fn robots(&self, side: FieldSide) -> &[RobotState] {
        match side {
            FieldSide::Home => &self.home_robots,
            FieldSide::Away => &self.away_robots,
        }
    }

    /// Looks up a robot by side and roster index.
    ///
    /// # Panics
    /// If `index` is outside the roster. The caller owns both the roster and the
    /// index it asks for, so an out-of-range request is a bug on their side.
    pub fn robot(&self, side: FieldSide, index: usize) -> &RobotState {
        let robots = self.robots(side);
        assert!(
            index < robots.len(),
            "robot index {} is out of range for the {} roster ({} robots)",
            index,
            side,
            robots.len()
        );
        &robots[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn field_coordinate_equality_is_exact() {
        let a = FieldCoordinate::new(CartesianPosition::new(1.0, 2.0), Angle::from_degrees(30.0));
        let mut b = a;
        assert_eq!(a, b);

        b.position.x += 1e-12;
        assert_ne!(a, b);
    }

    #[test]
    fn camera_selector_picks_matching_mount_and_lens() {
        let robot = RobotState::nao(None);
        let (_, top) = robot.camera(MountSelector::Top);
        let (_, bottom) = robot.camera(MountSelector::Bottom);
        assert_abs_diff_eq!(top.vertical_direction.degrees(), 1.2, epsilon = 1e-9);
        assert_abs_diff_eq!(bottom.vertical_direction.degrees(), 39.7, epsilon = 1e-9);
    }

    #[test]
    fn robot_lookup_by_side() {
        let field = Field {
            home_robots: vec![RobotState::nao_at(1.0, 0.0, Angle::ZERO)],
            away_robots: vec![RobotState::default(), RobotState::nao_at(-1.0, 0.0, Angle::ZERO)],
            ..Default::default()
        };
        assert!(field.robot(FieldSide::Home, 0).is_localized());
        assert!(!field.robot(FieldSide::Away, 0).is_localized());
        assert!(field.robot(FieldSide::Away, 1).is_localized());
    }

    #[test]
    #[should_panic(expected = "robot index 3 is out of range for the away roster")]
    fn robot_lookup_out_of_range_panics() {
        let field = Field::default();
        field.robot(FieldSide::Away, 3);
    }
}
