// field_scene_core/src/camera.rs

//! The camera model: which point of view is active and where it puts the
//! scene's camera node.

use crate::config::CameraConfig;
use crate::field::{Field, FieldSide, MountSelector};
use crate::scene::graph::SceneGraph;
use crate::transforms::{camera_pose, sky_camera_pose, CameraPose, Projection};
use crate::units::Angle;
use nalgebra::Matrix4;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The point of view a camera renders from.
///
/// Equality is component-wise, including all 16 entries of a custom
/// transform, so an unchanged custom view is recognised as such.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Perspective {
    /// Straight down from above the centre spot.
    #[default]
    Sky,
    /// Through one camera of one robot.
    Robot {
        side: FieldSide,
        index: usize,
        mount: MountSelector,
    },
    /// A caller-supplied world transform and field of view.
    Custom {
        h_fov: Angle,
        v_fov: Angle,
        transform: Matrix4<f64>,
    },
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perspective::Sky => write!(f, "sky"),
            Perspective::Robot { side, index, mount } => write!(f, "{}:{}:{}", side, index, mount),
            Perspective::Custom { h_fov, v_fov, .. } => write!(
                f,
                "custom ({:.1}x{:.1} deg)",
                h_fov.degrees(),
                v_fov.degrees()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerspectiveParseError {
    #[error("perspective '{0}' is neither 'sky' nor '<home|away>:<index>:<top|bottom>'")]
    Malformed(String),

    #[error("unknown side '{0}', expected 'home' or 'away'")]
    UnknownSide(String),

    #[error("robot index '{0}' is not a non-negative integer")]
    InvalidIndex(String),

    #[error("unknown camera '{0}', expected 'top' or 'bottom'")]
    UnknownMount(String),
}

impl FromStr for Perspective {
    type Err = PerspectiveParseError;

    /// Parses `sky` or `<home|away>:<index>:<top|bottom>`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        if text == "sky" {
            return Ok(Perspective::Sky);
        }

        let parts: Vec<&str> = text.split(':').collect();
        let [side, index, mount] = parts.as_slice() else {
            return Err(PerspectiveParseError::Malformed(s.to_string()));
        };

        let side = match *side {
            "home" => FieldSide::Home,
            "away" => FieldSide::Away,
            other => return Err(PerspectiveParseError::UnknownSide(other.to_string())),
        };
        let index = index
            .parse::<usize>()
            .map_err(|_| PerspectiveParseError::InvalidIndex(index.to_string()))?;
        let mount = match *mount {
            "top" => MountSelector::Top,
            "bottom" => MountSelector::Bottom,
            other => return Err(PerspectiveParseError::UnknownMount(other.to_string())),
        };

        Ok(Perspective::Robot { side, index, mount })
    }
}

/// Computes the camera pose for `perspective` against `field`.
///
/// An unlocalized robot has nowhere to look from, so its perspectives fall
/// back to the sky view.
///
/// # Panics
/// If a robot perspective names an index outside its side's roster.
pub fn resolve_camera_pose(
    perspective: &Perspective,
    field: &Field,
    config: &CameraConfig,
) -> CameraPose {
    match perspective {
        Perspective::Sky => sky_camera_pose(config.sky_height, config.near_plane),
        Perspective::Robot { side, index, mount } => {
            let robot = field.robot(*side, *index);
            match &robot.field_position {
                Some(coordinate) => {
                    let (mount, lens) = robot.camera(*mount);
                    camera_pose(coordinate, mount, lens, config.near_plane)
                }
                None => sky_camera_pose(config.sky_height, config.near_plane),
            }
        }
        Perspective::Custom {
            h_fov,
            v_fov,
            transform,
        } => CameraPose {
            transform: *transform,
            projection: Projection {
                h_fov: Some(*h_fov),
                v_fov: Some(*v_fov),
                near: config.near_plane,
            },
        },
    }
}

/// One camera node and the perspective it currently shows.
#[derive(Debug, Clone)]
pub struct FieldCamera<N> {
    node: N,
    perspective: Perspective,
    pose: CameraPose,
    config: CameraConfig,
}

impl<N: Copy> FieldCamera<N> {
    /// Creates a detached camera node showing `perspective`.
    pub fn new<G>(scene: &mut G, perspective: Perspective, field: &Field) -> Self
    where
        G: SceneGraph<Node = N> + ?Sized,
    {
        Self::with_config(scene, perspective, field, CameraConfig::default())
    }

    pub fn with_config<G>(
        scene: &mut G,
        perspective: Perspective,
        field: &Field,
        config: CameraConfig,
    ) -> Self
    where
        G: SceneGraph<Node = N> + ?Sized,
    {
        let node = scene.create_camera();
        let pose = resolve_camera_pose(&perspective, field, &config);
        scene.set_transform(node, &pose.transform);
        scene.set_projection(node, &pose.projection);
        Self {
            node,
            perspective,
            pose,
            config,
        }
    }

    /// Switches to `perspective` and recomputes the pose from `field`.
    ///
    /// The camera node is only written when the resulting pose differs from
    /// the one already applied.
    pub fn update<G>(&mut self, scene: &mut G, perspective: Perspective, field: &Field)
    where
        G: SceneGraph<Node = N> + ?Sized,
    {
        let pose = resolve_camera_pose(&perspective, field, &self.config);
        self.perspective = perspective;
        if pose == self.pose {
            return;
        }
        if pose.transform != self.pose.transform {
            scene.set_transform(self.node, &pose.transform);
        }
        if pose.projection != self.pose.projection {
            scene.set_projection(self.node, &pose.projection);
        }
        self.pose = pose;
    }

    pub fn node(&self) -> N {
        self.node
    }

    pub fn perspective(&self) -> &Perspective {
        &self.perspective
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CameraLens, CameraMount, RobotState};
    use crate::scene::memory::MemoryScene;
    use approx::assert_abs_diff_eq;

    fn robot_with_camera(localized: bool) -> RobotState {
        let mut robot = if localized {
            RobotState::nao_at(1.0, 2.0, Angle::ZERO)
        } else {
            RobotState::nao(None)
        };
        robot.top_mount = CameraMount {
            yaw: Angle::ZERO,
            pitch: Angle::ZERO,
            height: 0.5,
        };
        robot.top_lens = CameraLens {
            h_fov: Angle::from_degrees(60.0),
            v_fov: Angle::from_degrees(40.0),
            height: 0.1,
            vertical_direction: Angle::ZERO,
        };
        robot
    }

    fn home_top(index: usize) -> Perspective {
        Perspective::Robot {
            side: FieldSide::Home,
            index,
            mount: MountSelector::Top,
        }
    }

    #[test]
    fn localized_robot_camera_uses_its_lens() {
        let field = Field {
            home_robots: vec![robot_with_camera(true)],
            ..Default::default()
        };
        let pose = resolve_camera_pose(&home_top(0), &field, &CameraConfig::default());

        let position = pose.position();
        assert_abs_diff_eq!(position.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(position.y, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(position.z, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.projection.h_fov.unwrap().degrees(), 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.projection.v_fov.unwrap().degrees(), 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.projection.near, 0.3);
    }

    #[test]
    fn unlocalized_robot_falls_back_to_sky() {
        let field = Field {
            home_robots: vec![robot_with_camera(false)],
            ..Default::default()
        };
        let config = CameraConfig::default();
        let pose = resolve_camera_pose(&home_top(0), &field, &config);
        assert_eq!(pose, resolve_camera_pose(&Perspective::Sky, &field, &config));
        assert_eq!(pose.projection.h_fov, None);
    }

    #[test]
    #[should_panic(expected = "robot index 4 is out of range for the home roster")]
    fn out_of_range_robot_panics() {
        let field = Field {
            home_robots: vec![robot_with_camera(true)],
            ..Default::default()
        };
        resolve_camera_pose(&home_top(4), &field, &CameraConfig::default());
    }

    #[test]
    fn custom_perspective_is_taken_verbatim_and_compared_per_component() {
        let transform = Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 2.0, 3.0));
        let custom = Perspective::Custom {
            h_fov: Angle::from_degrees(50.0),
            v_fov: Angle::from_degrees(30.0),
            transform,
        };
        let pose = resolve_camera_pose(&custom, &Field::default(), &CameraConfig::default());
        assert_eq!(pose.transform, transform);

        let copy = custom;
        assert_eq!(custom, copy);
        let mut nudged = transform;
        nudged[(3, 1)] = 1e-9;
        let other = Perspective::Custom {
            h_fov: Angle::from_degrees(50.0),
            v_fov: Angle::from_degrees(30.0),
            transform: nudged,
        };
        assert_ne!(custom, other);
        let wider = Perspective::Custom {
            h_fov: Angle::from_degrees(51.0),
            v_fov: Angle::from_degrees(30.0),
            transform,
        };
        assert_ne!(custom, wider);
    }

    #[test]
    fn unchanged_pose_is_not_rewritten() {
        let mut scene = MemoryScene::default();
        let field = Field {
            home_robots: vec![robot_with_camera(true)],
            ..Default::default()
        };
        let mut camera = FieldCamera::new(&mut scene, home_top(0), &field);
        assert!(!scene.is_attached(camera.node()));
        scene.reset_stats();

        camera.update(&mut scene, home_top(0), &field);
        assert_eq!(scene.stats().transforms + scene.stats().projections, 0);

        camera.update(&mut scene, Perspective::Sky, &field);
        assert_eq!(scene.stats().transforms, 1);
        assert_eq!(scene.stats().projections, 1);
        assert_eq!(camera.perspective(), &Perspective::Sky);
    }

    #[test]
    fn parses_perspective_text() {
        assert_eq!("sky".parse::<Perspective>(), Ok(Perspective::Sky));
        assert_eq!(
            " Away:2:bottom ".parse::<Perspective>(),
            Ok(Perspective::Robot {
                side: FieldSide::Away,
                index: 2,
                mount: MountSelector::Bottom
            })
        );
        assert_eq!(home_top(3).to_string(), "home:3:top");
        assert_eq!("home:3:top".parse::<Perspective>(), Ok(home_top(3)));
        assert!(matches!(
            "left:0:top".parse::<Perspective>(),
            Err(PerspectiveParseError::UnknownSide(_))
        ));
        assert!(matches!(
            "home:-1:top".parse::<Perspective>(),
            Err(PerspectiveParseError::InvalidIndex(_))
        ));
        assert!(matches!(
            "home:0:side".parse::<Perspective>(),
            Err(PerspectiveParseError::UnknownMount(_))
        ));
        assert!(matches!(
            "overhead".parse::<Perspective>(),
            Err(PerspectiveParseError::Malformed(_))
        ));
    }
}
