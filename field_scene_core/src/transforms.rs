// field_scene_core/src/transforms.rs

//! Field-frame to scene-frame conversions.
//!
//! The scene is Y-up. Its forward (Z) axis runs along the field's long axis, so
//! field `x` becomes scene `z` and field `y` becomes scene `x`. The height of
//! an entity above the pitch is not part of its field pose; it is a per-kind
//! ground offset supplied by the caller.

use crate::field::{BallState, CameraLens, CameraMount, CartesianPosition, FieldCoordinate};
use crate::units::{Angle, Heading};
use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3};

// =========================================================================
// == Scene Pose Types ==
// =========================================================================

/// Position and orientation of a node in the scene frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePose {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

/// Perspective projection parameters for a camera node.
///
/// `None` fields of view leave the choice to the renderer's own default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Projection {
    pub h_fov: Option<Angle>,
    pub v_fov: Option<Angle>,
    pub near: f64,
}

/// Full state of a camera node: its world transform and its projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub transform: Matrix4<f64>,
    pub projection: Projection,
}

impl CameraPose {
    /// Translation part of the camera transform.
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(
            self.transform[(0, 3)],
            self.transform[(1, 3)],
            self.transform[(2, 3)],
        )
    }
}

// =========================================================================
// == Entity Placement ==
// =========================================================================

/// Maps a field-plane position into the scene at the given height.
pub fn world_position(position: &CartesianPosition, ground_offset: f64) -> Vector3<f64> {
    Vector3::new(position.y, ground_offset, position.x)
}

/// World yaw of a mesh whose forward axis is a quarter turn from the field's
/// heading convention.
pub fn world_yaw(heading: Heading) -> Angle {
    heading - Angle::QUARTER_TURN
}

/// Builds an orientation from scene Euler angles.
///
/// Rotations apply roll (Z) first, then yaw (Y), then pitch (X).
pub fn scene_rotation(x: Angle, y: Angle, z: Angle) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x.radians())
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y.radians())
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z.radians())
}

/// Scene pose of a robot mesh standing at `coordinate`.
pub fn robot_pose(coordinate: &FieldCoordinate, ground_offset: f64) -> ScenePose {
    ScenePose {
        position: world_position(&coordinate.position, ground_offset),
        rotation: scene_rotation(Angle::ZERO, world_yaw(coordinate.heading), Angle::ZERO),
    }
}

/// Scene pose of the ball. Unlike robots the ball keeps all three axes of its
/// orientation.
pub fn ball_pose(ball: &BallState, radius: f64) -> ScenePose {
    let orientation = &ball.orientation;
    ScenePose {
        position: world_position(&ball.position, radius + ball.height),
        rotation: scene_rotation(orientation.roll, orientation.yaw, orientation.pitch),
    }
}

// =========================================================================
// == Camera Placement ==
// =========================================================================

/// Pose and projection of a robot-mounted camera.
///
/// Mount and lens heights stack. Yaw is the robot heading plus the mount yaw,
/// turned half a revolution so the camera looks down the field. Pitch is the
/// mount pitch plus the lens tilt and does not depend on the heading.
pub fn camera_pose(
    coordinate: &FieldCoordinate,
    mount: &CameraMount,
    lens: &CameraLens,
    near_plane: f64,
) -> CameraPose {
    let position = world_position(&coordinate.position, mount.height + lens.height);
    let yaw = coordinate.heading + mount.yaw + Angle::HALF_TURN;
    let pitch = mount.pitch + lens.vertical_direction;

    // Positive pitch tilts the optical axis towards the pitch.
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw.radians())
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -pitch.radians());

    CameraPose {
        transform: Isometry3::from_parts(Translation3::from(position), rotation).to_homogeneous(),
        projection: Projection {
            h_fov: Some(lens.h_fov),
            v_fov: Some(lens.v_fov),
            near: near_plane,
        },
    }
}

/// The fixed overhead view: above the centre spot, looking straight down, with
/// the renderer's default field of view.
pub fn sky_camera_pose(height: f64, near_plane: f64) -> CameraPose {
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -Angle::QUARTER_TURN.radians());
    CameraPose {
        transform: Isometry3::from_parts(Translation3::new(0.0, height, 0.0), rotation)
            .to_homogeneous(),
        projection: Projection {
            h_fov: None,
            v_fov: None,
            near: near_plane,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BallOrientation;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    fn assert_vector3_approx_eq(v1: &Vector3<f64>, v2: &Vector3<f64>) {
        assert_abs_diff_eq!(v1.x, v2.x, epsilon = EPSILON);
        assert_abs_diff_eq!(v1.y, v2.y, epsilon = EPSILON);
        assert_abs_diff_eq!(v1.z, v2.z, epsilon = EPSILON);
    }

    fn assert_quat_approx_eq(q1: &UnitQuaternion<f64>, q2: &UnitQuaternion<f64>) {
        let angle_diff = q1.angle_to(q2);
        assert!(
            angle_diff.abs() < 1e-7,
            "UnitQuaternions not approx equal. q1: {:?}, q2: {:?}, angle_diff: {}",
            q1.coords,
            q2.coords,
            angle_diff
        );
    }

    /// Cameras look down their local -Z axis.
    fn forward(transform: &Matrix4<f64>) -> Vector3<f64> {
        transform.fixed_view::<3, 3>(0, 0) * Vector3::new(0.0, 0.0, -1.0)
    }

    #[test]
    fn field_axes_swap_into_scene() {
        let position = CartesianPosition::new(1.0, 2.0);
        let world = world_position(&position, 0.101);
        assert_vector3_approx_eq(&world, &Vector3::new(2.0, 0.101, 1.0));
    }

    #[test]
    fn world_yaw_is_heading_minus_quarter_turn() {
        for degrees in [-180.0, -90.0, 0.0, 45.0, 90.0, 135.0, 270.0] {
            let heading = Angle::from_degrees(degrees);
            assert_abs_diff_eq!(world_yaw(heading).degrees(), degrees - 90.0, epsilon = EPSILON);

            let pose = robot_pose(
                &FieldCoordinate::new(CartesianPosition::new(0.0, 0.0), heading),
                0.101,
            );
            let expected = UnitQuaternion::from_axis_angle(
                &Vector3::y_axis(),
                (degrees - 90.0_f64).to_radians(),
            );
            assert_quat_approx_eq(&pose.rotation, &expected);
        }
    }

    #[test]
    fn robot_pose_uses_ground_offset_not_pose() {
        let coordinate = FieldCoordinate::new(CartesianPosition::new(-3.0, 1.5), Angle::ZERO);
        let pose = robot_pose(&coordinate, 0.25);
        assert_vector3_approx_eq(&pose.position, &Vector3::new(1.5, 0.25, -3.0));
    }

    #[test]
    fn camera_pose_stacks_mount_and_lens_heights() {
        let coordinate = FieldCoordinate::new(CartesianPosition::new(1.0, 2.0), Angle::ZERO);
        let mount = CameraMount {
            yaw: Angle::from_degrees(10.0),
            pitch: Angle::from_degrees(5.0),
            height: 0.5,
        };
        let lens = CameraLens {
            h_fov: Angle::from_degrees(60.0),
            v_fov: Angle::from_degrees(40.0),
            height: 0.1,
            vertical_direction: Angle::from_degrees(2.0),
        };

        let pose = camera_pose(&coordinate, &mount, &lens, 0.3);

        assert_vector3_approx_eq(&pose.position(), &Vector3::new(2.0, 0.6, 1.0));
        assert_abs_diff_eq!(pose.projection.h_fov.unwrap().degrees(), 60.0, epsilon = EPSILON);
        assert_abs_diff_eq!(pose.projection.v_fov.unwrap().degrees(), 40.0, epsilon = EPSILON);
        assert_abs_diff_eq!(pose.projection.near, 0.3, epsilon = EPSILON);
    }

    #[test]
    fn camera_looks_down_the_field_and_tilts_towards_the_pitch() {
        let coordinate = FieldCoordinate::new(CartesianPosition::new(0.0, 0.0), Angle::ZERO);
        let mount = CameraMount {
            yaw: Angle::ZERO,
            pitch: Angle::from_degrees(5.0),
            height: 0.5,
        };
        let lens = CameraLens {
            vertical_direction: Angle::from_degrees(2.0),
            ..Default::default()
        };

        let pose = camera_pose(&coordinate, &mount, &lens, 0.3);
        let dir = forward(&pose.transform);

        // Heading 0 faces along field +x, which is scene +z.
        assert_abs_diff_eq!(dir.x, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(dir.y, -(7.0_f64.to_radians().sin()), epsilon = EPSILON);
        assert_abs_diff_eq!(dir.z, 7.0_f64.to_radians().cos(), epsilon = EPSILON);
    }

    #[test]
    fn camera_pitch_ignores_heading() {
        let mount = CameraMount {
            pitch: Angle::from_degrees(20.0),
            ..Default::default()
        };
        let lens = CameraLens::default();
        for degrees in [0.0, 90.0, 200.0] {
            let coordinate =
                FieldCoordinate::new(CartesianPosition::new(0.0, 0.0), Angle::from_degrees(degrees));
            let dir = forward(&camera_pose(&coordinate, &mount, &lens, 0.3).transform);
            assert_abs_diff_eq!(dir.y, -(20.0_f64.to_radians().sin()), epsilon = EPSILON);
        }
    }

    #[test]
    fn sky_camera_looks_straight_down_from_above_centre() {
        let pose = sky_camera_pose(8.0, 0.3);
        assert_vector3_approx_eq(&pose.position(), &Vector3::new(0.0, 8.0, 0.0));
        assert_vector3_approx_eq(&forward(&pose.transform), &Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(pose.projection.h_fov, None);
        assert_eq!(pose.projection.v_fov, None);
        assert_abs_diff_eq!(pose.projection.near, 0.3, epsilon = EPSILON);
    }

    #[test]
    fn ball_pose_keeps_full_orientation() {
        let ball = BallState {
            position: CartesianPosition::new(0.5, -1.0),
            height: 0.2,
            orientation: BallOrientation {
                roll: Angle::from_degrees(30.0),
                pitch: Angle::from_degrees(-15.0),
                yaw: Angle::from_degrees(90.0),
            },
        };
        let pose = ball_pose(&ball, 0.144);

        assert_vector3_approx_eq(&pose.position, &Vector3::new(-1.0, 0.344, 0.5));
        let expected = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 6.0)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI / 2.0)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -PI / 12.0);
        assert_quat_approx_eq(&pose.rotation, &expected);
    }
}
