// field_scene_sim/src/simulation/core/transforms.rs

//! Conversions between the scene frame used by `field_scene_core` and Bevy.
//!
//! Both frames are Y-up and right-handed with cameras looking down -Z, so the
//! conversions only change numeric types (`f64` nalgebra to `f32` glam).

use bevy::prelude::{Mat4, Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Isometry3, Matrix4, Quaternion, Translation3, UnitQuaternion, Vector3};

/// Converts a scene-frame position into a Bevy vector.
pub fn scene_vector_to_bevy(vec: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(vec.x as f32, vec.y as f32, vec.z as f32)
}

/// Converts a scene-frame orientation into a Bevy quaternion.
pub fn scene_quat_to_bevy(quat: &UnitQuaternion<f64>) -> BevyQuat {
    let q = quat.quaternion();
    BevyQuat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32).normalize()
}

/// Converts a homogeneous scene-frame matrix into a Bevy `Transform`.
///
/// Both nalgebra and glam store matrices column-major, so the raw slice can
/// be handed over as-is.
pub fn scene_matrix_to_bevy_transform(matrix: &Matrix4<f64>) -> BevyTransform {
    let cols: Vec<f32> = matrix.as_slice().iter().map(|v| *v as f32).collect();
    BevyTransform::from_matrix(Mat4::from_cols_slice(&cols))
}

/// Converts a Bevy `Transform` back into a scene-frame isometry.
/// Scale is discarded.
pub fn bevy_transform_to_scene_isometry(transform: &BevyTransform) -> Isometry3<f64> {
    let t = transform.translation;
    let r = transform.rotation;
    Isometry3::from_parts(
        Translation3::new(t.x as f64, t.y as f64, t.z as f64),
        UnitQuaternion::from_quaternion(Quaternion::new(
            r.w as f64, r.x as f64, r.y as f64, r.z as f64,
        )),
    )
}
