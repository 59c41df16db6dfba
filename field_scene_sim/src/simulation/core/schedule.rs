// field_scene_sim/src/simulation/core/schedule.rs

use bevy::ecs::schedule::SystemSet;

/// Ordering of the viewer's per-frame work.
///
/// Playback writes new poses (possibly as tweens), input may swap the camera,
/// and animation then moves entities towards their targets in the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldSceneSet {
    /// Advance the timeline and synchronize the scene with the current frame.
    Playback,
    /// React to keyboard perspective changes.
    Input,
    /// Interpolate in-flight tweens.
    Animation,
}
