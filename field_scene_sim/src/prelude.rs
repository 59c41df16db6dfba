// field_scene_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// The pure scene types. Listed explicitly because the core's `Projection`
// would clash with Bevy's camera component of the same name.
pub use field_scene_core::prelude::{
    Angle, Antialiasing, AssetProvider, BallState, CameraConfig, Field, FieldCamera,
    FieldCoordinate, FieldScene, FieldSide, MemoryScene, MountSelector, Perspective, RobotState,
    SceneConfig, SceneError, SceneGraph,
};

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::{load_scenario, PlaybackConfig, ScenarioConfig, ViewerConfig};
pub use crate::simulation::core::backend::{BevySceneBackend, ModelLibrary};
pub use crate::simulation::core::playback::Playback;
pub use crate::simulation::core::schedule::FieldSceneSet;
pub use crate::simulation::error::SimError;
pub use crate::simulation::headless::{run_headless, HeadlessPlugin, HeadlessReport};
pub use crate::simulation::plugins::viewer::{FieldSceneState, ViewerPlugin};
