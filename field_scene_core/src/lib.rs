// field_scene_core/src/lib.rs

// Engine-agnostic core of the field scene: data model, transforms, camera
// model, scene synchronization and the render wrapper.
pub mod camera;
pub mod config;
pub mod error;
pub mod field;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod transforms;
pub mod units;
