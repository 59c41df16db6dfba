// field_scene_sim/src/simulation/core/mod.rs

pub mod backend;
pub mod playback;
pub mod schedule;
pub mod transforms;
