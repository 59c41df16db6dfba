// field_scene_sim/src/simulation/plugins/mod.rs

pub mod tween;
pub mod viewer;
