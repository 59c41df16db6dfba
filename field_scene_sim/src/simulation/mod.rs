// field_scene_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod error;
pub mod headless;
pub mod plugins;
pub mod utils;
