// field_scene_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::plugins::tween::TweenPlugin;
use crate::simulation::plugins::viewer::ViewerPlugin;

// This prelude is for convenience for other files WITHIN the field_scene_sim crate.
pub mod prelude;

// This module contains all the Bevy-specific logic.
pub mod cli;
pub mod simulation;

/// The main plugin of the interactive viewer.
///
/// Expects a `ScenarioConfig` resource to be inserted before it is added.
pub struct FieldScenePlugin;

impl Plugin for FieldScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Builds the scene, plays the timeline back, handles the keyboard.
            ViewerPlugin,
            // Animates timed pose changes.
            TweenPlugin,
        ));
    }
}
