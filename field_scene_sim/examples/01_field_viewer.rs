// field_scene_sim/examples/01_field_viewer.rs

//! Plays a robot-soccer scenario back in 3D.
//!
//! This example demonstrates how to:
//! 1. Parse the command line and load a scenario TOML file.
//! 2. Set up the core Bevy application and plugins.
//! 3. Add the `FieldScenePlugin`, which builds and synchronizes the field scene.
//! 4. Alternatively run the timeline headless through the in-memory scene.
//!
//! To run this example:
//! `cargo run --example 01_field_viewer -- --scenario assets/scenarios/kickoff.toml`
//!
//! Keys: `S` sky view, `H`/`A` next home/away robot, `T`/`B` top/bottom camera.

// --- Bevy Imports ---
use bevy::{log::LogPlugin, prelude::*};
use clap::Parser;

// --- Project-Specific Imports ---
use field_scene_sim::cli::Cli;
use field_scene_sim::prelude::{load_scenario, HeadlessPlugin};
use field_scene_sim::FieldScenePlugin;

const LOG_FILTER: &str =
    "info,wgpu_core=error,wgpu_hal=error,field_scene_sim=debug,field_scene_core=debug";

fn main() -> AppExit {
    let cli = Cli::parse();

    // --- 1. Load Scenario Configuration ---
    println!("Loading scenario from: {}", cli.scenario.display());
    let mut scenario = match load_scenario(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("{}", err);
            return AppExit::error();
        }
    };
    if let Some(perspective) = cli.perspective {
        scenario.viewer.perspective = perspective;
    }
    // Bevy resolves asset paths against its own base directory; pin the
    // root to the working directory so the model existence checks agree.
    if let Ok(root) = std::path::absolute(&scenario.viewer.asset_root) {
        scenario.viewer.asset_root = root;
    }

    let log = LogPlugin {
        level: bevy::log::Level::INFO,
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    let mut app = App::new();

    // --- 2a. Headless: no window, just the in-memory dry run ---
    if cli.headless {
        app.add_plugins((MinimalPlugins, log))
            .insert_resource(scenario)
            .add_plugins(HeadlessPlugin);
        return app.run();
    }

    // --- 2b. Core Bevy Plugins & Resources ---
    let window = Window {
        title: "Field Scene".to_string(),
        resolution: (scenario.viewer.window_width, scenario.viewer.window_height).into(),
        ..default()
    };
    app.add_plugins(
        DefaultPlugins
            .set(log)
            .set(WindowPlugin {
                primary_window: Some(window),
                ..default()
            })
            .set(AssetPlugin {
                file_path: scenario.viewer.asset_root.display().to_string(),
                ..default()
            }),
    )
    // Insert the loaded configuration as a Bevy resource so all systems can access it.
    .insert_resource(scenario);

    // --- 3. Add the Main Field Scene Plugin ---
    app.add_plugins(FieldScenePlugin);

    // --- 4. Run the App ---
    println!("Starting Field Scene viewer...");
    app.run()
}
