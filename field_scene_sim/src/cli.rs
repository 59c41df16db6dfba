// field_scene_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use field_scene_core::camera::Perspective;
use std::path::PathBuf;

/// Field Scene: plays back robot-soccer field snapshots in 3D.
///
/// This struct defines the command-line arguments accepted by any binary
/// built on the field scene simulation library.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to play back.
    #[arg(short, long, default_value = "assets/scenarios/kickoff.toml")]
    pub scenario: PathBuf,

    /// Run the scenario through the in-memory scene instead of opening a window.
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Initial point of view: `sky` or `<home|away>:<index>:<top|bottom>`.
    /// Overrides the scenario's `[viewer] perspective`.
    #[arg(short, long)]
    pub perspective: Option<Perspective>,
}
