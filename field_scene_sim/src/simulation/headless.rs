// field_scene_sim/src/simulation/headless.rs

//! Plays a scenario through the in-memory scene graph, without a window.
//!
//! Useful to validate a scenario file and to see how much scene churn its
//! timeline causes.

use bevy::prelude::*;
use field_scene_core::prelude::{FieldCamera, FieldScene, MemoryScene, Perspective};

use crate::simulation::config::ScenarioConfig;
use crate::simulation::error::SimError;
use crate::simulation::plugins::viewer::viewable_perspective;

/// What a headless run did to the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub frames: usize,
    /// Every node ever created, attached or not.
    pub nodes: usize,
    /// Nodes in the scene after the last frame.
    pub attached: usize,
    pub pose_writes: usize,
    pub attaches: usize,
    pub detaches: usize,
    /// Perspective the camera showed on the last frame.
    pub perspective: Perspective,
}

pub fn run_headless(scenario: &ScenarioConfig) -> Result<HeadlessReport, SimError> {
    let mut memory = MemoryScene::with_standard_assets(scenario.scene.robot_model.asset_name());
    let first = scenario.first_frame();
    let requested = scenario.viewer.perspective;

    let mut scene = FieldScene::new(&mut memory, &first, scenario.scene.clone())?;
    let mut camera = FieldCamera::with_config(
        &mut memory,
        viewable_perspective(&requested, &first),
        &first,
        scenario.scene.camera,
    );

    let transition = scenario.playback.transition_seconds;
    for field in scenario.frames.iter().skip(1) {
        scene.update(&mut memory, field, transition);
        camera.update(&mut memory, viewable_perspective(&requested, field), field);
    }

    let stats = memory.stats();
    Ok(HeadlessReport {
        frames: scenario.frames.len().max(1),
        nodes: memory.len(),
        attached: memory.attached_nodes().len(),
        pose_writes: stats.pose_writes(),
        attaches: stats.attaches,
        detaches: stats.detaches,
        perspective: *camera.perspective(),
    })
}

/// Runs [`run_headless`] once at startup, logs the report and exits.
pub struct HeadlessPlugin;

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, run_headless_once);
    }
}

fn run_headless_once(scenario: Res<ScenarioConfig>, mut exit: EventWriter<AppExit>) {
    match run_headless(&scenario) {
        Ok(report) => {
            info!(
                "Played {} frames: {} nodes ({} attached), {} pose writes, {} attaches, {} detaches, final view {}",
                report.frames,
                report.nodes,
                report.attached,
                report.pose_writes,
                report.attaches,
                report.detaches,
                report.perspective
            );
            exit.write(AppExit::Success);
        }
        Err(err) => {
            error!("Headless playback failed: {}", err);
            exit.write(AppExit::error());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_scene_core::field::{BallState, Field, FieldSide, MountSelector, RobotState};
    use field_scene_core::units::Angle;

    fn frame(home: usize, ball: bool) -> Field {
        Field {
            home_robots: (0..home)
                .map(|i| RobotState::nao_at(-(i as f64), 1.0, Angle::ZERO))
                .collect(),
            ball: ball.then(|| BallState::on_ground(0.0, 0.0)),
            ..Default::default()
        }
    }

    #[test]
    fn replays_the_timeline_through_memory() {
        let mut scenario = ScenarioConfig::default();
        scenario.frames = vec![frame(3, true), frame(1, false), frame(3, true)];
        scenario.viewer.perspective = Perspective::Robot {
            side: FieldSide::Home,
            index: 2,
            mount: MountSelector::Top,
        };

        let report = run_headless(&scenario).unwrap();

        assert_eq!(report.frames, 3);
        // 4 canonical meshes, 2 goals, 5 lights, 3 robots, 1 camera.
        assert_eq!(report.nodes, 15);
        // Field, 2 goals, 5 lights, 3 robots and the ball.
        assert_eq!(report.attached, 12);
        // Robots 1 and 2 plus the ball left and came back.
        assert_eq!(report.detaches, 3);
        assert_eq!(report.perspective, scenario.viewer.perspective);
    }

    #[test]
    fn empty_scenario_still_builds_the_pitch() {
        let report = run_headless(&ScenarioConfig::default()).unwrap();
        assert_eq!(report.frames, 1);
        assert_eq!(report.attached, 8);
        assert_eq!(report.perspective, Perspective::Sky);
    }
}
