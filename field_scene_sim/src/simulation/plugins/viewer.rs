// field_scene_sim/src/simulation/plugins/viewer.rs

//! The interactive viewer: builds the field scene at startup, feeds it the
//! scenario timeline and lets the user pick the point of view.

use bevy::prelude::*;
use field_scene_core::prelude::{
    Antialiasing, AssetProvider, Field, FieldCamera, FieldScene, FieldSide, MountSelector,
    Perspective, SceneGraph,
};
use field_scene_core::render::resolve_sample_count;
use std::time::Duration;

use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::backend::{BevySceneBackend, ModelLibrary};
use crate::simulation::core::playback::Playback;
use crate::simulation::core::schedule::FieldSceneSet;

pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        let scenario = app
            .world()
            .get_resource::<ScenarioConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(ModelLibrary::new(
            scenario.viewer.asset_root.clone(),
            scenario.viewer.lumens_per_intensity,
        ))
        .insert_resource(Playback::from_scenario(&scenario))
        .insert_resource(ClearColor(Color::WHITE));

        app.configure_sets(
            Update,
            (
                FieldSceneSet::Playback,
                FieldSceneSet::Input,
                FieldSceneSet::Animation,
            )
                .chain(),
        );

        app.add_systems(Startup, setup_field_scene).add_systems(
            Update,
            (
                advance_playback.in_set(FieldSceneSet::Playback),
                switch_perspective.in_set(FieldSceneSet::Input),
            ),
        );
    }
}

// =========================================================================
// == Scene State ==
// =========================================================================

/// The synchronized scene, its camera and the perspective the user asked for.
#[derive(Resource, Debug)]
pub struct FieldSceneState {
    pub scene: FieldScene<Entity>,
    pub camera: FieldCamera<Entity>,
    /// What the user selected. The camera may show the sky instead while the
    /// selected robot is not on the roster.
    pub perspective: Perspective,
}

impl FieldSceneState {
    /// Synchronizes robots, ball and camera with a new snapshot.
    pub fn sync<A>(&mut self, backend: &mut A, field: &Field, transition: Duration)
    where
        A: AssetProvider<Node = Entity> + ?Sized,
    {
        self.scene.update(backend, field, transition);
        self.camera
            .update(backend, viewable_perspective(&self.perspective, field), field);
    }

    pub fn set_perspective<A>(&mut self, backend: &mut A, perspective: Perspective, field: &Field)
    where
        A: AssetProvider<Node = Entity> + ?Sized,
    {
        self.perspective = perspective;
        self.camera
            .update(backend, viewable_perspective(&perspective, field), field);
    }
}

/// `requested`, or the sky view if it names a robot missing from `field`.
pub fn viewable_perspective(requested: &Perspective, field: &Field) -> Perspective {
    match requested {
        Perspective::Robot { side, index, .. } if *index >= field.robots(*side).len() => {
            warn!(
                "Perspective {} is not on the {} roster ({} robots); showing the sky view",
                requested,
                side,
                field.robots(*side).len()
            );
            Perspective::Sky
        }
        other => *other,
    }
}

// =========================================================================
// == Keyboard Perspective Switching ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerspectiveKey {
    /// `S`
    Sky,
    /// `H` / `A`: next robot of that side.
    Cycle(FieldSide),
    /// `T` / `B`: other camera of the same robot.
    Mount(MountSelector),
}

const KEY_BINDINGS: [(KeyCode, PerspectiveKey); 5] = [
    (KeyCode::KeyS, PerspectiveKey::Sky),
    (KeyCode::KeyH, PerspectiveKey::Cycle(FieldSide::Home)),
    (KeyCode::KeyA, PerspectiveKey::Cycle(FieldSide::Away)),
    (KeyCode::KeyT, PerspectiveKey::Mount(MountSelector::Top)),
    (KeyCode::KeyB, PerspectiveKey::Mount(MountSelector::Bottom)),
];

/// The perspective selected by pressing `key` while `current` is shown.
pub fn next_perspective(current: &Perspective, key: PerspectiveKey, field: &Field) -> Perspective {
    match key {
        PerspectiveKey::Sky => Perspective::Sky,
        PerspectiveKey::Cycle(side) => {
            let roster = field.robots(side).len();
            if roster == 0 {
                return Perspective::Sky;
            }
            let (index, mount) = match current {
                Perspective::Robot {
                    side: shown,
                    index,
                    mount,
                } if *shown == side => ((index + 1) % roster, *mount),
                Perspective::Robot { mount, .. } => (0, *mount),
                _ => (0, MountSelector::Top),
            };
            Perspective::Robot { side, index, mount }
        }
        PerspectiveKey::Mount(mount) => match current {
            Perspective::Robot { side, index, .. } => Perspective::Robot {
                side: *side,
                index: *index,
                mount,
            },
            other => *other,
        },
    }
}

/// Bevy's MSAA setting closest to `antialiasing` without exceeding it.
pub fn msaa_for(antialiasing: Antialiasing) -> Msaa {
    match resolve_sample_count(antialiasing, |samples| samples <= 8) {
        8 => Msaa::Sample8,
        4 => Msaa::Sample4,
        2 => Msaa::Sample2,
        _ => Msaa::Off,
    }
}

// =========================================================================
// == Systems ==
// =========================================================================

fn setup_field_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut library: ResMut<ModelLibrary>,
    scenario: Res<ScenarioConfig>,
    playback: Res<Playback>,
    mut exit: EventWriter<AppExit>,
) {
    let field = playback.current();
    let mut backend = BevySceneBackend::new(&mut commands, &asset_server, &mut library);

    let scene = match FieldScene::new(&mut backend, field, scenario.scene.clone()) {
        Ok(scene) => scene,
        Err(err) => {
            error!("Failed to build the field scene: {}", err);
            backend.discard_models();
            exit.write(AppExit::error());
            return;
        }
    };

    let perspective = scenario.viewer.perspective;
    let camera = FieldCamera::with_config(
        &mut backend,
        viewable_perspective(&perspective, field),
        field,
        scenario.scene.camera,
    );
    // The window renders continuously, so the camera stays in the scene.
    backend.attach(camera.node());

    commands
        .entity(camera.node())
        .insert(msaa_for(scenario.viewer.antialiasing));
    info!(
        "Field scene built from {} frames, viewing from {}",
        playback.len(),
        perspective
    );
    commands.insert_resource(FieldSceneState {
        scene,
        camera,
        perspective,
    });
}

fn advance_playback(
    mut commands: Commands,
    time: Res<Time>,
    asset_server: Res<AssetServer>,
    mut library: ResMut<ModelLibrary>,
    mut playback: ResMut<Playback>,
    state: Option<ResMut<FieldSceneState>>,
) {
    let Some(mut state) = state else {
        return;
    };
    let Some(field) = playback.advance(time.delta()).cloned() else {
        return;
    };
    debug!("Showing frame {} of {}", playback.index() + 1, playback.len());

    let mut backend = BevySceneBackend::new(&mut commands, &asset_server, &mut library);
    state.sync(&mut backend, &field, playback.transition());
}

fn switch_perspective(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    asset_server: Res<AssetServer>,
    mut library: ResMut<ModelLibrary>,
    playback: Res<Playback>,
    state: Option<ResMut<FieldSceneState>>,
) {
    let Some(mut state) = state else {
        return;
    };
    let Some(key) = KEY_BINDINGS
        .iter()
        .find(|(code, _)| keys.just_pressed(*code))
        .map(|(_, key)| *key)
    else {
        return;
    };

    let field = playback.current();
    let next = next_perspective(&state.perspective, key, field);
    if next == state.perspective {
        return;
    }
    info!("Switching perspective to {}", next);

    let mut backend = BevySceneBackend::new(&mut commands, &asset_server, &mut library);
    state.set_perspective(&mut backend, next, field);
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_scene_core::field::RobotState;
    use field_scene_core::prelude::MemoryScene;
    use field_scene_core::scene::memory::NodeId;
    use field_scene_core::units::Angle;

    fn field(home: usize, away: usize) -> Field {
        let robot = || RobotState::nao_at(0.0, 0.0, Angle::ZERO);
        Field {
            home_robots: (0..home).map(|_| robot()).collect(),
            away_robots: (0..away).map(|_| robot()).collect(),
            ..Default::default()
        }
    }

    fn robot(side: FieldSide, index: usize, mount: MountSelector) -> Perspective {
        Perspective::Robot { side, index, mount }
    }

    #[test]
    fn cycling_walks_the_roster_and_keeps_the_mount() {
        let field = field(3, 1);
        let mut current = Perspective::Sky;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = next_perspective(&current, PerspectiveKey::Cycle(FieldSide::Home), &field);
            seen.push(current);
        }
        assert_eq!(
            seen,
            vec![
                robot(FieldSide::Home, 0, MountSelector::Top),
                robot(FieldSide::Home, 1, MountSelector::Top),
                robot(FieldSide::Home, 2, MountSelector::Top),
                robot(FieldSide::Home, 0, MountSelector::Top),
            ]
        );

        let bottom = next_perspective(&current, PerspectiveKey::Mount(MountSelector::Bottom), &field);
        assert_eq!(bottom, robot(FieldSide::Home, 0, MountSelector::Bottom));
        let away = next_perspective(&bottom, PerspectiveKey::Cycle(FieldSide::Away), &field);
        assert_eq!(away, robot(FieldSide::Away, 0, MountSelector::Bottom));
    }

    #[test]
    fn empty_roster_and_sky_key_show_the_sky() {
        let field = field(0, 2);
        let current = robot(FieldSide::Away, 1, MountSelector::Top);
        assert_eq!(
            next_perspective(&current, PerspectiveKey::Cycle(FieldSide::Home), &field),
            Perspective::Sky
        );
        assert_eq!(next_perspective(&current, PerspectiveKey::Sky, &field), Perspective::Sky);
        assert_eq!(
            next_perspective(&Perspective::Sky, PerspectiveKey::Mount(MountSelector::Bottom), &field),
            Perspective::Sky
        );
    }

    #[test]
    fn robots_missing_from_the_roster_fall_back_to_sky() {
        let field = field(2, 0);
        let present = robot(FieldSide::Home, 1, MountSelector::Top);
        assert_eq!(viewable_perspective(&present, &field), present);
        assert_eq!(
            viewable_perspective(&robot(FieldSide::Home, 2, MountSelector::Top), &field),
            Perspective::Sky
        );
    }

    #[test]
    fn msaa_never_exceeds_eight_samples() {
        assert_eq!(msaa_for(Antialiasing::Multisample16x), Msaa::Sample8);
        assert_eq!(msaa_for(Antialiasing::Multisample4x), Msaa::Sample4);
        assert_eq!(msaa_for(Antialiasing::None), Msaa::Off);
    }

    #[test]
    fn shrinking_roster_under_a_robot_camera_does_not_panic() {
        let mut memory = MemoryScene::default();
        let before = field(3, 0);
        let mut scene: FieldScene<NodeId> =
            FieldScene::new(&mut memory, &before, Default::default()).unwrap();
        let requested = robot(FieldSide::Home, 2, MountSelector::Top);
        let mut camera = FieldCamera::new(&mut memory, viewable_perspective(&requested, &before), &before);

        let after = field(1, 0);
        scene.update(&mut memory, &after, Duration::ZERO);
        camera.update(&mut memory, viewable_perspective(&requested, &after), &after);

        assert_eq!(camera.perspective(), &Perspective::Sky);
    }
}
