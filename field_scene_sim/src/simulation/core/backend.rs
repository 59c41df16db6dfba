// field_scene_sim/src/simulation/core/backend.rs

//! Drives the core scene synchronizer against Bevy's ECS.
//!
//! Nodes are entities. Attaching and detaching toggle `Visibility` (and, for
//! cameras, whether the camera renders), so detached nodes keep their
//! components and are cheap to bring back.

use bevy::ecs::world::EntityWorldMut;
use bevy::prelude::*;
use field_scene_core::error::SceneError;
use field_scene_core::prelude::{AssetProvider, LightSpec, SceneGraph};
use field_scene_core::transforms::Projection as SceneProjection;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::transforms::{scene_matrix_to_bevy_transform, scene_quat_to_bevy, scene_vector_to_bevy};
use crate::simulation::plugins::tween::{RotationTween, TranslationTween};

/// Remembers which glTF scene every loaded or cloned model entity shows.
#[derive(Resource, Debug)]
pub struct ModelLibrary {
    asset_root: PathBuf,
    lumens_per_intensity: f32,
    models: HashMap<Entity, (String, Handle<Scene>)>,
}

impl ModelLibrary {
    pub fn new(asset_root: impl Into<PathBuf>, lumens_per_intensity: f32) -> Self {
        Self {
            asset_root: asset_root.into(),
            lumens_per_intensity,
            models: HashMap::new(),
        }
    }

    /// Asset path of a model, relative to the asset root.
    pub fn model_path(name: &str) -> String {
        format!("models/{}.glb", name)
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.asset_root.join(Self::model_path(name)).is_file()
    }

    pub fn lumens(&self, intensity: f64) -> f32 {
        intensity as f32 * self.lumens_per_intensity
    }
}

/// A `SceneGraph` + `AssetProvider` over one system's `Commands`.
///
/// Build one per system run; it holds borrows of the system parameters.
pub struct BevySceneBackend<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    asset_server: &'a AssetServer,
    library: &'a mut ModelLibrary,
}

impl<'a, 'w, 's> BevySceneBackend<'a, 'w, 's> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        asset_server: &'a AssetServer,
        library: &'a mut ModelLibrary,
    ) -> Self {
        Self {
            commands,
            asset_server,
            library,
        }
    }

    /// Despawns every model entity loaded or cloned so far.
    ///
    /// Used when the scene cannot be built, so the prototypes loaded before the
    /// failure do not linger hidden in the world.
    pub fn discard_models(&mut self) {
        for (entity, _) in self.library.models.drain() {
            self.commands.entity(entity).despawn();
        }
    }

    fn spawn_model(&mut self, name: &str, scene: Handle<Scene>) -> Entity {
        let entity = self
            .commands
            .spawn((
                Name::new(name.to_string()),
                SceneRoot(scene.clone()),
                Transform::default(),
                Visibility::Hidden,
            ))
            .id();
        self.library.models.insert(entity, (name.to_string(), scene));
        entity
    }
}

fn set_camera_active(active: bool) -> impl FnOnce(EntityWorldMut) + Send + 'static {
    move |mut entity: EntityWorldMut| {
        if let Some(mut camera) = entity.get_mut::<Camera>() {
            camera.is_active = active;
        }
    }
}

impl SceneGraph for BevySceneBackend<'_, '_, '_> {
    type Node = Entity;

    fn create_camera(&mut self) -> Entity {
        self.commands
            .spawn((
                Name::new("field_camera"),
                Camera3d::default(),
                Camera {
                    is_active: false,
                    ..default()
                },
                Projection::Perspective(PerspectiveProjection::default()),
                Transform::default(),
                Visibility::Hidden,
            ))
            .id()
    }

    fn create_light(&mut self, light: &LightSpec) -> Entity {
        // Bevy lights fall off physically; only the range is configurable.
        self.commands
            .spawn((
                Name::new("field_light"),
                PointLight {
                    intensity: self.library.lumens(light.intensity),
                    range: light.attenuation_end as f32,
                    shadows_enabled: light.casts_shadow,
                    ..default()
                },
                Transform::default(),
                Visibility::Hidden,
            ))
            .id()
    }

    fn attach(&mut self, node: Entity) {
        self.commands
            .entity(node)
            .insert(Visibility::Inherited)
            .queue(set_camera_active(true));
    }

    fn detach(&mut self, node: Entity) {
        self.commands
            .entity(node)
            .insert(Visibility::Hidden)
            .queue(set_camera_active(false));
    }

    fn set_position(&mut self, node: Entity, position: Vector3<f64>, transition: Duration) {
        let target = scene_vector_to_bevy(&position);
        let mut entity = self.commands.entity(node);
        if transition.is_zero() {
            entity
                .remove::<TranslationTween>()
                .queue(move |mut entity: EntityWorldMut| {
                    if let Some(mut transform) = entity.get_mut::<Transform>() {
                        transform.translation = target;
                    }
                });
        } else {
            entity.insert(TranslationTween::new(target, transition));
        }
    }

    fn set_orientation(&mut self, node: Entity, rotation: UnitQuaternion<f64>, transition: Duration) {
        let target = scene_quat_to_bevy(&rotation);
        let mut entity = self.commands.entity(node);
        if transition.is_zero() {
            entity
                .remove::<RotationTween>()
                .queue(move |mut entity: EntityWorldMut| {
                    if let Some(mut transform) = entity.get_mut::<Transform>() {
                        transform.rotation = target;
                    }
                });
        } else {
            entity.insert(RotationTween::new(target, transition));
        }
    }

    fn set_transform(&mut self, node: Entity, transform: &Matrix4<f64>) {
        self.commands
            .entity(node)
            .remove::<(TranslationTween, RotationTween)>()
            .insert(scene_matrix_to_bevy_transform(transform));
    }

    fn set_projection(&mut self, node: Entity, projection: &SceneProjection) {
        // Bevy derives the horizontal field of view from the viewport aspect.
        let defaults = PerspectiveProjection::default();
        let perspective = PerspectiveProjection {
            fov: projection
                .v_fov
                .map_or(defaults.fov, |fov| fov.radians() as f32),
            near: projection.near as f32,
            ..defaults
        };
        self.commands
            .entity(node)
            .insert(Projection::Perspective(perspective));
    }

    fn set_light_intensity(&mut self, node: Entity, intensity: f64) {
        let lumens = self.library.lumens(intensity);
        self.commands
            .entity(node)
            .queue(move |mut entity: EntityWorldMut| {
                if let Some(mut light) = entity.get_mut::<PointLight>() {
                    light.intensity = lumens;
                }
            });
    }
}

impl AssetProvider for BevySceneBackend<'_, '_, '_> {
    fn load_node(&mut self, name: &str) -> Result<Entity, SceneError> {
        if !self.library.has_model(name) {
            return Err(SceneError::MissingAsset {
                name: name.to_string(),
            });
        }
        let scene = self
            .asset_server
            .load(GltfAssetLabel::Scene(0).from_asset(ModelLibrary::model_path(name)));
        debug!("Loading model '{}'", name);
        Ok(self.spawn_model(name, scene))
    }

    fn instantiate(&mut self, prototype: Entity) -> Entity {
        match self.library.models.get(&prototype).cloned() {
            Some((name, scene)) => self.spawn_model(&name, scene),
            None => {
                warn!("Entity {:?} is not a model; cloning it as an empty node", prototype);
                self.commands
                    .spawn((Transform::default(), Visibility::Hidden))
                    .id()
            }
        }
    }
}
