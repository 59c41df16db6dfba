// field_scene_sim/src/simulation/plugins/tween.rs

//! Timed moves and turns for scene nodes.
//!
//! A tween remembers where its entity was on the first frame it runs, then
//! interpolates towards the target over its duration and removes itself.

use bevy::prelude::*;
use std::time::Duration;

use crate::simulation::core::schedule::FieldSceneSet;

pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (animate_translations, animate_rotations).in_set(FieldSceneSet::Animation),
        );
    }
}

/// Fraction of a tween completed after `elapsed`, in `[0, 1]`.
///
/// A zero duration is complete immediately.
pub fn tween_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Component, Debug, Clone)]
pub struct TranslationTween {
    start: Option<Vec3>,
    pub target: Vec3,
    pub duration: Duration,
    elapsed: Duration,
}

impl TranslationTween {
    pub fn new(target: Vec3, duration: Duration) -> Self {
        Self {
            start: None,
            target,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the tween and returns the translation for this frame, plus
    /// whether the tween has finished.
    pub fn step(&mut self, current: Vec3, delta: Duration) -> (Vec3, bool) {
        let start = *self.start.get_or_insert(current);
        self.elapsed += delta;
        let t = tween_progress(self.elapsed, self.duration);
        (start.lerp(self.target, t), t >= 1.0)
    }
}

#[derive(Component, Debug, Clone)]
pub struct RotationTween {
    start: Option<Quat>,
    pub target: Quat,
    pub duration: Duration,
    elapsed: Duration,
}

impl RotationTween {
    pub fn new(target: Quat, duration: Duration) -> Self {
        Self {
            start: None,
            target,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn step(&mut self, current: Quat, delta: Duration) -> (Quat, bool) {
        let start = *self.start.get_or_insert(current);
        self.elapsed += delta;
        let t = tween_progress(self.elapsed, self.duration);
        (start.slerp(self.target, t), t >= 1.0)
    }
}

fn animate_translations(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut TranslationTween)>,
) {
    for (entity, mut transform, mut tween) in &mut query {
        let (translation, done) = tween.step(transform.translation, time.delta());
        transform.translation = translation;
        if done {
            commands.entity(entity).remove::<TranslationTween>();
        }
    }
}

fn animate_rotations(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut RotationTween)>,
) {
    for (entity, mut transform, mut tween) in &mut query {
        let (rotation, done) = tween.step(transform.rotation, time.delta());
        transform.rotation = rotation;
        if done {
            commands.entity(entity).remove::<RotationTween>();
        }
    }
}
