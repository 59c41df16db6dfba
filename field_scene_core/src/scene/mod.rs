// field_scene_core/src/scene/mod.rs

//! The persistent field scene and its per-tick synchronization.

pub mod graph;
pub mod memory;
pub mod pool;

use crate::config::{SceneConfig, BALL_ASSET, FIELD_ASSET, GOAL_ASSET};
use crate::error::SceneError;
use crate::field::{BallState, Field, FieldSide};
use crate::transforms::{ball_pose, scene_rotation};
use crate::units::Angle;
use graph::{AssetProvider, LightSpec};
use nalgebra::Vector3;
use pool::{RobotPool, Slot};
use std::fmt::Debug;
use std::time::Duration;

/// The scene for one pitch: static furniture plus the nodes mirroring the
/// robots and the ball of the latest [`Field`] snapshot.
///
/// The scene graph itself is passed into every call. `FieldScene` only keeps
/// node handles and the bookkeeping needed to avoid redundant writes.
#[derive(Debug, Clone)]
pub struct FieldScene<N> {
    config: SceneConfig,
    field_node: N,
    home_goal: N,
    away_goal: N,
    lights: Vec<N>,
    light_intensity: f64,
    robot_prototype: N,
    home: RobotPool<N>,
    away: RobotPool<N>,
    ball: Slot<N, BallState>,
}

impl<N: Copy + Eq + Debug> FieldScene<N> {
    /// Builds the static scene and performs the first synchronization against
    /// `field` without transitions.
    ///
    /// Every canonical mesh is requested before anything is attached, so a
    /// missing asset leaves the scene graph untouched apart from the nodes
    /// already loaded.
    pub fn new<A>(assets: &mut A, field: &Field, config: SceneConfig) -> Result<Self, SceneError>
    where
        A: AssetProvider<Node = N> + ?Sized,
    {
        let field_node = assets.load_node(FIELD_ASSET)?;
        let goal = assets.load_node(GOAL_ASSET)?;
        let ball = assets.load_node(BALL_ASSET)?;
        let robot_prototype = assets.load_node(config.robot_model.asset_name())?;

        assets.attach(field_node);

        let home_goal = assets.instantiate(goal);
        let away_goal = assets.instantiate(goal);
        let goal_height = config.goal_ground_offset;
        assets.set_position(
            home_goal,
            Vector3::new(-config.goal_distance, goal_height, 0.0),
            Duration::ZERO,
        );
        assets.set_orientation(
            home_goal,
            scene_rotation(Angle::ZERO, Angle::HALF_TURN, Angle::ZERO),
            Duration::ZERO,
        );
        assets.set_position(
            away_goal,
            Vector3::new(config.goal_distance, goal_height, 0.0),
            Duration::ZERO,
        );
        assets.attach(home_goal);
        assets.attach(away_goal);

        let lighting = &config.lighting;
        let spec = LightSpec {
            intensity: field.light_intensity,
            attenuation_start: lighting.attenuation_start,
            attenuation_end: lighting.attenuation_end,
            attenuation_falloff_exponent: lighting.attenuation_falloff_exponent,
            casts_shadow: lighting.casts_shadow,
        };
        let lights = lighting
            .positions
            .iter()
            .map(|[x, z]| {
                let light = assets.create_light(&spec);
                assets.set_position(light, Vector3::new(*x, lighting.height, *z), Duration::ZERO);
                assets.attach(light);
                light
            })
            .collect();

        let mut scene = Self {
            field_node,
            home_goal,
            away_goal,
            lights,
            light_intensity: field.light_intensity,
            robot_prototype,
            home: RobotPool::new(FieldSide::Home),
            away: RobotPool::new(FieldSide::Away),
            ball: Slot::new(ball),
            config,
        };
        scene.update(assets, field, Duration::ZERO);

        log::info!(
            "field scene ready: {} home robots, {} away robots, ball {}",
            field.home_robots.len(),
            field.away_robots.len(),
            if field.ball.is_some() { "present" } else { "absent" }
        );
        Ok(scene)
    }

    /// Reconciles robots, ball and lighting with `field`.
    ///
    /// Position and orientation changes animate over `transition`; pass
    /// [`Duration::ZERO`] to apply them immediately.
    pub fn update<A>(&mut self, assets: &mut A, field: &Field, transition: Duration)
    where
        A: AssetProvider<Node = N> + ?Sized,
    {
        if field.light_intensity != self.light_intensity {
            for light in &self.lights {
                assets.set_light_intensity(*light, field.light_intensity);
            }
            self.light_intensity = field.light_intensity;
        }

        let ground_offset = self.config.robot_ground_offset;
        self.home.reconcile(
            assets,
            self.robot_prototype,
            &field.home_robots,
            ground_offset,
            transition,
        );
        self.away.reconcile(
            assets,
            self.robot_prototype,
            &field.away_robots,
            ground_offset,
            transition,
        );

        match field.ball {
            Some(ball) => {
                let radius = self.config.ball_radius;
                self.ball
                    .place(assets, ball, transition, |b| ball_pose(b, radius));
            }
            None => self.ball.detach(assets),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn field_node(&self) -> N {
        self.field_node
    }

    /// `(home, away)` goal nodes.
    pub fn goal_nodes(&self) -> (N, N) {
        (self.home_goal, self.away_goal)
    }

    pub fn light_nodes(&self) -> &[N] {
        &self.lights
    }

    pub fn robots(&self, side: FieldSide) -> &RobotPool<N> {
        match side {
            FieldSide::Home => &self.home,
            FieldSide::Away => &self.away,
        }
    }

    /// Node currently mirroring roster entry `index` of `side`, if any.
    pub fn robot_node(&self, side: FieldSide, index: usize) -> Option<N> {
        let pool = self.robots(side);
        if index < pool.active() {
            pool.node(index)
        } else {
            None
        }
    }

    pub fn ball_node(&self) -> N {
        self.ball.node()
    }

    pub fn is_ball_attached(&self) -> bool {
        self.ball.is_attached()
    }
}
