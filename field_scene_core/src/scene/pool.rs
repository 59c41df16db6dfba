// field_scene_core/src/scene/pool.rs

use super::graph::{AssetProvider, SceneGraph};
use crate::field::{FieldCoordinate, FieldSide, RobotState};
use crate::transforms::{robot_pose, ScenePose};
use std::time::Duration;

/// One pooled scene node and what was last written to it.
///
/// `K` is the telemetry value the pose was derived from. Comparing it is how an
/// unchanged entity is recognised before any geometry is computed.
#[derive(Debug, Clone)]
pub struct Slot<N, K> {
    node: N,
    attached: bool,
    /// Cleared by the first placement. Until then the node sits wherever its
    /// prototype was created and there is nothing to transition from.
    fresh: bool,
    applied: Option<(K, ScenePose)>,
}

impl<N: Copy, K: PartialEq + Copy> Slot<N, K> {
    /// Wraps a freshly created, detached node.
    pub fn new(node: N) -> Self {
        Self {
            node,
            attached: false,
            fresh: true,
            applied: None,
        }
    }

    pub fn node(&self) -> N {
        self.node
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach<G: SceneGraph<Node = N> + ?Sized>(&mut self, scene: &mut G) {
        if !self.attached {
            scene.attach(self.node);
            self.attached = true;
        }
    }

    /// Removes the node from the scene and forgets its applied pose, so the next
    /// placement after reattaching always writes.
    pub fn detach<G: SceneGraph<Node = N> + ?Sized>(&mut self, scene: &mut G) {
        if self.attached {
            scene.detach(self.node);
            self.attached = false;
        }
        self.applied = None;
    }

    /// Attaches the node and moves it to `pose`.
    ///
    /// Nothing is written when `key` equals the last applied key. Otherwise only
    /// the parts of the pose that differ from the last write are sent. A node
    /// placed for the first time jumps to its pose regardless of `transition`.
    pub fn place<G, F>(&mut self, scene: &mut G, key: K, transition: Duration, pose: F)
    where
        G: SceneGraph<Node = N> + ?Sized,
        F: FnOnce(&K) -> ScenePose,
    {
        self.attach(scene);

        let previous = match &self.applied {
            Some((applied_key, _)) if *applied_key == key => return,
            Some((_, applied_pose)) => Some(*applied_pose),
            None => None,
        };

        let transition = if self.fresh {
            Duration::ZERO
        } else {
            transition
        };
        self.fresh = false;

        let pose = pose(&key);
        if previous.map_or(true, |p| p.position != pose.position) {
            scene.set_position(self.node, pose.position, transition);
        }
        if previous.map_or(true, |p| p.rotation != pose.rotation) {
            scene.set_orientation(self.node, pose.rotation, transition);
        }
        self.applied = Some((key, pose));
    }
}

/// The scene nodes standing in for one side's roster.
///
/// Slot `i` always renders roster index `i`. Slots beyond the active count are
/// detached but kept for the next time the roster grows.
#[derive(Debug, Clone)]
pub struct RobotPool<N> {
    side: FieldSide,
    slots: Vec<Slot<N, FieldCoordinate>>,
    active: usize,
}

impl<N: Copy + std::fmt::Debug> RobotPool<N> {
    pub fn new(side: FieldSide) -> Self {
        Self {
            side,
            slots: Vec::new(),
            active: 0,
        }
    }

    pub fn side(&self) -> FieldSide {
        self.side
    }

    /// Number of roster entries the pool currently mirrors.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Number of nodes ever created for this side, active or pooled.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn node(&self, index: usize) -> Option<N> {
        self.slots.get(index).map(Slot::node)
    }

    /// Active node handles in roster order.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.slots[..self.active].iter().map(Slot::node)
    }

    pub fn is_attached(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Slot::is_attached)
    }

    /// Brings the pool in line with `robots`.
    ///
    /// `prototype` is the canonical robot node; new slots are clones of it.
    pub fn reconcile<A>(
        &mut self,
        assets: &mut A,
        prototype: N,
        robots: &[RobotState],
        ground_offset: f64,
        transition: Duration,
    ) where
        A: AssetProvider<Node = N> + ?Sized,
    {
        let wanted = robots.len();

        if wanted < self.active {
            log::debug!(
                "{} roster shrank from {} to {}; pooling {} nodes",
                self.side,
                self.active,
                wanted,
                self.active - wanted
            );
            for slot in &mut self.slots[wanted..self.active] {
                slot.detach(assets);
            }
        }

        if wanted > self.active {
            let reused = self.slots.len().min(wanted) - self.active;
            let created = wanted.saturating_sub(self.slots.len());
            log::debug!(
                "{} roster grew from {} to {}; reusing {} pooled nodes, creating {}",
                self.side,
                self.active,
                wanted,
                reused,
                created
            );
            while self.slots.len() < wanted {
                let node = assets.instantiate(prototype);
                self.slots.push(Slot::new(node));
            }
        }

        self.active = wanted;

        for (slot, robot) in self.slots.iter_mut().zip(robots) {
            match robot.field_position {
                Some(coordinate) => slot.place(assets, coordinate, transition, |c| {
                    robot_pose(c, ground_offset)
                }),
                None => slot.detach(assets),
            }
        }
    }
}
