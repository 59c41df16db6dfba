// field_scene_core/src/scene/memory.rs

//! A scene graph that lives entirely in memory.
//!
//! It records every node and every write so that the synchronizer can be run
//! without a renderer (headless playback, tests) and its churn inspected.

use super::graph::{AssetProvider, LightSpec, SceneGraph};
use crate::config::{BALL_ASSET, FIELD_ASSET, GOAL_ASSET};
use crate::error::SceneError;
use crate::transforms::Projection;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A mesh loaded by name, or a clone of one.
    Asset { name: String, clone_of: Option<NodeId> },
    Camera,
    Light(LightSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    pub kind: NodeKind,
    pub attached: bool,
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    /// Set by `set_transform`, cleared again by the position/orientation setters.
    pub transform: Option<Matrix4<f64>>,
    pub projection: Option<Projection>,
    /// Duration of the most recent position or orientation write.
    pub last_transition: Duration,
}

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attached: false,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            transform: None,
            projection: None,
            last_transition: Duration::ZERO,
        }
    }

    pub fn asset_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Asset { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Counters for every mutating call made on a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteStats {
    pub loads: usize,
    pub instantiations: usize,
    pub attaches: usize,
    pub detaches: usize,
    pub positions: usize,
    pub orientations: usize,
    pub transforms: usize,
    pub projections: usize,
    pub light_intensities: usize,
}

impl WriteStats {
    /// Writes that move or turn a node.
    pub fn pose_writes(&self) -> usize {
        self.positions + self.orientations + self.transforms
    }
}

#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: Vec<MemoryNode>,
    available_assets: HashSet<String>,
    stats: WriteStats,
}

impl MemoryScene {
    /// A scene whose provider knows exactly the given asset names.
    pub fn with_assets<I, S>(assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: Vec::new(),
            available_assets: assets.into_iter().map(Into::into).collect(),
            stats: WriteStats::default(),
        }
    }

    /// A scene providing the field, goal and ball meshes plus `robot_model`.
    pub fn with_standard_assets(robot_model: &str) -> Self {
        Self::with_assets([FIELD_ASSET, GOAL_ASSET, BALL_ASSET, robot_model])
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every node currently attached to the scene root.
    pub fn attached_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.attached)
            .map(|(index, _)| NodeId(index as u64))
            .collect()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.attached)
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = WriteStats::default();
    }

    fn push(&mut self, node: MemoryNode) -> NodeId {
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u64)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
        // Handles are only ever minted by this scene.
        &mut self.nodes[id.0 as usize]
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::with_standard_assets(crate::config::RobotModel::default().asset_name())
    }
}

impl SceneGraph for MemoryScene {
    type Node = NodeId;

    fn create_camera(&mut self) -> NodeId {
        self.push(MemoryNode::new(NodeKind::Camera))
    }

    fn create_light(&mut self, light: &LightSpec) -> NodeId {
        self.push(MemoryNode::new(NodeKind::Light(*light)))
    }

    fn attach(&mut self, node: NodeId) {
        self.stats.attaches += 1;
        self.node_mut(node).attached = true;
    }

    fn detach(&mut self, node: NodeId) {
        self.stats.detaches += 1;
        self.node_mut(node).attached = false;
    }

    fn set_position(&mut self, node: NodeId, position: Vector3<f64>, transition: Duration) {
        self.stats.positions += 1;
        let node = self.node_mut(node);
        node.position = position;
        node.transform = None;
        node.last_transition = transition;
    }

    fn set_orientation(&mut self, node: NodeId, rotation: UnitQuaternion<f64>, transition: Duration) {
        self.stats.orientations += 1;
        let node = self.node_mut(node);
        node.rotation = rotation;
        node.transform = None;
        node.last_transition = transition;
    }

    fn set_transform(&mut self, node: NodeId, transform: &Matrix4<f64>) {
        self.stats.transforms += 1;
        self.node_mut(node).transform = Some(*transform);
    }

    fn set_projection(&mut self, node: NodeId, projection: &Projection) {
        self.stats.projections += 1;
        self.node_mut(node).projection = Some(*projection);
    }

    fn set_light_intensity(&mut self, node: NodeId, intensity: f64) {
        self.stats.light_intensities += 1;
        match &mut self.node_mut(node).kind {
            NodeKind::Light(light) => light.intensity = intensity,
            other => log::warn!("ignoring light intensity for non-light node {:?}", other),
        }
    }
}

impl AssetProvider for MemoryScene {
    fn load_node(&mut self, name: &str) -> Result<NodeId, SceneError> {
        if !self.available_assets.contains(name) {
            return Err(SceneError::MissingAsset {
                name: name.to_string(),
            });
        }
        self.stats.loads += 1;
        Ok(self.push(MemoryNode::new(NodeKind::Asset {
            name: name.to_string(),
            clone_of: None,
        })))
    }

    fn instantiate(&mut self, prototype: NodeId) -> NodeId {
        self.stats.instantiations += 1;
        let source = self.node_mut(prototype);
        let kind = match &source.kind {
            NodeKind::Asset { name, .. } => NodeKind::Asset {
                name: name.clone(),
                clone_of: Some(prototype),
            },
            other => other.clone(),
        };
        let mut copy = MemoryNode::new(kind);
        copy.position = source.position;
        copy.rotation = source.rotation;
        self.push(copy)
    }
}
