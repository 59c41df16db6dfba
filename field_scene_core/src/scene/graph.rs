// field_scene_core/src/scene/graph.rs

use crate::error::SceneError;
use crate::transforms::Projection;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use std::fmt::Debug;
use std::time::Duration;

/// Parameters of an omni light node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpec {
    pub intensity: f64,
    pub attenuation_start: f64,
    pub attenuation_end: f64,
    pub attenuation_falloff_exponent: f64,
    pub casts_shadow: bool,
}

// --- The Scene Graph Trait ("Contract") ---
/// The contract for any retained-mode scene graph the field scene can drive.
///
/// Node handles are plain `Copy` values. The scene graph owns the nodes; callers
/// only keep handles around to address them later. New nodes start detached.
pub trait SceneGraph {
    type Node: Copy + Eq + Debug;

    /// Creates an empty node carrying a perspective camera.
    fn create_camera(&mut self) -> Self::Node;

    /// Creates an empty node carrying an omni light.
    fn create_light(&mut self, light: &LightSpec) -> Self::Node;

    /// Adds the node under the scene root. Attaching an attached node is a no-op.
    fn attach(&mut self, node: Self::Node);

    /// Removes the node from the scene without destroying it.
    fn detach(&mut self, node: Self::Node);

    /// Moves the node, interpolating over `transition` (zero means immediately).
    fn set_position(&mut self, node: Self::Node, position: Vector3<f64>, transition: Duration);

    /// Rotates the node, interpolating over `transition` (zero means immediately).
    fn set_orientation(
        &mut self,
        node: Self::Node,
        rotation: UnitQuaternion<f64>,
        transition: Duration,
    );

    /// Replaces the node's whole local transform.
    fn set_transform(&mut self, node: Self::Node, transform: &Matrix4<f64>);

    /// Configures the camera carried by the node.
    fn set_projection(&mut self, node: Self::Node, projection: &Projection);

    /// Changes the intensity of the light carried by the node.
    fn set_light_intensity(&mut self, node: Self::Node, intensity: f64);
}

/// Supplies mesh nodes by logical name ("field", "goal", "ball", "nao").
///
/// How names map onto files, bundles or packages is entirely the provider's
/// business.
pub trait AssetProvider: SceneGraph {
    /// Loads the canonical node for `name`. A missing asset is fatal.
    fn load_node(&mut self, name: &str) -> Result<Self::Node, SceneError>;

    /// Creates an independent copy of a loaded node.
    fn instantiate(&mut self, prototype: Self::Node) -> Self::Node;
}
