// field_scene_core/src/prelude.rs

// --- Core Abstractions (the contracts a backend implements) ---
pub use crate::render::Renderer;
pub use crate::scene::graph::{AssetProvider, LightSpec, SceneGraph};

// --- Core Data Structures ---
pub use crate::field::{
    BallOrientation, BallState, CameraLens, CameraMount, CartesianPosition, Field,
    FieldCoordinate, FieldSide, MountSelector, RobotState,
};
pub use crate::units::{Angle, Heading};

// --- Scene, Camera and Rendering ---
pub use crate::camera::{resolve_camera_pose, FieldCamera, Perspective, PerspectiveParseError};
pub use crate::render::{
    render_image, Antialiasing, FieldRenderer, PixelBuffer, PixelBufferPool, RenderOptions,
};
pub use crate::scene::memory::{MemoryScene, NodeId};
pub use crate::scene::FieldScene;
pub use crate::transforms::{CameraPose, Projection, ScenePose};

// --- Configuration and Errors ---
pub use crate::config::{CameraConfig, LightingConfig, RobotModel, SceneConfig};
pub use crate::error::{RenderError, SceneError};
