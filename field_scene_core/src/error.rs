// field_scene_core/src/error.rs

use thiserror::Error;

/// Failures while building or synchronizing a scene.
///
/// These all mean the deployment is broken (a canonical mesh is missing) and
/// are never retried.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("asset '{name}' could not be located by the asset provider")]
    MissingAsset { name: String },
}

/// Failures of the render pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pixel buffer pool exhausted: all {capacity} buffers are in use")]
    PoolExhausted { capacity: usize },

    #[error("pixel buffer of {width}x{height} does not hold {len} bytes of BGRA data")]
    InvalidBuffer { width: u32, height: u32, len: usize },

    #[error("renderer failed: {0}")]
    Backend(String),
}
