// field_scene_sim/src/simulation/error.rs

use field_scene_core::error::SceneError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load scenario '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("scenario '{0}' does not exist")]
    MissingScenario(PathBuf),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
