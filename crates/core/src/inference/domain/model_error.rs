use std::path::PathBuf;

use thiserror::Error;

use super::detector_model::ModelState;
use super::device::Device;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("could not initialise model from {path}: {reason}")]
    ModelInit { path: PathBuf, reason: String },

    #[error("model {model} uses layers unsupported on {device}: {}", layers.join(", "))]
    UnsupportedLayer {
        model: String,
        device: Device,
        layers: Vec<String>,
    },

    #[error("model {model} does not match its stage: {reason}")]
    IncompatibleNetwork { model: String, reason: String },

    #[error("no execution provider available for device {device}")]
    UnsupportedDevice { device: Device },

    #[error("model {model} is not ready for inference (state: {state:?})")]
    NotReady { model: String, state: ModelState },

    #[error("inference failed for model {model}: {reason}")]
    InferenceFailure { model: String, reason: String },

    #[error("model {model} produced no tensor named {name}")]
    MissingTensor { model: String, name: String },

    #[error("invalid input for model {model}: {reason}")]
    InvalidInput { model: String, reason: String },
}

impl ModelError {
    /// Errors that must abort startup instead of skipping a frame.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ModelError::ModelInit { .. }
                | ModelError::UnsupportedLayer { .. }
                | ModelError::IncompatibleNetwork { .. }
                | ModelError::UnsupportedDevice { .. }
                | ModelError::NotReady { .. }
        )
    }
}
