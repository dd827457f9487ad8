use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::WEIGHTS_EXTENSION;

use super::model_error::ModelError;

/// Location of a model on disk.
///
/// The weights path is implied by the structure path: same base name,
/// sibling extension. Models that embed their weights (ONNX) need no
/// weights file; when one exists it must be readable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelFiles {
    structure: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    pub fn from_structure(path: impl Into<PathBuf>) -> Self {
        let structure = path.into();
        let weights = structure.with_extension(WEIGHTS_EXTENSION);
        Self { structure, weights }
    }

    pub fn structure(&self) -> &Path {
        &self.structure
    }

    pub fn weights(&self) -> &Path {
        &self.weights
    }

    /// Short name used in logs: the structure file stem.
    pub fn name(&self) -> String {
        self.structure
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.structure.display().to_string())
    }

    /// Checks that the files can be handed to a backend parser.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.structure.is_file() {
            return Err(ModelError::ModelInit {
                path: self.structure.clone(),
                reason: "structure file not found; have you entered the correct model path?"
                    .into(),
            });
        }
        if self.weights.exists() {
            fs::File::open(&self.weights).map_err(|e| ModelError::ModelInit {
                path: self.weights.clone(),
                reason: format!("weights file unreadable: {e}"),
            })?;
        }
        Ok(())
    }
}
