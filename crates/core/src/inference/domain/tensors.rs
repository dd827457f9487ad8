use ndarray::ArrayD;

use super::model_error::ModelError;

/// Input tensors for one inference call, keyed by the network's input names.
pub type NamedTensors = Vec<(String, ArrayD<f32>)>;

/// Declared name and shape of a network input. Dynamic dimensions are `-1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: String,
    pub shape: Vec<i64>,
}

impl TensorSpec {
    pub fn new(name: impl Into<String>, shape: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// `(width, height)` of an NCHW image input, if both are static.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        if self.shape.len() != 4 {
            return None;
        }
        let h = u32::try_from(self.shape[2]).ok().filter(|&h| h > 0)?;
        let w = u32::try_from(self.shape[3]).ok().filter(|&w| w > 0)?;
        Some((w, h))
    }
}

/// Tensors produced by one inference call, in the network's output order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawOutput {
    tensors: Vec<(String, ArrayD<f32>)>,
}

impl RawOutput {
    pub fn new(tensors: Vec<(String, ArrayD<f32>)>) -> Self {
        Self { tensors }
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.tensors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn first(&self) -> Option<&ArrayD<f32>> {
        self.tensors.first().map(|(_, t)| t)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.iter().map(|(n, _)| n.as_str())
    }

    /// Named tensor, or `MissingTensor` attributed to `model`.
    pub fn require(&self, model: &str, name: &str) -> Result<&ArrayD<f32>, ModelError> {
        self.get(name).ok_or_else(|| ModelError::MissingTensor {
            model: model.to_string(),
            name: name.to_string(),
        })
    }

    /// First output tensor, for single-output networks.
    pub fn require_first(&self, model: &str) -> Result<&ArrayD<f32>, ModelError> {
        self.first().ok_or_else(|| ModelError::MissingTensor {
            model: model.to_string(),
            name: "<output 0>".to_string(),
        })
    }
}
