//! In-memory backend for exercising models and stages without a runtime.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use ndarray::ArrayD;
use tempfile::TempDir;

use super::domain::device::Device;
use super::domain::inference_backend::{ExecutableNetwork, InferenceBackend, NetworkDescription};
use super::domain::model_error::ModelError;
use super::domain::model_files::ModelFiles;
use super::domain::tensors::{NamedTensors, RawOutput, TensorSpec};

type Responses = Arc<Mutex<VecDeque<Result<RawOutput, ModelError>>>>;

/// Creates an empty structure file named `<name>.onnx` inside `dir`.
pub(crate) fn model_file(dir: &TempDir, name: &str) -> ModelFiles {
    let path = dir.path().join(format!("{name}.onnx"));
    std::fs::write(&path, b"scripted").unwrap();
    ModelFiles::from_structure(path)
}

/// Backend that replays queued outputs and records every input it receives.
pub(crate) struct ScriptedBackend {
    inputs: Vec<TensorSpec>,
    outputs: Vec<String>,
    operations: BTreeSet<String>,
    supported: Option<BTreeSet<String>>,
    fail_load: bool,
    responses: Responses,
    received: Arc<Mutex<Vec<NamedTensors>>>,
    loads: Arc<Mutex<usize>>,
}

impl ScriptedBackend {
    pub(crate) fn new(inputs: Vec<TensorSpec>, outputs: &[&str]) -> Self {
        Self {
            inputs,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            operations: BTreeSet::new(),
            supported: None,
            fail_load: false,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            received: Arc::new(Mutex::new(Vec::new())),
            loads: Arc::new(Mutex::new(0)),
        }
    }

    pub(crate) fn with_operations(mut self, ops: &[&str]) -> Self {
        self.operations = ops.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Restricts the supported set; by default every operation is supported.
    pub(crate) fn with_supported(mut self, ops: &[&str]) -> Self {
        self.supported = Some(ops.iter().map(|s| s.to_string()).collect());
        self
    }

    pub(crate) fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub(crate) fn push_output(&self, tensors: Vec<(&str, ArrayD<f32>)>) {
        let output = RawOutput::new(
            tensors
                .into_iter()
                .map(|(n, t)| (n.to_string(), t))
                .collect(),
        );
        self.responses.lock().unwrap().push_back(Ok(output));
    }

    pub(crate) fn push_failure(&self, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ModelError::InferenceFailure {
                model: "scripted".into(),
                reason: reason.into(),
            }));
    }

    pub(crate) fn received(&self) -> Vec<NamedTensors> {
        self.received.lock().unwrap().clone()
    }

    pub(crate) fn inference_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub(crate) fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

impl InferenceBackend for ScriptedBackend {
    fn read_network(&self, files: &ModelFiles) -> Result<NetworkDescription, ModelError> {
        Ok(NetworkDescription {
            name: files.name(),
            files: files.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            operations: self.operations.clone(),
        })
    }

    fn query_network(
        &self,
        network: &NetworkDescription,
        _device: Device,
    ) -> Result<BTreeSet<String>, ModelError> {
        Ok(match &self.supported {
            Some(supported) => supported.clone(),
            None => network.operations.clone(),
        })
    }

    fn load_network(
        &self,
        network: &NetworkDescription,
        device: Device,
    ) -> Result<Box<dyn ExecutableNetwork>, ModelError> {
        if self.fail_load {
            return Err(ModelError::UnsupportedDevice { device });
        }
        *self.loads.lock().unwrap() += 1;
        Ok(Box::new(ScriptedNetwork {
            name: network.name.clone(),
            responses: self.responses.clone(),
            received: self.received.clone(),
        }))
    }
}

struct ScriptedNetwork {
    name: String,
    responses: Responses,
    received: Arc<Mutex<Vec<NamedTensors>>>,
}

impl ExecutableNetwork for ScriptedNetwork {
    fn infer(&mut self, inputs: NamedTensors) -> Result<RawOutput, ModelError> {
        self.received.lock().unwrap().push(inputs);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::InferenceFailure {
                    model: self.name.clone(),
                    reason: "no scripted response".into(),
                })
            })
    }
}
