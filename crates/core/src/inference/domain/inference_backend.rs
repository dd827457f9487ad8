use std::collections::BTreeSet;

use super::device::Device;
use super::model_error::ModelError;
use super::model_files::ModelFiles;
use super::tensors::{NamedTensors, RawOutput, TensorSpec};

/// A parsed, not yet executable network.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkDescription {
    pub name: String,
    pub files: ModelFiles,
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<String>,
    /// Operations the network needs, as `domain::op_type` (default domain bare).
    pub operations: BTreeSet<String>,
}

impl NetworkDescription {
    pub fn input(&self, name: &str) -> Option<&TensorSpec> {
        self.inputs.iter().find(|i| i.name == name)
    }
}

/// Inference provider a model is bound to.
///
/// One backend context is created per process and handed by reference to
/// every model that needs it; models never reach for a global engine.
pub trait InferenceBackend: Send {
    /// Parses model files into a description without binding a device.
    fn read_network(&self, files: &ModelFiles) -> Result<NetworkDescription, ModelError>;

    /// Operations from `network` that this backend can execute on `device`.
    fn query_network(
        &self,
        network: &NetworkDescription,
        device: Device,
    ) -> Result<BTreeSet<String>, ModelError>;

    /// Compiles the network for `device`.
    fn load_network(
        &self,
        network: &NetworkDescription,
        device: Device,
    ) -> Result<Box<dyn ExecutableNetwork>, ModelError>;
}

/// A network compiled for a device, ready to run.
///
/// `infer` blocks until the backend returns; `&mut self` keeps a single
/// request in flight per network.
pub trait ExecutableNetwork: Send {
    fn infer(&mut self, inputs: NamedTensors) -> Result<RawOutput, ModelError>;
}
