//! ONNX Runtime backend.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ort::session::{Session, SessionInputValue, SessionInputs};

use crate::inference::domain::device::Device;
use crate::inference::domain::inference_backend::{
    ExecutableNetwork, InferenceBackend, NetworkDescription,
};
use crate::inference::domain::model_error::ModelError;
use crate::inference::domain::model_files::ModelFiles;
use crate::inference::domain::tensors::{NamedTensors, RawOutput};

use super::execution_provider::execution_providers_for;
use super::onnx_graph::{operation_domain, read_onnx};

/// Operator domains ONNX Runtime ships kernels for.
const BUILTIN_DOMAINS: &[&str] = &["", "ai.onnx.ml", "com.microsoft"];

/// Process-wide ONNX Runtime context.
///
/// An optional custom-operator library is registered on every session; its
/// presence also marks custom domains as supported during the layer check.
#[derive(Debug, Default)]
pub struct OrtBackend {
    extension: Option<PathBuf>,
}

impl OrtBackend {
    pub fn new(extension: Option<PathBuf>) -> Result<Self, ModelError> {
        if let Some(path) = &extension {
            if !path.is_file() {
                return Err(ModelError::ModelInit {
                    path: path.clone(),
                    reason: "extension library not found".into(),
                });
            }
            log::info!("Using custom operator library {}", path.display());
        }
        Ok(Self { extension })
    }

    pub fn extension(&self) -> Option<&Path> {
        self.extension.as_deref()
    }

    fn build_session(&self, network: &NetworkDescription, device: Device) -> Result<Session, ModelError> {
        let init_error = |reason: String| ModelError::ModelInit {
            path: network.files.structure().to_path_buf(),
            reason,
        };
        let providers = execution_providers_for(device)?;

        let mut builder = Session::builder()
            .map_err(|e| init_error(e.to_string()))?
            .with_execution_providers(providers)
            .map_err(|e| {
                log::error!("Execution provider for {device} failed to register: {e}");
                ModelError::UnsupportedDevice { device }
            })?;
        if let Some(library) = &self.extension {
            builder = builder
                .with_operator_library(library)
                .map_err(|e| init_error(format!("extension library rejected: {e}")))?;
        }

        builder
            .commit_from_file(network.files.structure())
            .map_err(|e| {
                let reason = e.to_string();
                if reason.contains("NOT_IMPLEMENTED") || reason.contains("Could not find an implementation") {
                    ModelError::UnsupportedLayer {
                        model: network.name.clone(),
                        device,
                        layers: vec![reason],
                    }
                } else {
                    init_error(reason)
                }
            })
    }
}

impl InferenceBackend for OrtBackend {
    fn read_network(&self, files: &ModelFiles) -> Result<NetworkDescription, ModelError> {
        read_onnx(files)
    }

    fn query_network(
        &self,
        network: &NetworkDescription,
        _device: Device,
    ) -> Result<BTreeSet<String>, ModelError> {
        // Nodes an accelerator cannot take fall back to the CPU kernels, so
        // support depends on the operator domain only.
        let custom_allowed = self.extension.is_some();
        Ok(network
            .operations
            .iter()
            .filter(|op| custom_allowed || BUILTIN_DOMAINS.contains(&operation_domain(op)))
            .cloned()
            .collect())
    }

    fn load_network(
        &self,
        network: &NetworkDescription,
        device: Device,
    ) -> Result<Box<dyn ExecutableNetwork>, ModelError> {
        let session = self.build_session(network, device)?;
        Ok(Box::new(OrtNetwork {
            session,
            name: network.name.clone(),
            output_names: network.outputs.clone(),
        }))
    }
}

struct OrtNetwork {
    session: Session,
    name: String,
    output_names: Vec<String>,
}

impl OrtNetwork {
    fn failure(&self, reason: impl ToString) -> ModelError {
        ModelError::InferenceFailure {
            model: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ExecutableNetwork for OrtNetwork {
    fn infer(&mut self, inputs: NamedTensors) -> Result<RawOutput, ModelError> {
        let mut feeds = Vec::with_capacity(inputs.len());
        for (name, array) in inputs {
            let tensor = ort::value::Tensor::from_array(array).map_err(|e| self.failure(e))?;
            feeds.push((Cow::Owned(name), SessionInputValue::from(tensor.into_dyn())));
        }
        let feeds: SessionInputs<'_, '_> = SessionInputs::ValueMap(feeds);

        let outputs = self.session.run(feeds).map_err(|e| ModelError::InferenceFailure {
            model: self.name.clone(),
            reason: e.to_string(),
        })?;

        let mut tensors = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let value = outputs.get(name.as_str()).ok_or_else(|| ModelError::MissingTensor {
                model: self.name.clone(),
                name: name.clone(),
            })?;
            let array = value
                .try_extract_array::<f32>()
                .map_err(|e| ModelError::InferenceFailure {
                    model: self.name.clone(),
                    reason: format!("output {name} is not f32: {e}"),
                })?;
            tensors.push((name.clone(), array.to_owned()));
        }
        Ok(RawOutput::new(tensors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(ops: &[&str]) -> NetworkDescription {
        NetworkDescription {
            name: "landmarks".into(),
            files: ModelFiles::from_structure("landmarks-regression-retail-0009.onnx"),
            inputs: Vec::new(),
            outputs: vec!["95".into()],
            operations: ops.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_builtin_domains_are_supported() {
        let backend = OrtBackend::default();
        let net = network(&["Conv", "ai.onnx.ml::Scaler", "com.microsoft::FusedConv"]);
        let supported = backend.query_network(&net, Device::Cpu).unwrap();
        assert_eq!(supported, net.operations);
    }

    #[test]
    fn test_custom_domain_needs_extension() {
        let backend = OrtBackend::default();
        let net = network(&["Conv", "org.openvinotoolkit::DetectionOutput"]);
        let supported = backend.query_network(&net, Device::Cpu).unwrap();
        assert!(supported.contains("Conv"));
        assert!(!supported.contains("org.openvinotoolkit::DetectionOutput"));
    }

    #[test]
    fn test_extension_enables_custom_domains() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("libcustom_ops.so");
        std::fs::write(&library, b"").unwrap();
        let backend = OrtBackend::new(Some(library.clone())).unwrap();
        assert_eq!(backend.extension(), Some(library.as_path()));

        let net = network(&["org.openvinotoolkit::DetectionOutput"]);
        assert_eq!(backend.query_network(&net, Device::Cpu).unwrap(), net.operations);
    }

    #[test]
    fn test_missing_extension_is_fatal() {
        let err = OrtBackend::new(Some(PathBuf::from("/nonexistent/libops.so"))).unwrap_err();
        assert!(err.is_fatal());
    }
}
