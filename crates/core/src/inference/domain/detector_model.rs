use std::time::{Duration, Instant};

use ndarray::ArrayD;

use crate::shared::frame::Frame;

use super::device::Device;
use super::inference_backend::{ExecutableNetwork, InferenceBackend, NetworkDescription};
use super::model_error::ModelError;
use super::model_files::ModelFiles;
use super::preprocess::{image_to_tensor, ChannelOrder};
use super::tensors::{NamedTensors, RawOutput, TensorSpec};

/// Lifecycle of a [`DetectorModel`].
///
/// `Unloaded`: files parsed. `Loaded`: every required operation is supported
/// on the target device. `Ready`: compiled and accepting `predict` calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loaded,
    Ready,
}

/// One backend-bound network shared by every pipeline stage.
///
/// Stages own a `DetectorModel` and add only their output decoding on top.
pub struct DetectorModel {
    network: NetworkDescription,
    device: Device,
    channel_order: ChannelOrder,
    state: ModelState,
    executable: Option<Box<dyn ExecutableNetwork>>,
    last_inference: Duration,
}

impl DetectorModel {
    /// Parses the model files. Nothing is bound to a device yet.
    pub fn new(
        backend: &dyn InferenceBackend,
        files: ModelFiles,
        device: Device,
    ) -> Result<Self, ModelError> {
        files.validate()?;
        let network = backend.read_network(&files)?;
        log::debug!(
            "Parsed model {} ({} inputs, {} operations)",
            network.name,
            network.inputs.len(),
            network.operations.len()
        );
        Ok(Self {
            network,
            device,
            channel_order: ChannelOrder::default(),
            state: ModelState::Unloaded,
            executable: None,
            last_inference: Duration::ZERO,
        })
    }

    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = order;
        self
    }

    pub fn name(&self) -> &str {
        &self.network.name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn network(&self) -> &NetworkDescription {
        &self.network
    }

    /// Duration of the most recent successful inference.
    pub fn last_inference_duration(&self) -> Duration {
        self.last_inference
    }

    /// Required operations the backend cannot run on this model's device.
    pub fn unsupported_layers(
        &self,
        backend: &dyn InferenceBackend,
    ) -> Result<Vec<String>, ModelError> {
        let supported = backend.query_network(&self.network, self.device)?;
        Ok(self
            .network
            .operations
            .difference(&supported)
            .cloned()
            .collect())
    }

    /// `Unloaded -> Loaded`: fails when any required operation is unsupported.
    pub fn check_layers(&mut self, backend: &dyn InferenceBackend) -> Result<(), ModelError> {
        if self.state != ModelState::Unloaded {
            return Ok(());
        }
        let unsupported = self.unsupported_layers(backend)?;
        if !unsupported.is_empty() {
            log::error!(
                "Found unsupported layers in {} for {}: {:?}",
                self.network.name,
                self.device,
                unsupported
            );
            log::error!("Check whether an extension library provides these layers");
            return Err(ModelError::UnsupportedLayer {
                model: self.network.name.clone(),
                device: self.device,
                layers: unsupported,
            });
        }
        self.state = ModelState::Loaded;
        Ok(())
    }

    /// Checks layer support, then compiles the network for the device.
    pub fn load(&mut self, backend: &dyn InferenceBackend) -> Result<(), ModelError> {
        if self.state == ModelState::Ready {
            return Ok(());
        }
        self.check_layers(backend)?;
        let executable = backend.load_network(&self.network, self.device)?;
        self.executable = Some(executable);
        self.state = ModelState::Ready;
        log::info!("Loaded model {} on {}", self.network.name, self.device);
        Ok(())
    }

    /// Name of the network's first declared input.
    pub fn primary_input(&self) -> Result<&str, ModelError> {
        self.network
            .inputs
            .first()
            .map(|i| i.name.as_str())
            .ok_or_else(|| self.invalid_input("network declares no inputs"))
    }

    /// `(width, height)` expected by an image input.
    pub fn image_input_size(&self, input: &str) -> Result<(u32, u32), ModelError> {
        let spec = self
            .network
            .input(input)
            .ok_or_else(|| self.invalid_input(format!("no input named {input}")))?;
        spec.image_size().ok_or_else(|| {
            self.invalid_input(format!(
                "input {input} has no static NCHW shape: {:?}",
                spec.shape
            ))
        })
    }

    /// Fails unless every named input is a static NCHW image.
    ///
    /// Stages call this before `load` so a mismatched network aborts startup
    /// instead of failing on every frame.
    pub fn expect_image_inputs(&self, names: &[&str]) -> Result<(), ModelError> {
        for name in names {
            let spec = self.expect_input(name)?;
            if spec.image_size().is_none() {
                return Err(self.incompatible(format!(
                    "input {name} has no static NCHW shape: {:?}",
                    spec.shape
                )));
            }
        }
        Ok(())
    }

    /// Fails unless the network's first input is a static NCHW image.
    pub fn expect_primary_image_input(&self) -> Result<(), ModelError> {
        let first = self
            .network
            .inputs
            .first()
            .ok_or_else(|| self.incompatible("network declares no inputs"))?;
        self.expect_image_inputs(&[first.name.as_str()])
    }

    /// Declared shape of a required input.
    pub fn expect_input(&self, name: &str) -> Result<&TensorSpec, ModelError> {
        self.network.input(name).ok_or_else(|| {
            let declared: Vec<&str> = self.network.inputs.iter().map(|i| i.name.as_str()).collect();
            self.incompatible(format!("no input named {name} (declared: {declared:?})"))
        })
    }

    /// Resizes, reorders and batches an image for the named input.
    pub fn preprocess(&self, input: &str, image: &Frame) -> Result<ArrayD<f32>, ModelError> {
        let size = self.image_input_size(input)?;
        image_to_tensor(image, size, self.channel_order)
            .map(|t| t.into_dyn())
            .map_err(|reason| self.invalid_input(reason))
    }

    /// Runs one inference. Only valid in the `Ready` state.
    pub fn predict(&mut self, inputs: NamedTensors) -> Result<RawOutput, ModelError> {
        let Some(executable) = self
            .executable
            .as_mut()
            .filter(|_| self.state == ModelState::Ready)
        else {
            return Err(ModelError::NotReady {
                model: self.network.name.clone(),
                state: self.state,
            });
        };

        let start = Instant::now();
        match executable.infer(inputs) {
            Ok(output) => {
                self.last_inference = start.elapsed();
                Ok(output)
            }
            Err(e) => {
                self.last_inference = Duration::ZERO;
                Err(e)
            }
        }
    }

    /// Pre-processes `image` for the primary input and runs inference.
    pub fn predict_image(&mut self, image: &Frame) -> Result<RawOutput, ModelError> {
        let input = self.primary_input()?.to_string();
        let tensor = self.preprocess(&input, image)?;
        self.predict(vec![(input, tensor)])
    }

    fn incompatible(&self, reason: impl Into<String>) -> ModelError {
        ModelError::IncompatibleNetwork {
            model: self.network.name.clone(),
            reason: reason.into(),
        }
    }

    fn invalid_input(&self, reason: impl Into<String>) -> ModelError {
        ModelError::InvalidInput {
            model: self.network.name.clone(),
            reason: reason.into(),
        }
    }
}
