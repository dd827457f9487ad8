use ort::execution_providers::ExecutionProviderDispatch;

use crate::inference::domain::device::Device;
use crate::inference::domain::model_error::ModelError;

/// Execution providers that bind a session to `device`.
///
/// Accelerator providers are registered with `error_on_failure` so that a
/// missing runtime aborts the load instead of silently running on CPU.
pub fn execution_providers_for(
    device: Device,
) -> Result<Vec<ExecutionProviderDispatch>, ModelError> {
    match device {
        Device::Cpu => Ok(vec![
            ort::execution_providers::CPUExecutionProvider::default().build(),
        ]),
        Device::Gpu => preferred_accelerator(),
        Device::Cuda => Ok(vec![ort::execution_providers::CUDAExecutionProvider::default()
            .build()
            .error_on_failure()]),
        Device::CoreMl => coreml(),
        Device::DirectMl => directml(),
    }
}

fn preferred_accelerator() -> Result<Vec<ExecutionProviderDispatch>, ModelError> {
    #[cfg(target_os = "macos")]
    {
        coreml()
    }
    #[cfg(target_os = "windows")]
    {
        directml()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        execution_providers_for(Device::Cuda)
    }
}

fn coreml() -> Result<Vec<ExecutionProviderDispatch>, ModelError> {
    #[cfg(target_os = "macos")]
    {
        Ok(vec![ort::execution_providers::CoreMLExecutionProvider::default()
            .build()
            .error_on_failure()])
    }
    #[cfg(not(target_os = "macos"))]
    {
        Err(ModelError::UnsupportedDevice {
            device: Device::CoreMl,
        })
    }
}

fn directml() -> Result<Vec<ExecutionProviderDispatch>, ModelError> {
    #[cfg(target_os = "windows")]
    {
        Ok(vec![ort::execution_providers::DirectMLExecutionProvider::default()
            .build()
            .error_on_failure()])
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(ModelError::UnsupportedDevice {
            device: Device::DirectMl,
        })
    }
}
