use std::fmt;
use std::str::FromStr;

/// Compute device a model is bound to at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Device {
    #[default]
    Cpu,
    /// The platform's preferred accelerator.
    Gpu,
    Cuda,
    CoreMl,
    DirectMl,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Device::Cpu => "CPU",
            Device::Gpu => "GPU",
            Device::Cuda => "CUDA",
            Device::CoreMl => "COREML",
            Device::DirectMl => "DIRECTML",
        };
        f.write_str(name)
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CPU" => Ok(Device::Cpu),
            "GPU" => Ok(Device::Gpu),
            "CUDA" => Ok(Device::Cuda),
            "COREML" => Ok(Device::CoreMl),
            "DIRECTML" => Ok(Device::DirectMl),
            _ => Err(format!(
                "unknown device '{s}' (expected CPU, GPU, CUDA, COREML or DIRECTML)"
            )),
        }
    }
}
