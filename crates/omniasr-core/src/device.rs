//! Inference device selection.
//!
//! Priority order: CUDA, then Metal, then CPU. The choice is forwarded to
//! the sidecar daemon verbatim; `OMNIASR_DEVICE` overrides detection.

use std::fmt;
use std::path::Path;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cuda,
    Metal,
    Cpu,
}

impl Device {
    pub fn detect() -> Self {
        if let Ok(forced) = std::env::var("OMNIASR_DEVICE") {
            match forced.trim().to_ascii_lowercase().as_str() {
                "cuda" => return Device::Cuda,
                "metal" | "mps" => return Device::Metal,
                "cpu" => return Device::Cpu,
                "" => {}
                other => warn!(device = other, "Unrecognized OMNIASR_DEVICE, autodetecting"),
            }
        }

        if cuda_available() {
            Device::Cuda
        } else if cfg!(target_os = "macos") {
            Device::Metal
        } else {
            Device::Cpu
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Metal => "mps",
            Device::Cpu => "cpu",
        }
    }
}

fn cuda_available() -> bool {
    if std::env::var("CUDA_VISIBLE_DEVICES")
        .map(|v| !v.trim().is_empty() && v.trim() != "-1")
        .unwrap_or(false)
    {
        return true;
    }
    Path::new("/proc/driver/nvidia/version").exists()
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
