//! # Device Placement
//!
//! Where the network lives is decided once, when it is built, and never changes.
//! Each backend knows how to turn a [`Placement`] into one of its own devices.

use crate::error::NetError;
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::tensor::backend::Backend;

/// General-purpose processor or accelerator
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Placement {
    #[default]
    Cpu,
    Gpu,
}

impl Placement {
    pub fn from_use_gpu(use_gpu: bool) -> Self {
        if use_gpu { Placement::Gpu } else { Placement::Cpu }
    }
}

/// Backends that can resolve a [`Placement`] into a concrete device
pub trait DevicePlacement: Backend {
    fn resolve_device(placement: Placement) -> Result<Self::Device, NetError>;
}

impl DevicePlacement for NdArray {
    fn resolve_device(placement: Placement) -> Result<Self::Device, NetError> {
        match placement {
            Placement::Cpu => Ok(NdArrayDevice::Cpu),
            Placement::Gpu => Err(NetError::DeviceUnavailable(placement)),
        }
    }
}

#[cfg(feature = "gpu")]
impl DevicePlacement for burn::backend::Wgpu {
    fn resolve_device(placement: Placement) -> Result<Self::Device, NetError> {
        use burn::backend::wgpu::WgpuDevice;
        match placement {
            Placement::Cpu => Ok(WgpuDevice::Cpu),
            Placement::Gpu => Ok(WgpuDevice::DefaultDevice),
        }
    }
}

impl<B: DevicePlacement> DevicePlacement for Autodiff<B> {
    fn resolve_device(placement: Placement) -> Result<Self::Device, NetError> {
        B::resolve_device(placement)
    }
}

/// CPU backend used when nothing else is asked for
pub type CpuBackend = Autodiff<NdArray>;

#[cfg(feature = "gpu")]
pub type GpuBackend = Autodiff<burn::backend::Wgpu>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_resolves_on_ndarray() {
        let device = CpuBackend::resolve_device(Placement::from_use_gpu(false)).unwrap();
        assert_eq!(device, NdArrayDevice::Cpu);
    }

    #[test]
    fn test_gpu_unavailable_on_ndarray() {
        let result = CpuBackend::resolve_device(Placement::from_use_gpu(true));
        assert!(matches!(result, Err(NetError::DeviceUnavailable(Placement::Gpu))));
    }
}
