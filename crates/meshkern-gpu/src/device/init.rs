/// Initialization parameters for the headless GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub power_preference: wgpu::PowerPreference,

    /// Request a software adapter (e.g. llvmpipe or WARP).
    pub force_fallback_adapter: bool,

    pub backends: wgpu::Backends,

    /// Required wgpu features.
    ///
    /// None of the kernels need one; keep this empty unless the host adds
    /// pipelines of its own.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            backends: wgpu::Backends::all(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

impl GpuInit {
    /// Settings for CI machines without a hardware adapter.
    pub fn fallback() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: true,
            ..Self::default()
        }
    }
}
