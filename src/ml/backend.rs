// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// The CLI runs on the CPU ndarray backend unless the crate is
// built with `--features wgpu`. Training steps wrap the chosen
// backend in Autodiff.

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

pub type InferDevice = <InferBackend as burn::tensor::backend::Backend>::Device;

/// The default device of the selected backend.
pub fn default_device() -> InferDevice {
    InferDevice::default()
}

/// Human readable backend name for log lines.
pub fn backend_name() -> &'static str {
    if cfg!(feature = "wgpu") { "wgpu" } else { "ndarray" }
}
