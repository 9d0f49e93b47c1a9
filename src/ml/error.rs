// ============================================================
// Layer 5 — Model Errors
// ============================================================
// Typed failures raised while building a network or feeding it
// tensors of the wrong shape. Everything above this layer works
// with anyhow and converts these via `?`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// A configuration that cannot produce a valid network
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input tensor whose dimensions the network cannot accept
    #[error("expected input of shape {expected}, got {actual:?}")]
    InputShape {
        expected: String,
        actual:   Vec<usize>,
    },

    #[error("caption tensor must contain at least one token")]
    EmptyCaption,

    #[error("batch size mismatch: features have {features}, captions have {captions}")]
    BatchMismatch { features: usize, captions: usize },

    /// Greedy sampling decodes one image at a time
    #[error("sampling expects a batch of exactly 1 feature vector, got {0}")]
    SampleBatch(usize),

    /// Reading values back out of a tensor failed
    #[error("tensor data error: {0}")]
    TensorData(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
