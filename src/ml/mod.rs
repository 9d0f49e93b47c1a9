// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework code lives here. Other layers see plain
// Rust values (KeypointSet, Vec<usize>) or go through the use
// cases.
//
//   keypoints.rs — conv/pool stack + MLP head, 68 (x, y) pairs
//   resnet.rs    — bottleneck ResNet up to the average pool
//   encoder.rs   — frozen ResNet + linear embedding
//   decoder.rs   — embedding + stacked LSTM, greedy sampler
//   caption.rs   — encoder and decoder as one module
//   trainer.rs   — a single Adam step for either model
//   backend.rs   — ndarray / wgpu selection
//   error.rs     — typed model errors
//
// Reference: Burn Book §3 (Building Blocks)
//            Vinyals et al. (2015) Show and Tell

pub mod backend;
pub mod error;

/// Facial keypoint regression network
pub mod keypoints;

/// ResNet feature backbone
pub mod resnet;

/// Caption image encoder
pub mod encoder;

/// Caption LSTM decoder with greedy sampling
pub mod decoder;

/// Encoder + decoder captioning model
pub mod caption;

/// Single optimisation step for both models
pub mod trainer;
