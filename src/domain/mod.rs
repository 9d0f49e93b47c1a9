// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by the use cases and the CLI.
// Nothing in here imports Burn: tensors are converted to these
// types at the edge of the ml layer.

// Keypoints, keypoint sets and coordinate normalisation
pub mod keypoints;

// Word table used to decode sampled captions
pub mod vocabulary;

// Core abstractions (traits) that other layers implement
pub mod traits;
