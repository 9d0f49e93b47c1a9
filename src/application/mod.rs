// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates config loading, model construction and a
// forward pass. No tensor math and no printing here.

// Keypoint regression on a smoke batch
pub mod keypoint_use_case;

// Greedy caption generation for a single image
pub mod caption_use_case;
