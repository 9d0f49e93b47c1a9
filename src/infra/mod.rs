// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   config_store.rs — JSON persistence for model configs and
//                     caption vocabularies (serde_json)
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Model config and vocabulary persistence
pub mod config_store;
