// ============================================================
// Layer 2 — Keypoint Use Case
// ============================================================
// Step 1: Resolve the network config   (Layer 6 - infra)
// Step 2: Build the network            (Layer 5 - ml)
// Step 3: Run a checked forward pass   (Layer 5 - ml)
// Step 4: Map to pixel coordinates     (Layer 3 - domain)
//
// Images come from a seeded uniform generator: loading face
// datasets is outside this crate.

use std::path::PathBuf;

use anyhow::Result;
use burn::{prelude::*, tensor::Distribution};

use crate::domain::keypoints::{KeypointSet, Normalization};
use crate::infra::config_store::load_or_default;
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::keypoints::{KeypointNet, KeypointNetConfig};

#[derive(Debug, Clone)]
pub struct KeypointRequest {
    pub config:        Option<PathBuf>,
    pub batch_size:    usize,
    pub seed:          u64,
    pub normalization: Normalization,
}

#[derive(Debug, Clone)]
pub struct KeypointReport {
    pub num_params:  usize,
    pub input_shape: [usize; 4],
    /// One set per image, in pixel coordinates
    pub predictions: Vec<KeypointSet>,
}

pub struct KeypointUseCase {
    request: KeypointRequest,
}

impl KeypointUseCase {
    pub fn new(request: KeypointRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<KeypointReport> {
        let req = &self.request;
        anyhow::ensure!(req.batch_size > 0, "batch size must be at least 1");

        let cfg: KeypointNetConfig =
            load_or_default(req.config.as_ref(), KeypointNetConfig::standard)?;

        let device = default_device();
        let net: KeypointNet<InferBackend> = cfg.init(&device)?;
        let num_params = net.num_params();
        tracing::info!(
            "KeypointNet ready: {} conv blocks, {} parameters",
            net.blocks.len(), num_params
        );

        let input_shape = [req.batch_size, cfg.channels[0], cfg.input_size, cfg.input_size];
        InferBackend::seed(req.seed);
        let images = Tensor::<InferBackend, 4>::random(
            input_shape, Distribution::Uniform(0.0, 1.0), &device,
        );

        let predictions = net
            .predict(images)?
            .iter()
            .map(|set| set.denormalized(&req.normalization))
            .collect();

        Ok(KeypointReport { num_params, input_shape, predictions })
    }
}
