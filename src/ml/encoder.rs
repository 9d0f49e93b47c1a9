// ============================================================
// Layer 5 — Caption Image Encoder
// ============================================================
// Frozen ResNet backbone + trainable linear embedding.
//
//   images [B, 3, H, W]
//     backbone (no grad)  [B, feature_dim, 1, 1]
//     flatten             [B, feature_dim]
//     embed               [B, embed_size]

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
};

use crate::ml::error::{ModelError, ModelResult};
use crate::ml::resnet::{ResNet, ResNetConfig};

#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub embed_size: usize,
    pub backbone:   ResNetConfig,
}

impl EncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ModelResult<EncoderCnn<B>> {
        if self.embed_size == 0 {
            return Err(ModelError::InvalidConfig("encoder embed_size must be positive".into()));
        }
        // Backbone parameters never receive gradients; only `embed` trains.
        let backbone = self.backbone.init(device)?.no_grad();
        let embed    = LinearConfig::new(self.backbone.feature_dim(), self.embed_size).init(device);
        Ok(EncoderCnn { backbone, embed })
    }
}

#[derive(Module, Debug)]
pub struct EncoderCnn<B: Backend> {
    pub backbone: ResNet<B>,
    pub embed:    Linear<B>,
}

impl<B: Backend> EncoderCnn<B> {
    /// images: [batch, channels, H, W] → [batch, embed_size]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.backbone.forward(images).detach();
        let features = features.flatten::<2>(1, 3);
        self.embed.forward(features)
    }

    pub fn embed_size(&self) -> usize {
        self.embed.weight.val().dims()[1]
    }
}
