// ============================================================
// Layer 5 — CNN-LSTM Captioning Model
// ============================================================
// Holds encoder and decoder in one module tree so a single
// optimiser sees every trainable parameter (encoder.embed and
// the whole decoder). The frozen backbone contributes none.

use burn::prelude::*;

use crate::ml::decoder::{DecoderConfig, DecoderRnn, SamplingConfig};
use crate::ml::encoder::{EncoderCnn, EncoderConfig};
use crate::ml::error::{ModelError, ModelResult};
use crate::ml::resnet::ResNetConfig;

#[derive(Config, Debug)]
pub struct CaptionConfig {
    pub encoder:  EncoderConfig,
    pub decoder:  DecoderConfig,
    pub sampling: SamplingConfig,
}

impl CaptionConfig {
    /// ResNet-50 encoder, single layer LSTM, 256-d embeddings.
    pub fn standard(vocab_size: usize) -> Self {
        Self::new(
            EncoderConfig::new(256, ResNetConfig::resnet50()),
            DecoderConfig::new(256, 512, vocab_size),
            SamplingConfig::new(),
        )
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ModelResult<CaptionModel<B>> {
        if self.encoder.embed_size != self.decoder.embed_size {
            return Err(ModelError::InvalidConfig(format!(
                "encoder embeds to {} but decoder expects {}",
                self.encoder.embed_size, self.decoder.embed_size
            )));
        }
        Ok(CaptionModel {
            encoder: self.encoder.init(device)?,
            decoder: self.decoder.init(device)?,
        })
    }
}

#[derive(Module, Debug)]
pub struct CaptionModel<B: Backend> {
    pub encoder: EncoderCnn<B>,
    pub decoder: DecoderRnn<B>,
}

impl<B: Backend> CaptionModel<B> {
    /// images [B, 3, H, W], captions [B, T] → logits [B, T, vocab]
    pub fn forward(
        &self,
        images:   Tensor<B, 4>,
        captions: Tensor<B, 2, Int>,
    ) -> ModelResult<Tensor<B, 3>> {
        self.decoder.forward(self.encoder.forward(images), captions)
    }

    pub fn forward_loss(
        &self,
        images:   Tensor<B, 4>,
        captions: Tensor<B, 2, Int>,
    ) -> ModelResult<(Tensor<B, 1>, Tensor<B, 3>)> {
        self.decoder.forward_loss(self.encoder.forward(images), captions)
    }

    /// Greedy caption ids for a single image [1, 3, H, W].
    pub fn caption(
        &self,
        image:   Tensor<B, 4>,
        options: &SamplingConfig,
    ) -> ModelResult<Vec<usize>> {
        let [batch, ..] = image.dims();
        if batch != 1 {
            return Err(ModelError::SampleBatch(batch));
        }
        self.decoder.sample(self.encoder.forward(image), options)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> CaptionConfig {
        CaptionConfig::new(
            EncoderConfig::new(8, ResNetConfig::new([1, 1, 1, 1]).with_base_width(2)),
            DecoderConfig::new(8, 16, 12),
            SamplingConfig::new().with_max_len(6),
        )
    }

    #[test]
    fn test_standard_config_sizes() {
        let cfg = CaptionConfig::standard(9955);
        assert_eq!(cfg.encoder.backbone.feature_dim(), 2048);
        assert_eq!(cfg.decoder.vocab_size, 9955);
        assert_eq!(cfg.sampling.max_len, 20);
        assert_eq!(cfg.sampling.end_token, 1);
    }

    #[test]
    fn test_mismatched_embed_sizes_rejected() {
        let mut cfg = tiny_config();
        cfg.decoder.embed_size = 4;
        assert!(matches!(
            cfg.init::<TestBackend>(&Default::default()),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_backbone_rejected_before_forward() {
        let device = Default::default();
        let mut cfg = tiny_config();
        cfg.encoder.backbone = ResNetConfig::new([1, 1, 1, 0]).with_base_width(2);
        assert!(matches!(
            cfg.init::<TestBackend>(&device),
            Err(ModelError::InvalidConfig(_))
        ));

        cfg.encoder.backbone = ResNetConfig::new([1, 1, 1, 1]).with_base_width(0);
        assert!(cfg.init::<TestBackend>(&device).is_err());
    }

    #[test]
    fn test_end_to_end_forward_and_caption() {
        let device = Default::default();
        let cfg = tiny_config();
        let model: CaptionModel<TestBackend> = cfg.init(&device).unwrap();

        let images   = Tensor::<TestBackend, 4>::zeros([2, 3, 32, 32], &device);
        let captions = Tensor::<TestBackend, 2, Int>::zeros([2, 5], &device);
        assert_eq!(model.forward(images, captions).unwrap().dims(), [2, 5, 12]);

        let image = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        let ids = model.caption(image, &cfg.sampling).unwrap();
        assert!(!ids.is_empty() && ids.len() <= 7);
    }

    #[test]
    fn test_caption_rejects_batches() {
        let device = Default::default();
        let cfg = tiny_config();
        let model: CaptionModel<TestBackend> = cfg.init(&device).unwrap();
        let images = Tensor::<TestBackend, 4>::zeros([2, 3, 32, 32], &device);
        assert_eq!(model.caption(images, &cfg.sampling).unwrap_err(), ModelError::SampleBatch(2));
    }
}
