// ============================================================
// Layer 2 — Caption Use Case
// ============================================================
// Step 1: Load the vocabulary, if any    (Layer 6 - infra)
// Step 2: Resolve the caption config     (Layer 6 - infra)
// Step 3: Build encoder + decoder        (Layer 5 - ml)
// Step 4: Greedy-sample one image        (Layer 5 - ml)
// Step 5: Decode ids to a sentence       (Layer 3 - domain)

use std::path::PathBuf;

use anyhow::Result;
use burn::{prelude::*, tensor::Distribution};

use crate::domain::traits::{IdDecoder, SentenceDecoder};
use crate::domain::vocabulary::Vocabulary;
use crate::infra::config_store::{load_or_default, load_vocabulary};
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::caption::{CaptionConfig, CaptionModel};

/// Vocabulary size assumed when neither a config nor a vocabulary is given.
pub const DEFAULT_VOCAB_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub config:     Option<PathBuf>,
    pub vocab:      Option<PathBuf>,
    pub image_size: usize,
    pub max_len:    Option<usize>,
    pub seed:       u64,
}

#[derive(Debug, Clone)]
pub struct CaptionReport {
    pub num_params: usize,
    pub ids:        Vec<usize>,
    pub sentence:   String,
}

pub struct CaptionUseCase {
    request: CaptionRequest,
}

impl CaptionUseCase {
    pub fn new(request: CaptionRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<CaptionReport> {
        let req = &self.request;
        anyhow::ensure!(req.image_size > 0, "image size must be positive");

        let vocab: Option<Vocabulary> = req.vocab.as_ref().map(|p| load_vocabulary(p)).transpose()?;
        let default_vocab = vocab.as_ref().map_or(DEFAULT_VOCAB_SIZE, Vocabulary::len);

        let mut cfg: CaptionConfig =
            load_or_default(req.config.as_ref(), || CaptionConfig::standard(default_vocab))?;
        if let Some(max_len) = req.max_len {
            cfg.sampling.max_len = max_len;
        }
        if let Some(v) = &vocab {
            if v.len() != cfg.decoder.vocab_size {
                tracing::warn!(
                    "Vocabulary has {} words but the decoder projects to {}",
                    v.len(), cfg.decoder.vocab_size
                );
            }
        }

        let device = default_device();
        let model: CaptionModel<InferBackend> = cfg.init(&device)?;
        let num_params = model.num_params();
        tracing::info!(
            "Caption model ready: feature_dim={}, {} LSTM layer(s), {} parameters",
            cfg.encoder.backbone.feature_dim(), cfg.decoder.num_layers, num_params
        );

        InferBackend::seed(req.seed);
        let image = Tensor::<InferBackend, 4>::random(
            [1, cfg.encoder.backbone.in_channels, req.image_size, req.image_size],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let ids = model.caption(image, &cfg.sampling)?;

        let decoder: Box<dyn SentenceDecoder> = match vocab {
            Some(v) => Box::new(v),
            None    => Box::new(IdDecoder),
        };
        let sentence = decoder.decode(&ids);

        Ok(CaptionReport { num_params, ids, sentence })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::{END_ID, START_ID};
    use crate::infra::config_store::save_json;
    use crate::ml::decoder::{DecoderConfig, SamplingConfig};
    use crate::ml::encoder::EncoderConfig;
    use crate::ml::resnet::ResNetConfig;

    fn write_tiny_setup(dir: &std::path::Path) -> (PathBuf, PathBuf) {
        let vocab = Vocabulary::from_words(["a", "cat", "on", "the", "mat"]);
        let cfg = CaptionConfig::new(
            EncoderConfig::new(8, ResNetConfig::new([1, 1, 1, 1]).with_base_width(2)),
            DecoderConfig::new(8, 16, vocab.len()),
            SamplingConfig::new().with_max_len(4),
        );
        let cfg_path   = dir.join("caption.json");
        let vocab_path = dir.join("vocab.json");
        save_json(&cfg, &cfg_path).unwrap();
        save_json(&vocab, &vocab_path).unwrap();
        (cfg_path, vocab_path)
    }

    #[test]
    fn test_execute_with_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let (cfg_path, vocab_path) = write_tiny_setup(dir.path());
        let report = CaptionUseCase::new(CaptionRequest {
            config:     Some(cfg_path),
            vocab:      Some(vocab_path),
            image_size: 32,
            max_len:    None,
            seed:       3,
        })
        .execute()
        .unwrap();

        assert!(!report.ids.is_empty() && report.ids.len() <= 5);
        // decoded words never include special tokens
        assert!(!report.sentence.contains("<start>"));
        assert!(!report.sentence.contains("<end>"));
    }

    #[test]
    fn test_max_len_override_and_id_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (cfg_path, _) = write_tiny_setup(dir.path());
        let report = CaptionUseCase::new(CaptionRequest {
            config:     Some(cfg_path),
            vocab:      None,
            image_size: 32,
            max_len:    Some(1),
            seed:       3,
        })
        .execute()
        .unwrap();

        assert!(report.ids.len() <= 2);
        let expected: Vec<String> = report.ids
            .iter()
            .take_while(|&&id| id != END_ID)
            .filter(|&&id| id != START_ID)
            .map(|id| id.to_string())
            .collect();
        assert_eq!(report.sentence, expected.join(" "));
    }
}
