// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `keypoints`, `caption` and `init-config`.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::application::caption_use_case::CaptionRequest;
use crate::application::keypoint_use_case::KeypointRequest;
use crate::domain::keypoints::Normalization;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the keypoint network and run it on a random batch
    Keypoints(KeypointArgs),

    /// Build the captioning model and sample a caption for a random image
    Caption(CaptionArgs),

    /// Write a default model configuration to a JSON file
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
pub struct KeypointArgs {
    /// JSON network config (defaults to the 1-32-64 / 96x96 network)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of images in the smoke batch
    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Seed for the random input batch
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Pixel-space centre used to undo target normalisation
    #[arg(long, default_value_t = 100.0)]
    pub mean: f32,

    /// Pixel-space scale used to undo target normalisation
    #[arg(long, default_value_t = 50.0)]
    pub std: f32,
}

impl From<KeypointArgs> for KeypointRequest {
    fn from(a: KeypointArgs) -> Self {
        KeypointRequest {
            config:        a.config,
            batch_size:    a.batch_size,
            seed:          a.seed,
            normalization: Normalization { mean: a.mean, std: a.std },
        }
    }
}

#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// JSON caption config (defaults to ResNet-50 + single-layer LSTM)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON vocabulary used to turn ids into words
    #[arg(long)]
    pub vocab: Option<PathBuf>,

    /// Side length of the random input image
    #[arg(long, default_value_t = 224)]
    pub image_size: usize,

    /// Override the sampler's maximum caption length
    #[arg(long)]
    pub max_len: Option<usize>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<CaptionArgs> for CaptionRequest {
    fn from(a: CaptionArgs) -> Self {
        CaptionRequest {
            config:     a.config,
            vocab:      a.vocab,
            image_size: a.image_size,
            max_len:    a.max_len,
            seed:       a.seed,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Keypoints,
    Caption,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Which model's configuration to write
    #[arg(long, value_enum)]
    pub model: ModelKind,

    /// Destination JSON file
    #[arg(long)]
    pub out: PathBuf,

    /// Vocabulary size for the caption decoder
    #[arg(long, default_value_t = crate::application::caption_use_case::DEFAULT_VOCAB_SIZE)]
    pub vocab_size: usize,
}
