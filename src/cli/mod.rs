// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to the use cases.
// All printing happens here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CaptionArgs, Commands, InitConfigArgs, KeypointArgs, ModelKind};

use crate::application::caption_use_case::CaptionUseCase;
use crate::application::keypoint_use_case::KeypointUseCase;
use crate::infra::config_store::save_json;
use crate::ml::backend::backend_name;
use crate::ml::caption::CaptionConfig;
use crate::ml::keypoints::KeypointNetConfig;

#[derive(Parser, Debug)]
#[command(
    name = "vision-nets",
    version,
    about = "Facial keypoint regression and CNN-LSTM image captioning networks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        tracing::info!("Using {} backend", backend_name());
        match self.command {
            Commands::Keypoints(args)  => run_keypoints(args),
            Commands::Caption(args)    => run_caption(args),
            Commands::InitConfig(args) => run_init_config(args),
        }
    }
}

fn run_keypoints(args: KeypointArgs) -> Result<()> {
    let report = KeypointUseCase::new(args.into()).execute()?;

    println!("Input shape: {:?}", report.input_shape);
    println!("Parameters:  {}", report.num_params);
    for (i, set) in report.predictions.iter().enumerate() {
        let preview: Vec<String> = set.points
            .iter()
            .take(5)
            .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
            .collect();
        println!("Image {i}: {} keypoints, first: {}", set.len(), preview.join(" "));
        if let Some((x0, y0, x1, y1)) = set.bounds() {
            println!("  bounds: x {x0:.1}..{x1:.1}, y {y0:.1}..{y1:.1}");
        }
    }
    Ok(())
}

fn run_caption(args: CaptionArgs) -> Result<()> {
    let report = CaptionUseCase::new(args.into()).execute()?;

    println!("Parameters: {}", report.num_params);
    println!("Token ids:  {:?}", report.ids);
    println!("\nCaption: {}", report.sentence);
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<()> {
    match args.model {
        ModelKind::Keypoints => save_json(&KeypointNetConfig::standard(), &args.out)?,
        ModelKind::Caption   => save_json(&CaptionConfig::standard(args.vocab_size), &args.out)?,
    }
    println!("Wrote {:?} config to {}", args.model, args.out.display());
    Ok(())
}
