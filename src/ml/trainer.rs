// ============================================================
// Layer 5 — Single Optimisation Step
// ============================================================
// forward_loss → backward → GradientsParams → optimiser step.
//
// There is no epoch loop, data loader or checkpointing here;
// callers own the data and decide how often to step.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use burn::{
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::ml::caption::CaptionModel;
use crate::ml::error::ModelResult;
use crate::ml::keypoints::KeypointNet;

/// The updated module and the loss it was stepped on.
pub struct StepOutput<M> {
    pub model: M,
    pub loss:  f64,
}

/// Adam with the epsilon used across this crate.
pub fn adam() -> AdamConfig {
    AdamConfig::new().with_epsilon(1e-8)
}

/// One MSE step of the keypoint regressor.
pub fn keypoint_step<B, O>(
    model:   KeypointNet<B>,
    optim:   &mut O,
    lr:      f64,
    images:  Tensor<B, 4>,
    targets: Tensor<B, 2>,
) -> StepOutput<KeypointNet<B>>
where
    B: AutodiffBackend,
    O: Optimizer<KeypointNet<B>, B>,
{
    let (loss, _) = model.forward_loss(images, targets);
    let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optim.step(lr, model, grads);

    tracing::debug!("keypoint step: loss={:.6}", loss_val);
    StepOutput { model, loss: loss_val }
}

/// One cross-entropy step of the captioning model. The frozen
/// backbone has no gradients, so only encoder.embed and the
/// decoder move.
pub fn caption_step<B, O>(
    model:    CaptionModel<B>,
    optim:    &mut O,
    lr:       f64,
    images:   Tensor<B, 4>,
    captions: Tensor<B, 2, Int>,
) -> ModelResult<StepOutput<CaptionModel<B>>>
where
    B: AutodiffBackend,
    O: Optimizer<CaptionModel<B>, B>,
{
    let (loss, _) = model.forward_loss(images, captions)?;
    let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optim.step(lr, model, grads);

    tracing::debug!("caption step: loss={:.6}", loss_val);
    Ok(StepOutput { model, loss: loss_val })
}
