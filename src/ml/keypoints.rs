// ============================================================
// Layer 5 — Facial Keypoint Regression Network
// ============================================================
// Square grayscale image → 2 * num_keypoints coordinates.
//
//   [B, 1, 96, 96]
//     conv 5x5 → relu → maxpool 2   [B, 32, 46, 46]
//     conv 5x5 → relu → maxpool 2   [B, 64, 21, 21]
//     flatten                       [B, 28224]
//     dropout → fc 1000 → relu
//     dropout → fc 512  → relu
//     dropout → fc 136              [B, 136]
//
// The conv stack is driven by `channels`, one block per
// consecutive pair, so deeper variants (e.g. 1-32-64-128-256-512)
// only need a different config.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::keypoints::KeypointSet;
use crate::ml::error::{ModelError, ModelResult};

#[derive(Config, Debug)]
pub struct KeypointNetConfig {
    /// Channel depth sequence; the first entry is the input channel count
    pub channels: Vec<usize>,
    /// Hidden widths of the fully connected head
    pub hidden: Vec<usize>,
    #[config(default = 96)]
    pub input_size: usize,
    #[config(default = 5)]
    pub kernel_size: usize,
    #[config(default = 68)]
    pub num_keypoints: usize,
    #[config(default = 0.4)]
    pub dropout: f64,
    #[config(default = false)]
    pub batch_norm: bool,
}

impl KeypointNetConfig {
    /// 1-32-64 conv stack with a 1000-512 head on 96x96 input.
    pub fn standard() -> Self {
        Self::new(vec![1, 32, 64], vec![1000, 512])
    }

    pub fn output_size(&self) -> usize {
        self.num_keypoints * 2
    }

    /// Side length of the last feature map.
    pub fn feature_map_size(&self) -> ModelResult<usize> {
        if self.kernel_size == 0 {
            return Err(ModelError::InvalidConfig("kernel_size must be positive".into()));
        }
        let mut side = self.input_size;
        for block in 1..self.channels.len() {
            if side < self.kernel_size {
                return Err(ModelError::InvalidConfig(format!(
                    "conv block {block} sees {side}x{side}, smaller than kernel {}",
                    self.kernel_size
                )));
            }
            // valid conv, then 2x2 pool with floor
            side = (side - self.kernel_size + 1) / 2;
            if side == 0 {
                return Err(ModelError::InvalidConfig(format!(
                    "feature map collapses to zero after conv block {block}"
                )));
            }
        }
        Ok(side)
    }

    /// Width of the flattened conv output fed to the first linear layer.
    pub fn flattened_size(&self) -> ModelResult<usize> {
        let side = self.feature_map_size()?;
        let depth = self.channels.last().copied().unwrap_or(0);
        Ok(depth * side * side)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.channels.len() < 2 {
            return Err(ModelError::InvalidConfig(
                "channels needs an input depth and at least one conv block".into(),
            ));
        }
        if self.channels.iter().chain(self.hidden.iter()).any(|&c| c == 0) {
            return Err(ModelError::InvalidConfig("layer widths must be positive".into()));
        }
        if self.num_keypoints == 0 {
            return Err(ModelError::InvalidConfig("num_keypoints must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::InvalidConfig(format!(
                "dropout {} outside [0, 1)", self.dropout
            )));
        }
        self.feature_map_size().map(|_| ())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ModelResult<KeypointNet<B>> {
        self.validate()?;

        let blocks = self.channels
            .windows(2)
            .map(|pair| self.build_conv_block(pair[0], pair[1], device))
            .collect();

        let mut widths = vec![self.flattened_size()?];
        widths.extend_from_slice(&self.hidden);
        let hidden = widths
            .windows(2)
            .map(|pair| LinearConfig::new(pair[0], pair[1]).init(device))
            .collect();
        let last = widths.last().copied().unwrap_or(0);
        let head = LinearConfig::new(last, self.output_size()).init(device);

        tracing::debug!(
            "KeypointNet: {} conv blocks, flatten={}, head {:?} -> {}",
            self.channels.len() - 1, widths[0], self.hidden, self.output_size()
        );

        Ok(KeypointNet {
            blocks,
            hidden,
            head,
            dropout:       DropoutConfig::new(self.dropout).init(),
            in_channels:   self.channels[0],
            input_size:    self.input_size,
            num_keypoints: self.num_keypoints,
        })
    }

    fn build_conv_block<B: Backend>(
        &self,
        in_channels:  usize,
        out_channels: usize,
        device:       &B::Device,
    ) -> ConvBlock<B> {
        let k = self.kernel_size;
        ConvBlock {
            conv: Conv2dConfig::new([in_channels, out_channels], [k, k]).init(device),
            norm: self.batch_norm.then(|| BatchNormConfig::new(out_channels).init(device)),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }
}

/// conv → (batch norm) → relu → 2x2 max pool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: Option<BatchNorm<B, 2>>,
    pub pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = match &self.norm {
            Some(norm) => norm.forward(x),
            None       => x,
        };
        self.pool.forward(relu(x))
    }
}

#[derive(Module, Debug)]
pub struct KeypointNet<B: Backend> {
    pub blocks:        Vec<ConvBlock<B>>,
    pub hidden:        Vec<Linear<B>>,
    pub head:          Linear<B>,
    pub dropout:       Dropout,
    pub in_channels:   usize,
    pub input_size:    usize,
    pub num_keypoints: usize,
}

impl<B: Backend> KeypointNet<B> {
    /// images: [batch, channels, size, size] → [batch, 2 * num_keypoints]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for block in &self.blocks {
            x = block.forward(x);
        }
        let x = x.flatten::<2>(1, 3);

        let mut x = self.dropout.forward(x);
        for fc in &self.hidden {
            x = self.dropout.forward(relu(fc.forward(x)));
        }
        self.head.forward(x)
    }

    /// Reject tensors the first linear layer could not accept.
    pub fn check_input(&self, dims: [usize; 4]) -> ModelResult<()> {
        let [batch, channels, height, width] = dims;
        if batch == 0
            || channels != self.in_channels
            || height != self.input_size
            || width != self.input_size
        {
            return Err(ModelError::InputShape {
                expected: format!(
                    "[batch >= 1, {}, {}, {}]",
                    self.in_channels, self.input_size, self.input_size
                ),
                actual: dims.to_vec(),
            });
        }
        Ok(())
    }

    /// Checked forward pass, one KeypointSet per image.
    pub fn predict(&self, images: Tensor<B, 4>) -> ModelResult<Vec<KeypointSet>> {
        self.check_input(images.dims())?;
        let output = self.forward(images);
        let [_, row_len] = output.dims();

        let values: Vec<f32> = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ModelError::TensorData(format!("{e:?}")))?;

        values
            .chunks_exact(row_len)
            .map(|row| {
                KeypointSet::from_flat(row).map_err(|e| ModelError::TensorData(e.to_string()))
            })
            .collect()
    }

    /// Mean squared error against flattened targets [batch, 2 * num_keypoints].
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let output = self.forward(images);
        let loss = MseLoss::new().forward(output.clone(), targets, Reduction::Mean);
        (loss, output)
    }
}
