// ============================================================
// Layer 5 — ResNet Feature Backbone
// ============================================================
// Bottleneck ResNet without its classification layer: the
// output of the global average pool is the image feature.
//
//   stem   conv 7x7/2 → bn → relu → maxpool 3x3/2
//   layer1 layers[0] x bottleneck(w)        stride 1
//   layer2 layers[1] x bottleneck(2w)       stride 2
//   layer3 layers[2] x bottleneck(4w)       stride 2
//   layer4 layers[3] x bottleneck(8w)       stride 2
//   pool   adaptive avg → [B, 32w, 1, 1]
//
// Bottleneck: 1x1 reduce → 3x3 (carries the stride) → 1x1 expand
// (x4), plus a projection shortcut when the shape changes.
//
// Reference: He et al. (2016) Deep Residual Learning

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::error::{ModelError, ModelResult};

const EXPANSION: usize = 4;

#[derive(Config, Debug)]
pub struct ResNetConfig {
    /// Bottleneck count per stage
    pub layers: [usize; 4],
    #[config(default = 64)]
    pub base_width: usize,
    #[config(default = 3)]
    pub in_channels: usize,
}

impl ResNetConfig {
    pub fn resnet50() -> Self {
        Self::new([3, 4, 6, 3])
    }

    pub fn resnet101() -> Self {
        Self::new([3, 4, 23, 3])
    }

    pub fn resnet152() -> Self {
        Self::new([3, 8, 36, 3])
    }

    /// Channels of the pooled feature (2048 for the standard widths).
    pub fn feature_dim(&self) -> usize {
        self.base_width * 8 * EXPANSION
    }

    /// Every stage needs at least one block, or the pooled width
    /// no longer matches `feature_dim`.
    pub fn validate(&self) -> ModelResult<()> {
        if self.base_width == 0 || self.in_channels == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "backbone widths must be positive (base_width={}, in_channels={})",
                self.base_width, self.in_channels
            )));
        }
        if let Some(stage) = self.layers.iter().position(|&n| n == 0) {
            return Err(ModelError::InvalidConfig(format!(
                "backbone stage {} has no blocks", stage + 1
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ModelResult<ResNet<B>> {
        self.validate()?;
        let w = self.base_width;

        let stem_conv = Conv2dConfig::new([self.in_channels, w], [7, 7])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(3, 3))
            .with_bias(false)
            .init(device);
        let stem_norm = BatchNormConfig::new(w).init(device);
        let stem_pool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        let mut in_channels = w;
        let mut stages = Vec::with_capacity(4);
        for (i, &blocks) in self.layers.iter().enumerate() {
            let width  = w << i;
            let stride = if i == 0 { 1 } else { 2 };
            let stage: Vec<Bottleneck<B>> = (0..blocks)
                .map(|b| {
                    let block = build_bottleneck(
                        in_channels, width, if b == 0 { stride } else { 1 }, device,
                    );
                    in_channels = width * EXPANSION;
                    block
                })
                .collect();
            stages.push(stage);
        }

        Ok(ResNet {
            stem_conv,
            stem_norm,
            stem_pool,
            stages,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            feature_dim: self.feature_dim(),
        })
    }
}

fn conv_bn<B: Backend>(
    channels: [usize; 2],
    kernel:   usize,
    stride:   usize,
    device:   &B::Device,
) -> (Conv2d<B>, BatchNorm<B, 2>) {
    let pad = kernel / 2;
    let conv = Conv2dConfig::new(channels, [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(pad, pad))
        .with_bias(false)
        .init(device);
    (conv, BatchNormConfig::new(channels[1]).init(device))
}

fn build_bottleneck<B: Backend>(
    in_channels: usize,
    width:       usize,
    stride:      usize,
    device:      &B::Device,
) -> Bottleneck<B> {
    let out_channels = width * EXPANSION;
    let (conv1, bn1) = conv_bn([in_channels, width], 1, 1, device);
    let (conv2, bn2) = conv_bn([width, width], 3, stride, device);
    let (conv3, bn3) = conv_bn([width, out_channels], 1, 1, device);

    let downsample = (stride != 1 || in_channels != out_channels).then(|| {
        let (conv, norm) = conv_bn([in_channels, out_channels], 1, stride, device);
        Downsample { conv, norm }
    });

    Bottleneck { conv1, bn1, conv2, bn2, conv3, bn3, downsample }
}

#[derive(Module, Debug)]
pub struct Downsample<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
}

#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub bn1:        BatchNorm<B, 2>,
    pub conv2:      Conv2d<B>,
    pub bn2:        BatchNorm<B, 2>,
    pub conv3:      Conv2d<B>,
    pub bn3:        BatchNorm<B, 2>,
    pub downsample: Option<Downsample<B>>,
}

impl<B: Backend> Bottleneck<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = match &self.downsample {
            Some(ds) => ds.norm.forward(ds.conv.forward(x.clone())),
            None     => x.clone(),
        };
        let out = relu(self.bn1.forward(self.conv1.forward(x)));
        let out = relu(self.bn2.forward(self.conv2.forward(out)));
        let out = self.bn3.forward(self.conv3.forward(out));
        relu(out + identity)
    }
}

#[derive(Module, Debug)]
pub struct ResNet<B: Backend> {
    pub stem_conv:   Conv2d<B>,
    pub stem_norm:   BatchNorm<B, 2>,
    pub stem_pool:   MaxPool2d,
    pub stages:      Vec<Vec<Bottleneck<B>>>,
    pub pool:        AdaptiveAvgPool2d,
    pub feature_dim: usize,
}

impl<B: Backend> ResNet<B> {
    /// images: [batch, 3, H, W] → [batch, feature_dim, 1, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.stem_norm.forward(self.stem_conv.forward(images)));
        let mut x = self.stem_pool.forward(x);
        for stage in &self.stages {
            for block in stage {
                x = block.forward(x);
            }
        }
        self.pool.forward(x)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_presets_feature_dim() {
        assert_eq!(ResNetConfig::resnet50().feature_dim(), 2048);
        assert_eq!(ResNetConfig::resnet101().layers, [3, 4, 23, 3]);
        assert_eq!(ResNetConfig::resnet152().feature_dim(), 2048);
    }

    #[test]
    fn test_tiny_backbone_pools_to_feature_vector() {
        let device = Default::default();
        let cfg = ResNetConfig::new([1, 1, 1, 1]).with_base_width(4);
        let net: ResNet<TestBackend> = cfg.init(&device).unwrap();
        let images = Tensor::<TestBackend, 4>::zeros([2, 3, 32, 32], &device);
        assert_eq!(net.forward(images).dims(), [2, 128, 1, 1]);
    }

    #[test]
    fn test_projection_only_where_shape_changes() {
        let device = Default::default();
        let cfg = ResNetConfig::new([2, 1, 1, 1]).with_base_width(4);
        let net: ResNet<TestBackend> = cfg.init(&device).unwrap();
        // first block widens 4 → 16 channels, second keeps 16
        assert!(net.stages[0][0].downsample.is_some());
        assert!(net.stages[0][1].downsample.is_none());
        assert!(net.stages[1][0].downsample.is_some());
    }

    #[test]
    fn test_invalid_backbones_rejected() {
        let device = Default::default();
        let cases = [
            ResNetConfig::new([1, 1, 1, 0]).with_base_width(2),
            ResNetConfig::new([0, 1, 1, 1]).with_base_width(2),
            ResNetConfig::new([1, 1, 1, 1]).with_base_width(0),
            ResNetConfig::new([1, 1, 1, 1]).with_base_width(2).with_in_channels(0),
        ];
        for cfg in cases {
            assert!(matches!(
                cfg.init::<TestBackend>(&device),
                Err(ModelError::InvalidConfig(_))
            ), "accepted {cfg:?}");
        }
    }

    #[test]
    fn test_grayscale_input_channels() {
        let device = Default::default();
        let cfg = ResNetConfig::new([1, 1, 1, 1]).with_base_width(2).with_in_channels(1);
        let net: ResNet<TestBackend> = cfg.init(&device).unwrap();
        let images = Tensor::<TestBackend, 4>::zeros([1, 1, 64, 64], &device);
        assert_eq!(net.forward(images).dims(), [1, 64, 1, 1]);
    }
}
