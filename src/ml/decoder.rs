// ============================================================
// Layer 5 — Caption Decoder (Embedding + LSTM)
// ============================================================
// Training (teacher forcing):
//   captions [B, T] → drop last token → embed [B, T-1, E]
//   prepend image feature as step 0       [B, T, E]
//   LSTM stack                            [B, T, H]
//   linear                                [B, T, V]
//
// Inference (greedy):
//   feed the image feature, take argmax, feed that word's
//   embedding back with the carried hidden state; stop after
//   the end token or after max_len + 1 words.

use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
};

use crate::ml::error::{ModelError, ModelResult};

#[derive(Config, Debug)]
pub struct DecoderConfig {
    pub embed_size:  usize,
    pub hidden_size: usize,
    pub vocab_size:  usize,
    #[config(default = 1)]
    pub num_layers:  usize,
}

/// Termination rule of the greedy sampler.
#[derive(Config, Debug)]
pub struct SamplingConfig {
    #[config(default = 20)]
    pub max_len:   usize,
    #[config(default = 1)]
    pub end_token: usize,
}

impl DecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ModelResult<DecoderRnn<B>> {
        if self.num_layers == 0 {
            return Err(ModelError::InvalidConfig("num_layers must be at least 1".into()));
        }
        if self.embed_size == 0 || self.hidden_size == 0 || self.vocab_size == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "decoder sizes must be positive (embed={}, hidden={}, vocab={})",
                self.embed_size, self.hidden_size, self.vocab_size
            )));
        }

        let lstm = (0..self.num_layers)
            .map(|layer| {
                let d_input = if layer == 0 { self.embed_size } else { self.hidden_size };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();

        Ok(DecoderRnn {
            embed:  EmbeddingConfig::new(self.vocab_size, self.embed_size).init(device),
            lstm,
            linear: LinearConfig::new(self.hidden_size, self.vocab_size).init(device),
        })
    }
}

#[derive(Module, Debug)]
pub struct DecoderRnn<B: Backend> {
    pub embed:  Embedding<B>,
    pub lstm:   Vec<Lstm<B>>,
    pub linear: Linear<B>,
}

impl<B: Backend> DecoderRnn<B> {
    /// Run the stacked LSTM over a batch-first sequence, threading
    /// one state per layer.
    fn run_lstm(
        &self,
        inputs: Tensor<B, 3>,
        state:  Option<Vec<LstmState<B, 2>>>,
    ) -> (Tensor<B, 3>, Vec<LstmState<B, 2>>) {
        let previous: Vec<Option<LstmState<B, 2>>> = match state {
            Some(states) => states.into_iter().map(Some).collect(),
            None         => (0..self.lstm.len()).map(|_| None).collect(),
        };

        let mut x    = inputs;
        let mut next = Vec::with_capacity(self.lstm.len());
        for (layer, prev) in self.lstm.iter().zip(previous) {
            let (out, st) = layer.forward(x, prev);
            x = out;
            next.push(st);
        }
        (x, next)
    }

    /// features: [batch, embed], captions: [batch, T] → logits [batch, T, vocab]
    pub fn forward(
        &self,
        features: Tensor<B, 2>,
        captions: Tensor<B, 2, Int>,
    ) -> ModelResult<Tensor<B, 3>> {
        let [batch, steps] = captions.dims();
        let [feature_batch, _] = features.dims();
        if steps == 0 {
            return Err(ModelError::EmptyCaption);
        }
        if feature_batch != batch {
            return Err(ModelError::BatchMismatch { features: feature_batch, captions: batch });
        }

        let image_step = features.unsqueeze_dim::<3>(1);
        let inputs = if steps > 1 {
            let words = self.embed.forward(captions.slice([0..batch, 0..steps - 1]));
            Tensor::cat(vec![image_step, words], 1)
        } else {
            image_step
        };

        let (hidden, _) = self.run_lstm(inputs, None);
        Ok(self.linear.forward(hidden))
    }

    /// Greedy decoding for a single image feature [1, embed].
    pub fn sample(
        &self,
        features: Tensor<B, 2>,
        options:  &SamplingConfig,
    ) -> ModelResult<Vec<usize>> {
        let [batch, _] = features.dims();
        if batch != 1 {
            return Err(ModelError::SampleBatch(batch));
        }
        let device = features.device();

        let mut inputs  = features.unsqueeze_dim::<3>(1); // [1, 1, E]
        let mut state   = None;
        let mut outputs = Vec::new();

        loop {
            let (out, next) = self.run_lstm(inputs, state);
            let logits = self.linear.forward(out.squeeze::<2>(1)); // [1, V]
            let index  = logits.argmax(1).into_scalar().elem::<i64>() as usize;
            outputs.push(index);

            if index == options.end_token || outputs.len() > options.max_len {
                break;
            }

            let token = Tensor::<B, 1, Int>::from_ints([index as i32], &device).unsqueeze::<2>();
            inputs = self.embed.forward(token);
            state  = Some(next);
        }

        tracing::debug!("Sampled {} tokens: {:?}", outputs.len(), outputs);
        Ok(outputs)
    }

    /// Cross-entropy of every step's logits against the full caption.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        captions: Tensor<B, 2, Int>,
    ) -> ModelResult<(Tensor<B, 1>, Tensor<B, 3>)> {
        let logits = self.forward(features, captions.clone())?;
        let [batch, steps, vocab] = logits.dims();
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(
            logits.clone().reshape([batch * steps, vocab]),
            captions.reshape([batch * steps]),
        );
        Ok((loss, logits))
    }
}
