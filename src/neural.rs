use burn::prelude::*;
use burn::nn::{Linear, LinearConfig};
use burn::nn::transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput};
use std::path::PathBuf;

use crate::error::NetError;
use crate::heads::{PolicyHead, ValueHead};
use crate::utils::*;


/// Transformer policy-value network
/// Each board row is a token: rows are embedded, mixed by self-attention,
/// flattened, then read by the policy and value heads
#[derive(Module, Debug)]
pub struct TransformerNet<B: Backend> {
    embedding: Linear<B>,
    encoder: TransformerEncoder<B>,
    policy_head: PolicyHead<B>,
    value_head: ValueHead<B>,
}

impl<B: Backend> TransformerNet<B> {
    /// Create a freshly initialised network for the configured board
    pub fn new(config: &NetConfig, device: &B::Device) -> Self {
        let encoder = TransformerEncoderConfig::new(config.d_model, config.d_ff, config.nhead, config.num_layers)
            .with_dropout(config.dropout)
            .with_norm_first(false)
            .init(device);

        Self {
            embedding: LinearConfig::new(config.board_width, config.d_model).init(device),
            encoder,
            policy_head: PolicyHead::new(config.flat_width(), config.action_size(), device),
            value_head: ValueHead::new(config.flat_width(), config.value_hidden, device),
        }
    }

    /// Forward pass returning (policy_log_probs, value)
    /// `[batch, height, width]` -> (`[batch, width*height]`, `[batch, 1]`)
    pub fn forward(&self, states: Tensor<B, 3>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = self.embedding.forward(states);
        let x = self.encoder.forward(TransformerEncoderInput::new(x));
        let flat = x.flatten::<2>(1, 2);

        let policy = self.policy_head.forward(flat.clone());
        let value = self.value_head.forward(flat);

        (policy, value)
    }
}

/// Configuration for the policy-value network
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub board_width: usize,
    pub board_height: usize,
    pub d_model: usize,
    pub nhead: usize,
    pub num_layers: usize,
    pub d_ff: usize,
    pub dropout: f64,
    pub value_hidden: usize,
    pub l2_const: f32,
    /// Previously saved parameters to restore at construction
    pub model_file: Option<PathBuf>,
    pub use_gpu: bool,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            board_width: 6,
            board_height: 6,
            d_model: D_MODEL,
            nhead: NHEAD,
            num_layers: NUM_LAYERS,
            d_ff: D_FF,
            dropout: DROPOUT,
            value_hidden: VALUE_HIDDEN,
            l2_const: L2_CONST,
            model_file: None,
            use_gpu: false,
        }
    }
}

impl NetConfig {
    pub fn new(board_width: usize, board_height: usize) -> Self {
        Self { board_width, board_height, ..Self::default() }
    }

    pub fn with_model_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.model_file = Some(path.into());
        self
    }

    pub fn with_use_gpu(mut self, use_gpu: bool) -> Self {
        self.use_gpu = use_gpu;
        self
    }

    pub fn with_d_model(mut self, d_model: usize) -> Self {
        self.d_model = d_model;
        self
    }

    pub fn with_nhead(mut self, nhead: usize) -> Self {
        self.nhead = nhead;
        self
    }

    pub fn with_num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub fn with_d_ff(mut self, d_ff: usize) -> Self {
        self.d_ff = d_ff;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// One output per board cell
    pub fn action_size(&self) -> usize {
        self.board_width * self.board_height
    }

    /// Width of a board's encoder output once its rows are concatenated
    pub fn flat_width(&self) -> usize {
        self.d_model * self.board_height
    }

    pub fn validate(&self) -> Result<(), NetError> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(NetError::InvalidConfig(format!(
                "board must be non-empty, got {}x{}", self.board_width, self.board_height
            )));
        }
        if self.nhead == 0 || self.d_model % self.nhead != 0 {
            return Err(NetError::InvalidConfig(format!(
                "d_model ({}) must be divisible by nhead ({})", self.d_model, self.nhead
            )));
        }
        if self.num_layers == 0 {
            return Err(NetError::InvalidConfig("need at least one encoder layer".to_string()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(NetError::InvalidConfig(format!("dropout {} outside [0, 1)", self.dropout)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn small_config() -> NetConfig {
        NetConfig::new(5, 4).with_d_model(16).with_nhead(4).with_d_ff(32)
    }

    #[test]
    fn test_network_creation() {
        let device = Default::default();
        let config = small_config();
        let network = TransformerNet::<TestBackend>::new(&config, &device);

        let input = Tensor::<TestBackend, 3>::zeros([2, 4, 5], &device);
        let (policy, value) = network.forward(input);

        assert_eq!(policy.shape().dims, [2, 20]);
        assert_eq!(value.shape().dims, [2, 1]);
    }

    #[test]
    fn test_boards_processed_independently() {
        let device = Default::default();
        let network = TransformerNet::<TestBackend>::new(&small_config(), &device);

        let single = Tensor::<TestBackend, 3>::ones([1, 4, 5], &device);
        let noise = Tensor::<TestBackend, 3>::ones([1, 4, 5], &device).mul_scalar(-3.0);
        let batch = Tensor::cat(vec![single.clone(), noise], 0);

        let (alone, _) = network.forward(single);
        let (together, _) = network.forward(batch);
        let alone = alone.into_data().to_vec::<f32>().unwrap();
        let together = together.slice([0..1, 0..20]).into_data().to_vec::<f32>().unwrap();
        for (a, b) in alone.iter().zip(together.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = NetConfig::default();
        assert_eq!(config.action_size(), 36);
        assert_eq!(config.flat_width(), 128 * 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_heads() {
        let config = NetConfig::new(6, 6).with_nhead(7);
        assert!(matches!(config.validate(), Err(NetError::InvalidConfig(_))));
        assert!(NetConfig::new(0, 6).validate().is_err());
    }
}
