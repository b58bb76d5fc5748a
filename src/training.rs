//! # Training Losses
//!
//! The loss is `(z - v)^2 - pi^T * log(p)`. The `c||theta||^2` term is not added
//! here, the optimizer carries it as weight decay.

use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::decay::WeightDecayConfig;
use burn::optim::{Adam, AdamConfig};
use burn::prelude::*;

use crate::neural::TransformerNet;

/// Adam over every network parameter
pub type NetOptimizer<B> = OptimizerAdaptor<Adam, TransformerNet<B>, B>;

/// Adam with the l2 penalty folded in as weight decay
pub fn adam_config(l2_const: f32) -> AdamConfig {
    AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-8)
        .with_weight_decay(Some(WeightDecayConfig::new(l2_const)))
}

/// Mean squared error between predicted `[batch, 1]` values and `[batch]` outcomes
pub fn value_loss<B: Backend>(value: Tensor<B, 2>, winners: Tensor<B, 1>) -> Tensor<B, 1> {
    let [batch, _] = value.dims();
    value
        .reshape([batch])
        .sub(winners)
        .powf_scalar(2.0)
        .mean()
}

/// Cross-entropy of the predicted log-probabilities against target distributions.
/// Targets are trusted to be distributions over the full board.
pub fn policy_loss<B: Backend>(log_probs: Tensor<B, 2>, mcts_probs: Tensor<B, 2>) -> Tensor<B, 1> {
    mcts_probs
        .mul(log_probs)
        .sum_dim(1)
        .mean()
        .neg()
}

/// Mean entropy of the predicted policies, for monitoring only
pub fn policy_entropy<B: Backend>(log_probs: Tensor<B, 2>) -> Tensor<B, 1> {
    log_probs
        .clone()
        .exp()
        .mul(log_probs)
        .sum_dim(1)
        .mean()
        .neg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::to_scalar;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn uniform_log_probs(batch: usize, cells: usize) -> Tensor<TestBackend, 2> {
        let device = Default::default();
        Tensor::<TestBackend, 2>::ones([batch, cells], &device).mul_scalar(-(cells as f32).ln())
    }

    #[test]
    fn test_value_loss_mse() {
        let device = Default::default();
        let value = Tensor::<TestBackend, 2>::from_floats([[0.5], [1.0]], &device);
        let winners = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0], &device);
        // ((0.5)^2 + 1^2) / 2
        let loss = to_scalar(value_loss(value, winners));
        assert!((loss - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_policy_loss_uniform() {
        let device = Default::default();
        let log_probs = uniform_log_probs(2, 4);
        let target = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.0, 0.0], [0.0, 0.5, 0.5, 0.0]], &device);
        let loss = to_scalar(policy_loss(log_probs, target));
        assert!((loss - 4.0f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_entropy_bounds() {
        let uniform = to_scalar(policy_entropy(uniform_log_probs(3, 9)));
        assert!((uniform - 9.0f32.ln()).abs() < 1e-5);

        let device = Default::default();
        let peaked = Tensor::<TestBackend, 2>::from_floats([[0.0, -30.0, -30.0]], &device);
        let entropy = to_scalar(policy_entropy(peaked));
        assert!(entropy >= 0.0 && entropy < 1e-3, "entropy {}", entropy);
    }
}
