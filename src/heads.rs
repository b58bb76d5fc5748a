//! Policy and value heads. Both read the same flattened encoder output and share nothing else.

use burn::prelude::*;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::{log_softmax, relu, sigmoid};

/// One dense projection to a logit per board cell, normalised with log-softmax
#[derive(Module, Debug)]
pub struct PolicyHead<B: Backend> {
    fc: Linear<B>,
}

impl<B: Backend> PolicyHead<B> {
    pub fn new(flat_width: usize, action_size: usize, device: &B::Device) -> Self {
        Self { fc: LinearConfig::new(flat_width, action_size).init(device) }
    }

    /// `[batch, flat_width]` -> `[batch, action_size]` log-probabilities over every cell (legal or not)
    pub fn forward(&self, flat: Tensor<B, 2>) -> Tensor<B, 2> {
        log_softmax(self.fc.forward(flat), 1)
    }
}

/// Dense -> ReLU -> dense -> sigmoid, so the value is always inside (0, 1)
#[derive(Module, Debug)]
pub struct ValueHead<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
}

impl<B: Backend> ValueHead<B> {
    pub fn new(flat_width: usize, hidden: usize, device: &B::Device) -> Self {
        Self {
            fc1: LinearConfig::new(flat_width, hidden).init(device),
            fc2: LinearConfig::new(hidden, 1).init(device),
        }
    }

    /// `[batch, flat_width]` -> `[batch, 1]`
    pub fn forward(&self, flat: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(flat));
        sigmoid(self.fc2.forward(x))
    }
}
