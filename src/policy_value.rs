//! # Policy-Value Network
//!
//! The handle self-play and training talk to. It owns the network parameters and
//! the optimizer state, and is the only thing that mutates them:
//! - **Inference**: `policy_value` for batches, `policy_value_fn` for a single board
//! - **Training**: `train_step` runs one Adam update on a batch
//! - **Persistence**: `save_model` / `load_model`
//!
//! Calls are blocking and single-threaded. Sharing one instance across training
//! threads needs external serialisation (`train_step` takes `&mut self`).

use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use log::{debug, info, trace};
use std::path::Path;

use crate::checkpoint::{load_params, save_params};
use crate::device::{DevicePlacement, Placement};
use crate::encoding::{probs_to_tensor, states_to_tensor, to_rows, to_scalar, to_vec, winners_to_tensor};
use crate::error::NetError;
use crate::neural::{NetConfig, TransformerNet, TransformerNetRecord};
use crate::training::{adam_config, policy_entropy, policy_loss, value_loss, NetOptimizer};
use crate::utils::*;

pub struct PolicyValueNet<B: AutodiffBackend> {
    model: TransformerNet<B>,
    optimizer: NetOptimizer<B>,
    config: NetConfig,
    placement: Placement,
    device: B::Device,
    learning_rate: Option<LearningRate>,
}

impl<B: AutodiffBackend + DevicePlacement> PolicyValueNet<B> {
    /// Build the network on the device `config.use_gpu` asks for, restoring
    /// `config.model_file` if one is given
    pub fn new(config: NetConfig) -> Result<Self, NetError> {
        let placement = Placement::from_use_gpu(config.use_gpu);
        let device = B::resolve_device(placement)?;
        Self::with_device(config, placement, device)
    }
}

impl<B: AutodiffBackend> PolicyValueNet<B> {
    /// Build on an explicit device, for backends that pick devices some other way
    pub fn with_device(config: NetConfig, placement: Placement, device: B::Device) -> Result<Self, NetError> {
        config.validate()?;

        let mut model = TransformerNet::new(&config, &device);
        match &config.model_file {
            Some(path) => {
                model = load_params(model, path, &device)?;
                info!("Loaded {}x{} policy-value net from {}", config.board_width, config.board_height, path.display());
            }
            None => info!("Initialised fresh {}x{} policy-value net on {:?}", config.board_width, config.board_height, placement),
        }
        let optimizer = adam_config(config.l2_const).init();

        Ok(Self {
            model,
            optimizer,
            config,
            placement,
            device,
            learning_rate: None,
        })
    }

    /// input: a batch of states
    /// output: a batch of action probabilities (over every cell) and state values
    pub fn policy_value(&self, state_batch: &[Vec<f32>]) -> Result<(Vec<Vec<Probability>>, Vec<Reward>), NetError> {
        trace!("policy_value on batch of {}", state_batch.len());
        let model = self.model.valid();
        let states = states_to_tensor::<B::InnerBackend>(state_batch, &self.config, &self.device)?;
        let (log_act_probs, value) = model.forward(states);

        let act_probs = to_rows(log_act_probs.exp())?;
        let values = to_vec(value)?;
        Ok((act_probs, values))
    }

    /// input: board
    /// output: (action, probability) for each available action, in the board's order,
    /// and the score of the board state.
    /// Probabilities are not renormalised over the legal moves.
    pub fn policy_value_fn<G: Board>(
        &self,
        board: &G,
    ) -> Result<(impl Iterator<Item = (Action, Probability)>, Reward), NetError> {
        let legal_positions = board.availables();
        let action_size = self.config.action_size();
        if let Some(&action) = legal_positions.iter().find(|&&a| a >= action_size) {
            return Err(NetError::ActionOutOfRange { action, action_size });
        }

        let (mut act_probs, values) = self.policy_value(&[board.current_state()])?;
        let act_probs = act_probs.pop().unwrap_or_default();
        let legal_probs: Vec<Probability> = legal_positions.iter().map(|&a| act_probs[a]).collect();
        let value = values.first().copied().unwrap_or_default();

        Ok((legal_positions.into_iter().zip(legal_probs), value))
    }

    /// Eager version of `policy_value_fn`
    pub fn evaluate<G: Board>(&self, board: &G) -> Result<(Vec<(Action, Probability)>, Reward), NetError> {
        let (act_probs, value) = self.policy_value_fn(board)?;
        Ok((act_probs.collect(), value))
    }

    /// perform a training step; returns (loss, entropy)
    ///
    /// `lr` applies to this step only.
    pub fn train_step(
        &mut self,
        state_batch: &[Vec<f32>],
        mcts_probs: &[Vec<f32>],
        winner_batch: &[f32],
        lr: LearningRate,
    ) -> Result<(f32, f32), NetError> {
        if state_batch.len() != mcts_probs.len() || state_batch.len() != winner_batch.len() {
            return Err(NetError::BatchMismatch {
                states: state_batch.len(),
                probs: mcts_probs.len(),
                winners: winner_batch.len(),
            });
        }
        let states = states_to_tensor::<B>(state_batch, &self.config, &self.device)?;
        let mcts_probs = probs_to_tensor::<B>(mcts_probs, &self.config, &self.device)?;
        let winners = winners_to_tensor::<B>(winner_batch, &self.device);

        self.learning_rate = Some(lr);

        let (log_act_probs, value) = self.model.forward(states);
        let loss = value_loss(value, winners) + policy_loss(log_act_probs.clone(), mcts_probs);

        let grads = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = self.optimizer.step(lr, self.model.clone(), grads);

        // pre-step predictions, no graph needed
        let entropy = to_scalar(policy_entropy(log_act_probs.inner()));
        let loss = to_scalar(loss.inner());
        debug!("train_step: batch={} lr={} loss={:.5} entropy={:.5}", state_batch.len(), lr, loss, entropy);

        Ok((loss, entropy))
    }

    /// The current parameters as a named record. Tensors are shared with the live network.
    pub fn get_policy_param(&self) -> TransformerNetRecord<B> {
        self.model.clone().into_record()
    }

    /// save model params to file
    pub fn save_model<P: AsRef<Path>>(&self, model_file: P) -> Result<(), NetError> {
        let path = model_file.as_ref();
        save_params(&self.model, path)?;
        info!("Saved policy-value net to {}", path.display());
        Ok(())
    }

    /// Replace the parameters with those saved at `model_file`. Optimizer moments are kept.
    pub fn load_model<P: AsRef<Path>>(&mut self, model_file: P) -> Result<(), NetError> {
        let path = model_file.as_ref();
        self.model = load_params(self.model.clone(), path, &self.device)?;
        info!("Loaded policy-value net from {}", path.display());
        Ok(())
    }

    /// Rate used by the most recent `train_step`
    pub fn learning_rate(&self) -> Option<LearningRate> {
        self.learning_rate
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn num_params(&self) -> usize {
        self.model.num_params()
    }
}
