//! # Transformer Policy-Value Network
//!
//! Function approximation for a self-play agent: board in, move distribution and
//! position value out, plus the training step that fits both to self-play targets.
//!
//! Board rows are embedded, mixed by a transformer encoder and read by separate
//! policy and value heads. Search, game rules and replay storage live elsewhere.

#![allow(clippy::type_complexity)]

pub mod checkpoint;
pub mod device;
pub mod encoding;
pub mod error;
pub mod heads;
pub mod neural;
pub mod policy_value;
pub mod training;
pub mod utils;

pub use device::{CpuBackend, DevicePlacement, Placement};
pub use error::NetError;
pub use neural::{NetConfig, TransformerNet};
pub use policy_value::PolicyValueNet;
pub use utils::{Action, Board, BoardSnapshot, Probability, Reward};
