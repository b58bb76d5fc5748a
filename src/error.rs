use crate::device::Placement;
use burn::record::RecorderError;
use thiserror::Error;

/// Everything that can go wrong in the network. Nothing is recovered locally,
/// every variant goes straight back to whoever made the call.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("{what}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("batch is empty")]
    EmptyBatch,
    #[error("batch size mismatch: {states} states, {probs} policy targets, {winners} value targets")]
    BatchMismatch {
        states: usize,
        probs: usize,
        winners: usize,
    },
    #[error("action {action} is outside the {action_size} cell board")]
    ActionOutOfRange { action: usize, action_size: usize },
    #[error("invalid network config: {0}")]
    InvalidConfig(String),
    #[error("no {0:?} device available on this backend")]
    DeviceUnavailable(Placement),
    #[error("saved parameters don't match the network: {0}")]
    StructureMismatch(String),
    #[error("could not read tensor data: {0}")]
    Data(String),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
