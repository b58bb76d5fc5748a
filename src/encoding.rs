//! # State Encoding
//!
//! Moving data across the tensor boundary:
//! - **Boards in**: row-major planes -> `[batch, height, width]` on the network's device
//! - **Targets in**: policy distributions and outcomes for training
//! - **Results out**: tensors back to plain vectors

use burn::prelude::*;

use crate::error::NetError;
use crate::neural::NetConfig;

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), NetError> {
    if expected == actual {
        Ok(())
    } else {
        Err(NetError::ShapeMismatch { what, expected, actual })
    }
}

/// Stack a batch of row-major boards into `[batch, height, width]`
pub fn states_to_tensor<B: Backend>(
    states: &[Vec<f32>],
    config: &NetConfig,
    device: &B::Device,
) -> Result<Tensor<B, 3>, NetError> {
    if states.is_empty() {
        return Err(NetError::EmptyBatch);
    }
    let cells = config.action_size();
    let mut flat = Vec::with_capacity(states.len() * cells);
    for state in states {
        check_len("board state", cells, state.len())?;
        flat.extend_from_slice(state);
    }
    let data = TensorData::new(flat, [states.len(), config.board_height, config.board_width]);
    Ok(Tensor::from_data(data, device))
}

/// Stack full-board target distributions into `[batch, width*height]`
pub fn probs_to_tensor<B: Backend>(
    probs: &[Vec<f32>],
    config: &NetConfig,
    device: &B::Device,
) -> Result<Tensor<B, 2>, NetError> {
    let cells = config.action_size();
    let mut flat = Vec::with_capacity(probs.len() * cells);
    for row in probs {
        check_len("policy target", cells, row.len())?;
        flat.extend_from_slice(row);
    }
    let data = TensorData::new(flat, [probs.len(), cells]);
    Ok(Tensor::from_data(data, device))
}

pub fn winners_to_tensor<B: Backend>(winners: &[f32], device: &B::Device) -> Tensor<B, 1> {
    Tensor::from_data(TensorData::new(winners.to_vec(), [winners.len()]), device)
}

pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>, NetError> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| NetError::Data(format!("{:?}", e)))
}

/// `[rows, cols]` -> one `Vec` per row
pub fn to_rows<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<Vec<f32>>, NetError> {
    let [_, cols] = tensor.dims();
    let flat = to_vec(tensor)?;
    if cols == 0 {
        return Ok(Vec::new());
    }
    Ok(flat.chunks(cols).map(|row| row.to_vec()).collect())
}

pub fn to_scalar<B: Backend>(tensor: Tensor<B, 1>) -> f32 {
    tensor.into_scalar().elem::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_states_layout_row_major() {
        let device = Default::default();
        let config = NetConfig::new(3, 2);
        let board = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let tensor = states_to_tensor::<TestBackend>(&[board.clone(), board], &config, &device).unwrap();
        assert_eq!(tensor.dims(), [2, 2, 3]);

        // second row of the first board
        let row = tensor.slice([0..1, 1..2, 0..3]);
        assert_eq!(to_vec(row).unwrap(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_wrong_board_size_rejected() {
        let device = Default::default();
        let config = NetConfig::new(3, 3);
        let result = states_to_tensor::<TestBackend>(&[vec![0.0; 8]], &config, &device);
        match result {
            Err(NetError::ShapeMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 9);
                assert_eq!(actual, 8);
            }
            other => panic!("expected shape mismatch, got {:?}", other.map(|t| t.dims())),
        }
    }

    #[test]
    fn test_rows_split() {
        let device = Default::default();
        let config = NetConfig::new(2, 1);
        let tensor = probs_to_tensor::<TestBackend>(&[vec![0.25, 0.75], vec![1.0, 0.0]], &config, &device).unwrap();
        assert_eq!(to_rows(tensor).unwrap(), vec![vec![0.25, 0.75], vec![1.0, 0.0]]);
    }
}
