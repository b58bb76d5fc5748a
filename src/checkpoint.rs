//! # Model Serialization
//!
//! Parameters are stored as the network's named record (MessagePack, full precision).
//! Bytes land at exactly the path given, overwriting whatever is there.

use burn::module::{ModuleVisitor, ParamId};
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};
use std::fs;
use std::path::Path;

use crate::error::NetError;
use crate::neural::{TransformerNet, TransformerNetRecord};

type ParamRecorder = NamedMpkBytesRecorder<FullPrecisionSettings>;

/// Write the full parameter set to `path`
pub fn save_params<B: Backend>(model: &TransformerNet<B>, path: &Path) -> Result<(), NetError> {
    let bytes = Recorder::<B>::record(&ParamRecorder::default(), model.clone().into_record(), ())?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read parameters from `path` into `model`. Every tensor must have the shape `model` already has.
pub fn load_params<B: Backend>(
    model: TransformerNet<B>,
    path: &Path,
    device: &B::Device,
) -> Result<TransformerNet<B>, NetError> {
    let bytes = fs::read(path)?;
    let record: TransformerNetRecord<B> = Recorder::<B>::load(&ParamRecorder::default(), bytes, device)?;

    // burn asserts on Vec length inside load_record, so layer count is checked up front
    let expected_layers = model.clone().into_record().encoder.layers.len();
    let saved_layers = record.encoder.layers.len();
    if expected_layers != saved_layers {
        return Err(NetError::StructureMismatch(format!(
            "expected {} encoder layers, file has {}", expected_layers, saved_layers
        )));
    }

    let expected = param_shapes(&model);
    let loaded = model.load_record(record);
    let actual = param_shapes(&loaded);
    if expected != actual {
        return Err(NetError::StructureMismatch(describe_mismatch(&expected, &actual)));
    }
    Ok(loaded)
}

/// Shapes of every float parameter, in visiting order
pub fn param_shapes<B: Backend>(model: &TransformerNet<B>) -> Vec<Vec<usize>> {
    let mut collector = ShapeCollector::default();
    model.visit(&mut collector);
    collector.shapes
}

#[derive(Default)]
struct ShapeCollector {
    shapes: Vec<Vec<usize>>,
}

impl<B: Backend> ModuleVisitor<B> for ShapeCollector {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.shapes.push(tensor.dims().to_vec());
    }
}

fn describe_mismatch(expected: &[Vec<usize>], actual: &[Vec<usize>]) -> String {
    if expected.len() != actual.len() {
        return format!("expected {} tensors, file has {}", expected.len(), actual.len());
    }
    expected
        .iter()
        .zip(actual)
        .enumerate()
        .find(|(_, (e, a))| e != a)
        .map(|(i, (e, a))| format!("tensor {} should be {:?}, file has {:?}", i, e, a))
        .unwrap_or_default()
}
