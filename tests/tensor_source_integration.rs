//! Integration tests for tensor-grammar archives

mod common;

use common::builders::{ramp, NpzBuilder};
use common::{assert_float_eq, path_in, scratch_dir};
use framescope_rs::source::{DataSource, TensorSource};
use framescope_rs::{FrameScopeError, TickInfo};
use ndarray::Array3;

fn volume(layers: usize, rows: usize, cols: usize) -> Array3<f32> {
    Array3::from_shape_fn((layers, rows, cols), |(l, _, _)| l as f32)
}

#[test]
fn test_layer_beyond_range_is_clamped() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .volume(0, 0, volume(5, 3, 4))
        .write(&path_in(&dir, "vol.npz"));

    let mut source = TensorSource::new(&[&path]);
    let parts = source.set_layer(7).unwrap();
    let part = parts[0].as_ref().unwrap();
    assert_eq!(part.shape(), (3, 4));
    assert!(part.samples.iter().all(|&v| v == 4.0));
    assert_eq!(source.layer_count(), 5);
    assert_eq!(source.layer(), 7);
}

#[test]
fn test_planes_sorted_and_discovered_per_index() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .tensor(0, 2, ramp(2, 5))
        .tensor(0, 0, ramp(4, 5))
        .tensor(1, 0, ramp(1, 5))
        .write(&path_in(&dir, "t.npz"));

    let mut source = TensorSource::new(&[&path]);
    assert_eq!(source.inventory_len(), Some(2));

    let parts = source.generate().unwrap();
    let rows: Vec<usize> = parts.iter().map(|p| p.as_ref().unwrap().channels()).collect();
    assert_eq!(rows, vec![4, 2]);
    assert_eq!(parts[1].as_ref().unwrap().channel_ids.to_vec(), vec![0, 1]);

    let parts = source.next().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(source.name(), "t.npz | tensor [1]");
    assert_eq!(source.layer_count(), 0);
}

#[test]
fn test_sidecar_metadata_sets_tick_info() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .tensor(3, 0, ramp(2, 6))
        .metadata(3, 0, r#"{"time": 1000.0, "period": 0.5}"#)
        .tensor(3, 1, ramp(2, 6))
        .write(&path_in(&dir, "t.npz"));

    let mut source = TensorSource::new(&[&path]);
    let parts = source.generate().unwrap();
    let with_meta = parts[0].as_ref().unwrap().tick_info;
    assert_eq!(with_meta, TickInfo::new(1000.0, 0.5, 6));
    assert_float_eq(with_meta.time_at(4), 1002.0, 1e-9);
    assert_eq!(parts[1].as_ref().unwrap().tick_info, TickInfo::unit(6));
}

#[test]
fn test_malformed_sidecar_is_metadata_error() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .tensor(0, 0, ramp(1, 2))
        .metadata(0, 0, "not json")
        .write(&path_in(&dir, "t.npz"));

    let err = TensorSource::new(&[&path]).generate().unwrap_err();
    assert!(matches!(err.root(), FrameScopeError::Metadata { .. }));
}

#[test]
fn test_inventory_spans_archives() {
    let dir = scratch_dir();
    let a = NpzBuilder::new()
        .tensor(4, 0, ramp(1, 1))
        .write(&path_in(&dir, "a.npz"));
    let b = NpzBuilder::new()
        .tensor(2, 0, ramp(1, 1))
        .tensor(2, 1, ramp(1, 1))
        .write(&path_in(&dir, "b.npz"));

    let source = TensorSource::new(&[&a, &b]);
    let indices: Vec<u64> = source.inventory().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![2, 4]);
}

#[test]
fn test_out_of_range_jump_keeps_previous_parts() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .tensor(0, 0, ramp(2, 2))
        .write(&path_in(&dir, "t.npz"));

    let mut source = TensorSource::new(&[&path]);
    let first = source.generate().unwrap();
    assert!(source.jump(5).unwrap_err().is_out_of_range());
    assert_eq!(source.parts(), first);
    assert_eq!(source.index(), 0);
}

#[test]
fn test_zero_padded_tensor_finds_its_sidecar() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .array("tensor_01_0_array", &ramp(2, 6))
        .text("tensor_01_0_metadata.json", r#"{"time": 5.0, "period": 2.0}"#)
        .write(&path_in(&dir, "t.npz"));

    let mut source = TensorSource::new(&[&path]);
    assert_eq!(source.inventory()[0].index, 1);
    let parts = source.generate().unwrap();
    assert_eq!(parts[0].as_ref().unwrap().tick_info, TickInfo::new(5.0, 2.0, 6));
}

#[test]
fn test_single_layer_volume_reports_one_layer() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .volume(0, 0, volume(1, 2, 3))
        .write(&path_in(&dir, "vol.npz"));

    let mut source = TensorSource::new(&[&path]);
    source.generate().unwrap();
    assert_eq!(source.layer_count(), 1);
}

#[test]
fn test_failed_set_layer_still_records_layer() {
    let dir = scratch_dir();
    let path = NpzBuilder::new()
        .tensor(0, 0, ramp(1, 2))
        .metadata(0, 0, "not json")
        .volume(1, 0, volume(5, 3, 4))
        .write(&path_in(&dir, "t.npz"));

    let mut source = TensorSource::new(&[&path]);
    assert!(source.set_layer(3).is_err());
    assert_eq!(source.layer(), 3);

    let parts = source.jump(1).unwrap();
    assert!(parts[0].as_ref().unwrap().samples.iter().all(|&v| v == 3.0));
}
