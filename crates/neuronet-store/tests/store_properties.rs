// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Property Tests: Fixed-Record Store
//!
//! - Append then materialize returns exactly what was appended
//! - Random access agrees with the materialized sequence
//! - Elementwise add matches an in-memory reference for any chunk size

use neuronet_store::{OpenMode, RecordStore, StoreError, StoreOptions};
use proptest::prelude::*;
use tempfile::tempdir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn roundtrip_preserves_every_record(
        values in prop::collection::vec(any::<i32>(), 0..300),
        buffer_records in 1usize..64,
    ) {
        let dir = tempdir().unwrap();
        let options = StoreOptions { buffer_records, chunk_records: 16 };
        let mut store = RecordStore::<i32>::open(dir.path().join("trace"), OpenMode::Overwrite, options).unwrap();

        for v in &values {
            store.append(*v).unwrap();
        }

        prop_assert_eq!(store.len(), values.len());
        prop_assert_eq!(store.materialize().unwrap(), values.clone());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(store.read(i).unwrap(), *v);
        }
        let is_bounds_error = matches!(store.read(values.len()), Err(StoreError::Bounds { .. }));
        prop_assert!(is_bounds_error);
    }

    #[test]
    fn chunked_add_matches_reference(
        pairs in prop::collection::vec((-1.0e6f64..1.0e6, -1.0e6f64..1.0e6), 1..200),
        chunk_records in 1usize..50,
    ) {
        let dir = tempdir().unwrap();
        let options = StoreOptions { buffer_records: 8, chunk_records };
        let mut store = RecordStore::<f64>::open(dir.path().join("sum"), OpenMode::Overwrite, options).unwrap();

        let (lhs, rhs): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        store.extend(&lhs).unwrap();
        store.add(&rhs).unwrap();

        let expected: Vec<f64> = lhs.iter().zip(&rhs).map(|(a, b)| a + b).collect();
        prop_assert!(store.equals(&expected).unwrap());
        prop_assert_eq!(store.materialize().unwrap(), expected);
    }
}

#[test]
fn add_example_from_three_records() {
    let dir = tempdir().unwrap();
    let mut store =
        RecordStore::<f64>::open(dir.path().join("abc"), OpenMode::Append, StoreOptions::default()).unwrap();
    store.extend(&[1.0, 2.0, 3.0]).unwrap();
    store.add(&[10.0, 20.0, 30.0]).unwrap();
    assert_eq!(store.materialize().unwrap(), vec![11.0, 22.0, 33.0]);
}

#[test]
fn record_count_tracks_file_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sized");
    let mut store = RecordStore::<u32>::open(&path, OpenMode::Overwrite, StoreOptions::default()).unwrap();
    store.extend(&[7; 10]).unwrap();
    store.flush().unwrap();

    assert_eq!(store.size_bytes(), 40);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 40);
    drop(store);

    let reopened = RecordStore::<u32>::open(&path, OpenMode::ReadOnly, StoreOptions::default()).unwrap();
    assert_eq!(reopened.len(), 10);
}
