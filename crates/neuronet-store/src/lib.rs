// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # NeuroNet Fixed-Record Store
//!
//! A headerless binary file holding a homogeneous sequence of fixed-width
//! numeric records:
//! - **Append** one value or a slice at end-of-file
//! - **Random access** reads by record index
//! - **Materialize** the whole sequence into memory
//! - **Chunked elementwise arithmetic** against an equal-length slice, with
//!   peak memory bounded by the chunk size rather than the record count
//!
//! Records are little-endian. The record count is always
//! `file_size / record_width` once buffered appends are flushed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use neuronet_store::{OpenMode, RecordStore, StoreOptions};
//!
//! let mut store = RecordStore::<f64>::open("trace.bin", OpenMode::Overwrite, StoreOptions::default())?;
//! store.extend(&[1.0, 2.0, 3.0])?;
//! store.add(&[10.0, 20.0, 30.0])?;
//! assert_eq!(store.materialize()?, vec![11.0, 22.0, 33.0]);
//! # Ok::<(), neuronet_store::StoreError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use record::{Numeric, Record, RecordKind};
pub use store::{ElementOp, OpenMode, RecordStore, StoreOptions};
