// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Error types for store operations

use std::path::PathBuf;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Read at an index at or beyond the record count
    #[error("Record index {index} out of bounds (count: {count})")]
    Bounds { index: usize, count: usize },

    /// Elementwise operand length differs from the record count
    #[error("Size mismatch: store holds {expected} records, operand has {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Elementwise result does not fit the record kind
    #[error("Arithmetic error at record {index}: overflow or division by zero")]
    Arithmetic { index: usize },

    /// Mutation attempted on a store opened read-only
    #[error("Store is read-only: {0}")]
    ReadOnly(PathBuf),

    /// Record kind on disk descriptor does not match the requested type
    #[error("Record kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },

    /// Unknown record kind tag
    #[error("Unknown record kind: {0}")]
    UnknownKind(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
