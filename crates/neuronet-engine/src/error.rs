// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Error types for network construction, simulation and recording

use neuronet_pool::PoolError;
use neuronet_store::StoreError;

/// Simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An explicitly requested id is already taken
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Unknown neuron, synapse, network, recorder, field or trace
    #[error("Not found: {0}")]
    NotFound(String),

    /// Inconsistent arguments or an invalid model/field combination
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for SimError {
    fn from(err: bincode::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
