// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Error types for pool operations

/// Pool errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    /// The worker's channel closed while it owed a reply (job failure or panic).
    /// Process-level aborts are not reported; they end the whole process.
    #[error("Worker {worker} terminated abnormally")]
    WorkerFailure { worker: usize },

    #[error("No job has been dispatched")]
    NoJobInFlight,

    #[error("A job is already in flight; collect its results first")]
    JobInFlight,

    /// Kind 3/4 job named a member the object does not provide
    #[error("Unknown member: {member}")]
    UnknownMember { member: String },

    /// Any other job-side failure, fatal to the worker that hit it
    #[error("Job failed: {0}")]
    Job(String),

    #[error("Failed to spawn worker: {0}")]
    Spawn(String),
}

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;
