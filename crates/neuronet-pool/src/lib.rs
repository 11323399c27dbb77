// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # NeuroNet Worker Pool
//!
//! A fixed set of persistent workers, each reachable through its own duplex
//! channel, executing "apply function(s) to a data partition" jobs.
//!
//! ## Job kinds
//!
//! | Kind | Dispatch | Each element |
//! |---|---|---|
//! | 1 | [`WorkerPool::dispatch_map`] | `func(item)` |
//! | 2 | [`WorkerPool::dispatch_calls`] | `func_i(arg_i)` |
//! | 3 | [`WorkerPool::dispatch_members`] | `object.call(member)` |
//! | 4 | [`WorkerPool::dispatch_members_with_args`] | `object.call_with(member, args)` |
//!
//! Input is split into exactly `worker_count` contiguous partitions (see
//! [`split_array`]); partition `i` goes to worker `i`. Results are gathered in
//! worker-index order regardless of completion order.
//!
//! ## Failure semantics
//!
//! A job-side failure is fatal to the worker that hit it: the worker exits and
//! the pool reports [`PoolError::WorkerFailure`] on collection. Workers are
//! never restarted. Teardown is best-effort and never fails.
//!
//! Workers are threads of the calling process. A job that panics is contained
//! as a `WorkerFailure`, but one that aborts the process (stack overflow, out
//! of memory, `std::process::abort`) takes the whole pool and its caller down.
//!
//! ```rust
//! use neuronet_pool::WorkerPool;
//!
//! let mut pool = WorkerPool::new(3)?;
//! pool.dispatch_map(|x: u32| x * x, (0..10).collect())?;
//! assert_eq!(pool.collect_merged()?, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
//! # Ok::<(), neuronet_pool::PoolError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod job;
pub mod pool;
pub mod worker;

pub use error::{PoolError, Result};
pub use job::{split_array, Call, Invoke, JobKind};
pub use pool::{LazyResults, WorkerPool};
pub use worker::WorkerState;
