// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Persistent worker threads
//!
//! # Lifecycle
//! ```text
//! Starting ──(ready handshake)──> Idle ──(job)──> Busy ──(reply)──> Idle
//!                                   │                                │
//!                                   └──────(stop sentinel)───> Stopped
//! ```
//! A worker whose job fails exits without replying; the parent sees the
//! closed channel and marks it `Stopped`.

use crossbeam::channel::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error};

use crate::error::{PoolError, Result};
use crate::job::Job;

/// Parent-side view of a worker's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Idle,
    Busy,
    Stopped,
}

/// Messages from a worker back to the parent
pub(crate) enum Reply<R> {
    /// Initial handshake, sent once before the job loop starts
    Ready,
    Done(Vec<R>),
}

/// Parent-side handle: one end of the duplex channel plus the thread
pub(crate) struct Worker<R> {
    pub index: usize,
    pub state: WorkerState,
    jobs: Sender<Option<Job<R>>>,
    replies: Receiver<Reply<R>>,
    handle: Option<JoinHandle<()>>,
}

impl<R: Send + 'static> Worker<R> {
    /// Spawn the worker thread. Does not wait for the handshake.
    pub fn spawn(index: usize) -> Result<Self> {
        let (job_tx, job_rx) = channel::unbounded::<Option<Job<R>>>();
        let (reply_tx, reply_rx) = channel::unbounded::<Reply<R>>();

        let handle = thread::Builder::new()
            .name(format!("neuronet-worker-{}", index))
            .spawn(move || run(index, job_rx, reply_tx))
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        Ok(Self {
            index,
            state: WorkerState::Starting,
            jobs: job_tx,
            replies: reply_rx,
            handle: Some(handle),
        })
    }

    /// Block until the ready handshake arrives
    pub fn await_ready(&mut self) -> Result<()> {
        match self.replies.recv() {
            Ok(Reply::Ready) => {
                self.state = WorkerState::Idle;
                Ok(())
            }
            Ok(Reply::Done(_)) | Err(_) => {
                self.state = WorkerState::Stopped;
                Err(PoolError::WorkerFailure { worker: self.index })
            }
        }
    }

    pub fn send(&mut self, job: Job<R>) -> Result<()> {
        if self.state == WorkerState::Stopped {
            return Err(PoolError::WorkerFailure { worker: self.index });
        }
        self.jobs.send(Some(job)).map_err(|_| {
            self.state = WorkerState::Stopped;
            PoolError::WorkerFailure { worker: self.index }
        })?;
        self.state = WorkerState::Busy;
        Ok(())
    }

    /// Block until this worker's reply for the current job arrives
    pub fn receive(&mut self) -> Result<Vec<R>> {
        match self.replies.recv() {
            Ok(Reply::Done(results)) => {
                self.state = WorkerState::Idle;
                Ok(results)
            }
            Ok(Reply::Ready) | Err(_) => {
                self.state = WorkerState::Stopped;
                Err(PoolError::WorkerFailure { worker: self.index })
            }
        }
    }

    /// Send the stop sentinel and join. Errors are ignored.
    pub fn stop(&mut self) {
        let _ = self.jobs.send(None);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.state = WorkerState::Stopped;
    }
}

/// Worker thread body
fn run<R>(index: usize, jobs: Receiver<Option<Job<R>>>, replies: Sender<Reply<R>>) {
    if replies.send(Reply::Ready).is_err() {
        return;
    }
    debug!("[WORKER-{}] Started", index);

    while let Ok(Some(job)) = jobs.recv() {
        debug!(
            "[WORKER-{}] Processing {:?} job ({} items)",
            index, job.kind, job.len
        );
        let started = Instant::now();
        match (job.work)() {
            Ok(results) => {
                debug!(
                    "[WORKER-{}] Done in {:.4}s",
                    index,
                    started.elapsed().as_secs_f64()
                );
                if replies.send(Reply::Done(results)).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("[WORKER-{}] {:?} job failed, worker exiting: {}", index, job.kind, e);
                return;
            }
        }
    }
    debug!("[WORKER-{}] Stopping", index);
}
