// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Worker pool: dispatch and gather
//!
//! The pool owns every worker handle; nothing about the workers is global.
//! At most one job is in flight at a time, and its results must be collected
//! before the next dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{PoolError, Result};
use crate::job::{split_array, Call, Invoke, Job, JobKind};
use crate::worker::{Worker, WorkerState};

/// Fixed-size pool of persistent workers producing results of type `R`
pub struct WorkerPool<R: Send + 'static> {
    workers: Vec<Worker<R>>,
    in_flight: bool,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Start `worker_count` workers and block until each has signalled ready
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }

        let started = Instant::now();
        info!("[POOL] Starting {} workers...", worker_count);

        let mut workers = (0..worker_count)
            .map(Worker::spawn)
            .collect::<Result<Vec<_>>>()?;
        for worker in &mut workers {
            worker.await_ready()?;
            debug!(
                "[POOL] Worker {} started (delta: {:.4}s)",
                worker.index,
                started.elapsed().as_secs_f64()
            );
        }

        Ok(Self {
            workers,
            in_flight: false,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(|w| w.state).collect()
    }

    pub fn has_job_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Split `items`, bind each partition to `bind`, and send partition `i` to worker `i`
    fn dispatch<T, F>(&mut self, kind: JobKind, items: Vec<T>, bind: F) -> Result<()>
    where
        T: Send + 'static,
        F: Fn(Vec<T>) -> Job<R>,
    {
        if self.in_flight {
            return Err(PoolError::JobInFlight);
        }
        if let Some(dead) = self.workers.iter().find(|w| w.state == WorkerState::Stopped) {
            return Err(PoolError::WorkerFailure { worker: dead.index });
        }

        let started = Instant::now();
        let partitions = split_array(items, self.workers.len());
        debug!(
            "[POOL] {:?} job spliced in {:.5}s",
            kind,
            started.elapsed().as_secs_f64()
        );

        let started = Instant::now();
        for (sent, partition) in partitions.into_iter().enumerate() {
            if let Err(e) = self.workers[sent].send(bind(partition)) {
                // take back the partitions already handed out so the next
                // job does not collect their replies
                for worker in &mut self.workers[..sent] {
                    let _ = worker.receive();
                }
                return Err(e);
            }
        }
        self.in_flight = true;
        debug!(
            "[POOL] {:?} job dispatched in {:.5}s",
            kind,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Kind 1: apply `func` to every element of `data`
    pub fn dispatch_map<T, F>(&mut self, func: F, data: Vec<T>) -> Result<()>
    where
        T: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let func = Arc::new(func);
        self.dispatch(JobKind::Map, data, |partition| {
            let func = Arc::clone(&func);
            Job {
                kind: JobKind::Map,
                len: partition.len(),
                work: Box::new(move || Ok(partition.into_iter().map(|item| func(item)).collect())),
            }
        })
    }

    /// Kind 2: invoke each `(function, argument)` pair independently
    pub fn dispatch_calls<T>(&mut self, batch: Vec<Call<T, R>>) -> Result<()>
    where
        T: Send + 'static,
    {
        self.dispatch(JobKind::Call, batch, |partition| Job {
            kind: JobKind::Call,
            len: partition.len(),
            work: Box::new(move || Ok(partition.into_iter().map(|(func, arg)| func(arg)).collect())),
        })
    }

    /// Kind 3: invoke the named zero-argument operation on each object
    pub fn dispatch_members<O>(&mut self, batch: Vec<(O, String)>) -> Result<()>
    where
        O: Invoke<Output = R>,
    {
        self.dispatch(JobKind::Member, batch, |partition| Job {
            kind: JobKind::Member,
            len: partition.len(),
            work: Box::new(move || {
                partition
                    .into_iter()
                    .map(|(object, member)| object.call(&member))
                    .collect()
            }),
        })
    }

    /// Kind 4: invoke the named operation on each object with explicit arguments
    pub fn dispatch_members_with_args<O>(&mut self, batch: Vec<(O, String, O::Args)>) -> Result<()>
    where
        O: Invoke<Output = R>,
    {
        self.dispatch(JobKind::MemberWithArgs, batch, |partition| Job {
            kind: JobKind::MemberWithArgs,
            len: partition.len(),
            work: Box::new(move || {
                partition
                    .into_iter()
                    .map(|(object, member, args)| object.call_with(&member, args))
                    .collect()
            }),
        })
    }

    fn begin_collect(&mut self) -> Result<()> {
        if !self.in_flight {
            return Err(PoolError::NoJobInFlight);
        }
        self.in_flight = false;
        Ok(())
    }

    /// Per-worker result lists in worker-index order.
    ///
    /// Waits for every worker, even after a failure, so that no stale reply
    /// is left behind for the next job.
    pub fn collect_per_worker(&mut self) -> Result<Vec<Vec<R>>> {
        self.begin_collect()?;
        let started = Instant::now();

        let replies: Vec<Result<Vec<R>>> = self.workers.iter_mut().map(Worker::receive).collect();
        debug!(
            "[POOL] Results gathered in {:.5}s",
            started.elapsed().as_secs_f64()
        );
        replies.into_iter().collect()
    }

    /// All results concatenated in worker-index order
    pub fn collect_merged(&mut self) -> Result<Vec<R>> {
        Ok(self.collect_per_worker()?.into_iter().flatten().collect())
    }

    /// Yield each worker's results as soon as that worker, in index order,
    /// has replied. A fast worker's results wait for every earlier worker.
    pub fn collect_lazy(&mut self) -> Result<LazyResults<'_, R>> {
        self.begin_collect()?;
        Ok(LazyResults {
            pool: self,
            next: 0,
        })
    }

    /// Send the stop sentinel to every worker and join them. Never fails.
    pub fn close(&mut self) {
        if self.workers.iter().all(|w| w.state == WorkerState::Stopped) {
            return;
        }
        for worker in &mut self.workers {
            worker.stop();
        }
        self.in_flight = false;
        info!("[POOL] {} workers stopped", self.workers.len());
    }
}

impl<K, V> WorkerPool<(K, V)>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
{
    /// Merge keyed partial results into one map. Later workers win on duplicate keys.
    pub fn collect_keyed(&mut self) -> Result<BTreeMap<K, V>> {
        Ok(self.collect_merged()?.into_iter().collect())
    }
}

impl<R: Send + 'static> Drop for WorkerPool<R> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Iterator over per-worker results, in worker-index order
pub struct LazyResults<'a, R: Send + 'static> {
    pool: &'a mut WorkerPool<R>,
    next: usize,
}

impl<R: Send + 'static> Iterator for LazyResults<'_, R> {
    type Item = Result<Vec<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        let worker = self.pool.workers.get_mut(self.next)?;
        self.next += 1;
        Some(worker.receive())
    }
}

impl<R: Send + 'static> Drop for LazyResults<'_, R> {
    fn drop(&mut self) {
        // drain unread replies so the channels stay aligned with the next job
        for _ in self.by_ref() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_starts_idle() {
        let pool: WorkerPool<u8> = WorkerPool::new(3).unwrap();
        assert_eq!(pool.worker_count(), 3);
        assert!(pool.worker_states().iter().all(|s| *s == WorkerState::Idle));
        assert!(!pool.has_job_in_flight());
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            WorkerPool::<u8>::new(0),
            Err(PoolError::InvalidWorkerCount)
        ));
    }

    #[test]
    fn test_collect_without_job() {
        let mut pool: WorkerPool<u8> = WorkerPool::new(1).unwrap();
        assert_eq!(pool.collect_merged(), Err(PoolError::NoJobInFlight));
    }

    #[test]
    fn test_second_dispatch_requires_collect() {
        let mut pool: WorkerPool<u32> = WorkerPool::new(2).unwrap();
        pool.dispatch_map(|x: u32| x + 1, vec![1, 2, 3]).unwrap();
        assert_eq!(
            pool.dispatch_map(|x: u32| x + 1, vec![4]),
            Err(PoolError::JobInFlight)
        );
        assert_eq!(pool.collect_merged().unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_failed_send_leaves_no_stale_replies() {
        let mut pool: WorkerPool<u32> = WorkerPool::new(2).unwrap();
        // worker 1 exits while the pool still believes it is idle
        pool.workers[1].stop();
        pool.workers[1].state = WorkerState::Idle;

        assert_eq!(
            pool.dispatch_map(|x: u32| x * 10, vec![1, 2]),
            Err(PoolError::WorkerFailure { worker: 1 })
        );
        assert!(!pool.has_job_in_flight());
        assert_eq!(pool.workers[0].state, WorkerState::Idle);

        // worker 0 answers the next job with that job's results only
        pool.workers[0].send(Job {
            kind: JobKind::Map,
            len: 1,
            work: Box::new(|| Ok(vec![7])),
        })
        .unwrap();
        assert_eq!(pool.workers[0].receive().unwrap(), vec![7]);
    }

    #[test]
    fn test_close_stops_every_worker() {
        let mut pool: WorkerPool<u8> = WorkerPool::new(2).unwrap();
        pool.close();
        assert!(pool.worker_states().iter().all(|s| *s == WorkerState::Stopped));
        // closing twice is harmless
        pool.close();
    }
}
