// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Event-time extraction from recorded traces
//!
//! Peak detection is pluggable through [`PeakDetector`]; extraction over many
//! neurons runs on a [`WorkerPool`] as independent `(function, argument)`
//! calls, one per neuron, gathered by neuron id.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use neuronet_pool::{Call, WorkerPool};

use crate::error::{SimError, SimResult};
use crate::ids::NeuronId;
use crate::recorder::{write_row, Recorder};

/// Finds event indices in a sampled signal
pub trait PeakDetector: Send + Sync + fmt::Debug {
    /// Ascending sample indices at which an event is detected
    fn detect(&self, signal: &[f64]) -> Vec<usize>;
}

/// Upward crossings of a fixed level, at least `min_distance` samples apart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdDetector {
    pub threshold: f64,
    pub min_distance: usize,
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            min_distance: 1,
        }
    }
}

impl PeakDetector for ThresholdDetector {
    fn detect(&self, signal: &[f64]) -> Vec<usize> {
        let mut events: Vec<usize> = Vec::new();
        for (i, pair) in signal.windows(2).enumerate() {
            let index = i + 1;
            if pair[0] < self.threshold && pair[1] >= self.threshold {
                match events.last() {
                    Some(&last) if index - last < self.min_distance => {}
                    _ => events.push(index),
                }
            }
        }
        events
    }
}

/// Local maxima above `min + threshold * (max - min)`.
///
/// Within `min_distance` samples only the highest peak is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMaximaDetector {
    pub threshold: f64,
    pub min_distance: usize,
}

impl Default for LocalMaximaDetector {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            min_distance: 100,
        }
    }
}

impl PeakDetector for LocalMaximaDetector {
    fn detect(&self, signal: &[f64]) -> Vec<usize> {
        let (lo, hi) = signal
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        if !(hi > lo) {
            return Vec::new();
        }
        let level = lo + self.threshold * (hi - lo);

        let mut candidates: Vec<usize> = (1..signal.len().saturating_sub(1))
            .filter(|&i| signal[i] > level && signal[i - 1] < signal[i] && signal[i] >= signal[i + 1])
            .collect();
        if self.min_distance <= 1 {
            return candidates;
        }

        // highest first, then suppress neighbours
        candidates.sort_by(|a, b| signal[*b].total_cmp(&signal[*a]));
        let mut kept: Vec<usize> = Vec::new();
        for index in candidates {
            if kept.iter().all(|&k| index.abs_diff(k) >= self.min_distance) {
                kept.push(index);
            }
        }
        kept.sort_unstable();
        kept
    }
}

/// One neuron's extraction job
#[derive(Debug, Clone)]
pub struct EventInput {
    pub neuron: NeuronId,
    pub signal: Vec<f64>,
    pub dt: f64,
    pub detector: Arc<dyn PeakDetector>,
}

/// Event times (`index * dt`) of one neuron's signal
pub fn extract_event_times(input: EventInput) -> (NeuronId, Vec<f64>) {
    let times = input
        .detector
        .detect(&input.signal)
        .into_iter()
        .map(|index| index as f64 * input.dt)
        .collect();
    (input.neuron, times)
}

/// Rows `id,t0,t1,...`, one per neuron in id order
pub fn write_event_times(path: impl AsRef<Path>, events: &BTreeMap<NeuronId, Vec<f64>>) -> SimResult<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    for (id, times) in events {
        write_row(&mut out, *id, times)?;
    }
    out.flush()?;
    Ok(())
}

/// Options for [`Recorder::spike_event_times`]
#[derive(Debug, Clone, Default)]
pub struct EventOptions<'a> {
    /// Subset of the recorded neurons; all of them when `None`
    pub neurons: Option<&'a [NeuronId]>,
    /// Pool size; `Some(0)` means available parallelism, `None` runs inline
    pub workers: Option<usize>,
    /// Also write the rows to this file
    pub export: Option<&'a Path>,
}

fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Recorder {
    /// Event times of `field` per neuron id, using `detector` on each trace
    pub fn spike_event_times(
        &mut self,
        field: &str,
        detector: Arc<dyn PeakDetector>,
        options: &EventOptions<'_>,
    ) -> SimResult<BTreeMap<NeuronId, Vec<f64>>> {
        let dt = self.dt().ok_or_else(|| {
            SimError::Config("recorder has not been attached to a run yet".to_string())
        })?;
        let neurons: Vec<NeuronId> = match options.neurons {
            Some(ids) => ids.to_vec(),
            None => self.neuron_ids().to_vec(),
        };

        let mut inputs = Vec::with_capacity(neurons.len());
        for neuron in neurons {
            inputs.push(EventInput {
                neuron,
                signal: self.trace(field, neuron)?,
                dt,
                detector: Arc::clone(&detector),
            });
        }

        let started = Instant::now();
        let events = match options.workers {
            Some(requested) if !inputs.is_empty() => {
                let size = if requested == 0 {
                    available_workers()
                } else {
                    requested
                };
                let mut pool: WorkerPool<(NeuronId, Vec<f64>)> = WorkerPool::new(size.min(inputs.len()))?;
                let batch: Vec<Call<EventInput, (NeuronId, Vec<f64>)>> = inputs
                    .into_iter()
                    .map(|input| (extract_event_times as fn(EventInput) -> (NeuronId, Vec<f64>), input))
                    .collect();
                pool.dispatch_calls(batch)?;
                let events = pool.collect_keyed()?;
                pool.close();
                events
            }
            _ => inputs.into_iter().map(extract_event_times).collect(),
        };
        debug!(
            "[RECORDER] Extracted events of {} neuron(s) in {:.4}s",
            events.len(),
            started.elapsed().as_secs_f64()
        );

        if let Some(path) = options.export {
            write_event_times(path, &events)?;
            info!("[RECORDER] Event times written to {}", path.display());
        }
        Ok(events)
    }
}
