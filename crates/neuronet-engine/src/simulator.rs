// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Simulator: registries and multi-network runs
//!
//! Owns independent [`Network`]s and [`Recorder`]s under separate monotonic id
//! spaces. A run either steps networks in-process, one after another, or hands
//! whole networks to a [`WorkerPool`].
//!
//! ## Pooled runs
//!
//! Each network travels to a worker as a bincode snapshot together with the
//! recorders bound to it. The worker runs the complete tick loop and sends the
//! mutated snapshot back; the registries are then updated from the returned
//! snapshots, keyed by the original ids. References obtained before a pooled
//! run are stale afterwards and must be fetched again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use neuronet_config::NeuronetConfig;
use neuronet_pool::{Invoke, PoolError, WorkerPool};

use crate::error::{SimError, SimResult};
use crate::graph::GraphSource;
use crate::ids::{NetworkId, RecorderId};
use crate::models::NeuronKind;
use crate::network::Network;
use crate::recorder::Recorder;
use crate::synapse::SynapseKind;

/// Member invoked on a [`NetworkJob`]
pub const SIMULATE_MEMBER: &str = "simulate";

#[derive(Serialize)]
struct SnapshotRef<'a> {
    network: &'a Network,
    recorders: Vec<&'a Recorder>,
}

#[derive(Deserialize)]
struct Snapshot {
    network: Network,
    recorders: Vec<Recorder>,
}

/// A network and its recorders, serialized for a worker
#[derive(Debug)]
pub struct NetworkJob {
    pub network: NetworkId,
    frame: Vec<u8>,
}

impl NetworkJob {
    fn encode(id: NetworkId, network: &Network, recorders: Vec<&Recorder>) -> SimResult<Self> {
        let frame = bincode::serialize(&SnapshotRef { network, recorders })?;
        Ok(Self { network: id, frame })
    }

    fn decode(&self) -> SimResult<Snapshot> {
        Ok(bincode::deserialize(&self.frame)?)
    }

    /// Run the snapshot for `duration_ms` and re-encode the result
    fn run(self, duration_ms: f64) -> SimResult<Self> {
        let Snapshot {
            mut network,
            mut recorders,
        } = self.decode()?;
        {
            let mut attached: Vec<&mut Recorder> = recorders.iter_mut().collect();
            network.simulate(duration_ms, &mut attached)?;
        }
        Self::encode(self.network, &network, recorders.iter().collect())
    }
}

impl Invoke for NetworkJob {
    type Args = f64;
    type Output = NetworkJob;

    fn call(self, member: &str) -> neuronet_pool::Result<Self::Output> {
        Err(PoolError::UnknownMember {
            member: member.to_string(),
        })
    }

    fn call_with(self, member: &str, duration_ms: f64) -> neuronet_pool::Result<Self::Output> {
        if member != SIMULATE_MEMBER {
            return Err(PoolError::UnknownMember {
                member: member.to_string(),
            });
        }
        self.run(duration_ms).map_err(|e| PoolError::Job(e.to_string()))
    }
}

/// Registry of networks and recorders
#[derive(Debug, Default)]
pub struct Simulator {
    networks: BTreeMap<NetworkId, Network>,
    recorders: BTreeMap<RecorderId, Recorder>,
    next_network: u64,
    next_recorder: u64,
    workers: usize,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator using `pool.workers` for [`Simulator::simulate_parallel`]
    pub fn with_config(config: &NeuronetConfig) -> Self {
        Self {
            workers: config.pool.workers,
            ..Self::default()
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Registries
    // ═══════════════════════════════════════════════════════════

    /// Take ownership of `network` and return its id
    pub fn add_network(&mut self, mut network: Network) -> NetworkId {
        let id = NetworkId(self.next_network);
        self.next_network += 1;
        network.set_id(id);
        self.networks.insert(id, network);
        debug!("[SIMULATOR] Registered {}", id);
        id
    }

    /// Build a network from `graph` and register it
    pub fn create_network(
        &mut self,
        graph: &dyn GraphSource,
        neuron_model: NeuronKind,
        synapse_model: SynapseKind,
        dt: f64,
    ) -> SimResult<NetworkId> {
        let network = Network::from_graph(graph, neuron_model, synapse_model, dt)?;
        Ok(self.add_network(network))
    }

    pub fn get_network(&self, id: NetworkId) -> SimResult<&Network> {
        self.networks
            .get(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    pub fn get_network_mut(&mut self, id: NetworkId) -> SimResult<&mut Network> {
        self.networks
            .get_mut(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    /// Take ownership of `recorder`, bound to the registered network `network`
    pub fn add_recorder(&mut self, network: NetworkId, mut recorder: Recorder) -> SimResult<RecorderId> {
        if !self.networks.contains_key(&network) {
            return Err(SimError::NotFound(network.to_string()));
        }
        if let Some(bound) = recorder.network_id() {
            if bound != network {
                return Err(SimError::Config(format!(
                    "recorder was built for {}, not {}",
                    bound, network
                )));
            }
        }
        let id = RecorderId(self.next_recorder);
        self.next_recorder += 1;
        recorder.set_id(id);
        recorder.bind(network);
        self.recorders.insert(id, recorder);
        debug!("[SIMULATOR] Registered {} on {}", id, network);
        Ok(id)
    }

    pub fn get_recorder(&self, id: RecorderId) -> SimResult<&Recorder> {
        self.recorders
            .get(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    pub fn get_recorder_mut(&mut self, id: RecorderId) -> SimResult<&mut Recorder> {
        self.recorders
            .get_mut(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    pub fn network_ids(&self) -> Vec<NetworkId> {
        self.networks.keys().copied().collect()
    }

    pub fn recorder_ids(&self) -> Vec<RecorderId> {
        self.recorders.keys().copied().collect()
    }

    /// Recorders bound to `network`, in id order
    pub fn recorders_of(&self, network: NetworkId) -> Vec<RecorderId> {
        self.recorders
            .iter()
            .filter(|(_, r)| r.network_id() == Some(network))
            .map(|(id, _)| *id)
            .collect()
    }

    // ═══════════════════════════════════════════════════════════
    // Runs
    // ═══════════════════════════════════════════════════════════

    /// Run for `duration_ms`.
    ///
    /// With `network` only that network runs, in-process. Otherwise every
    /// network runs: in registry order without `pool_size`, or on a pool of
    /// `min(pool_size, network_count)` workers (`Some(0)` = available
    /// parallelism) with it.
    pub fn simulate(
        &mut self,
        duration_ms: f64,
        network: Option<NetworkId>,
        pool_size: Option<usize>,
    ) -> SimResult<()> {
        let started = Instant::now();
        match (network, pool_size) {
            (Some(id), _) => self.run_one(id, duration_ms)?,
            (None, None) => {
                info!(
                    "[SIMULATOR] Running {} network(s) sequentially for {}ms",
                    self.networks.len(),
                    duration_ms
                );
                for id in self.network_ids() {
                    self.run_one(id, duration_ms)?;
                }
            }
            (None, Some(size)) => self.run_pooled(duration_ms, size)?,
        }
        info!(
            "[SIMULATOR] Done in {:.4}s",
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Every network on the configured pool size
    pub fn simulate_parallel(&mut self, duration_ms: f64) -> SimResult<()> {
        self.simulate(duration_ms, None, Some(self.workers))
    }

    fn run_one(&mut self, id: NetworkId, duration_ms: f64) -> SimResult<()> {
        let network = self
            .networks
            .get_mut(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))?;
        let mut attached: Vec<&mut Recorder> = self
            .recorders
            .values_mut()
            .filter(|r| r.network_id() == Some(id))
            .collect();

        debug!("[SIMULATOR] Simulating {} for {}ms", id, duration_ms);
        let started = Instant::now();
        network.simulate(duration_ms, &mut attached)?;
        debug!(
            "[SIMULATOR] {} done in {:.4}s",
            id,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn run_pooled(&mut self, duration_ms: f64, pool_size: usize) -> SimResult<()> {
        if self.networks.is_empty() {
            return Ok(());
        }
        let requested = if pool_size == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            pool_size
        };
        let size = requested.min(self.networks.len());
        info!(
            "[SIMULATOR] Running {} network(s) on {} worker(s) for {}ms",
            self.networks.len(),
            size,
            duration_ms
        );

        let mut batch = Vec::with_capacity(self.networks.len());
        for recorder in self.recorders.values_mut() {
            recorder.flush()?;
        }
        for (id, network) in &self.networks {
            let bound: Vec<&Recorder> = self
                .recorders
                .values()
                .filter(|r| r.network_id() == Some(*id))
                .collect();
            let job = NetworkJob::encode(*id, network, bound)?;
            batch.push((job, SIMULATE_MEMBER.to_string(), duration_ms));
        }

        let started = Instant::now();
        let mut pool: WorkerPool<NetworkJob> = WorkerPool::new(size)?;
        pool.dispatch_members_with_args(batch)?;
        let returned = pool.collect_merged()?;
        pool.close();
        debug!(
            "[SIMULATOR] Pool finished in {:.4}s",
            started.elapsed().as_secs_f64()
        );

        for job in returned {
            let Snapshot { network, recorders } = job.decode()?;
            self.networks.insert(job.network, network);
            for recorder in recorders {
                if let Some(id) = recorder.id() {
                    self.recorders.insert(id, recorder);
                }
            }
        }
        Ok(())
    }
}
