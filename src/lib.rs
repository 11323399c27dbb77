// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # NeuroNet
//!
//! Discrete-time simulation of neuron/synapse networks: per-tick update
//! protocol, field recording in memory or on disk, and whole-network
//! parallelism on a persistent worker pool.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! neuronet = "0.3"  # Default: observability helpers included
//! ```
//!
//! ## Feature Flags
//!
//! - **`observability`** (default): `tracing` subscriber setup and per-crate debug flags
//! - **`file-logging`**: additionally write JSON logs into a timestamped run directory
//!
//! ## Components
//!
//! | Module | Crate | Role |
//! |---|---|---|
//! | [`engine`] | `neuronet-engine` | Networks, models, recorders, simulator |
//! | [`store`] | `neuronet-store` | Fixed-record binary store |
//! | [`pool`] | `neuronet-pool` | Persistent worker pool |
//! | [`config`] | `neuronet-config` | TOML configuration with overrides |
//! | [`observability`] | `neuronet-observability` | Logging initialisation |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use neuronet::prelude::*;
//!
//! let config = load_config(None, None).expect("config");
//! let mut sim = Simulator::with_config(&config);
//!
//! let mut network = Network::from_config(&config)?;
//! let driven = network.add_neuron(Some(FieldTable::from([("Istim", 10.0)])), None, None)?;
//! let follower = network.add_neuron(None, None, None)?;
//! network.connect(driven, follower, None, None, None)?;
//!
//! let id = sim.add_network(network);
//! let recorder = Recorder::from_config(sim.get_network(id)?, None, &["v"], &config)?;
//! let rec = sim.add_recorder(id, recorder)?;
//!
//! sim.simulate_parallel(1000.0)?;
//! let trace = sim.get_recorder_mut(rec)?.trace("v", follower)?;
//! # Ok::<(), SimError>(())
//! ```

pub use neuronet_config as config;
pub use neuronet_engine as engine;
pub use neuronet_pool as pool;
pub use neuronet_store as store;

#[cfg(feature = "observability")]
pub use neuronet_observability as observability;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, NeuronetConfig};
    pub use crate::engine::{
        EventOptions, FieldTable, Graph, GraphSource, Network, NetworkId, NeuronId, NeuronKind,
        NeuronModel, PeakDetector, Recorder, RecorderId, SimError, SimResult, Simulator,
        SynapseId, SynapseKind, SynapseModel, ThresholdDetector,
    };
    pub use crate::pool::{Invoke, WorkerPool};
    pub use crate::store::{OpenMode, RecordStore, StoreOptions};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, CrateDebugFlags, LoggingSettings};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let _neuron_id = NeuronId(0);
        let _options = StoreOptions::default();
        assert!(!crate::VERSION.is_empty());
    }
}
