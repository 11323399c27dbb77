// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # NeuroNet Engine
//!
//! Networks of neuron and synapse records advanced in discrete ticks, field
//! recorders, and a simulator running many independent networks.
//!
//! ## Architecture
//!
//! ```text
//! Simulator ── owns ──> Network(s) ── tick ──> neurons, then synapses
//!     │                     │
//!     │                     └── samples ──> Recorder(s) ──> memory | RecordStore
//!     └── pooled runs ──> WorkerPool (one bincode snapshot per network)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use neuronet_engine::{FieldTable, Network, NeuronId, Recorder};
//!
//! let mut network = Network::new(0.1)?;
//! let a = network.add_neuron(Some(FieldTable::from([("Istim", 10.0)])), None, None)?;
//! let b = network.add_neuron(None, None, None)?;
//! network.connect(a, b, None, None, None)?;
//!
//! let mut recorder = Recorder::in_memory(&network, None, &["v"])?;
//! network.simulate(10.0, &mut [&mut recorder])?;
//! assert_eq!(recorder.trace("v", NeuronId(1))?.len(), 100);
//! # Ok::<(), neuronet_engine::SimError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod events;
pub mod fields;
pub mod graph;
pub mod ids;
pub mod models;
pub mod network;
pub mod recorder;
pub mod simulator;
pub mod synapse;

pub use error::{SimError, SimResult};
pub use events::{
    extract_event_times, write_event_times, EventInput, EventOptions, LocalMaximaDetector,
    PeakDetector, ThresholdDetector,
};
pub use fields::FieldTable;
pub use graph::{Graph, GraphSource};
pub use ids::{NetworkId, NeuronId, RecorderId, SynapseId};
pub use models::{NeuronKind, NeuronModel, SynapseModel};
pub use network::{Network, NeuronRecord, SynapseRecord};
pub use recorder::{Persistence, Recorder};
pub use simulator::{NetworkJob, Simulator};
pub use synapse::{DelayLine, SynapseKind, SynapseState};
