// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Neuron Model Architecture
//!
//! Every neuron record names its update function through a [`NeuronKind`].
//! The kind dispatches to a zero-sized model type implementing
//! [`NeuronModel`]; records stay plain data and serialize cleanly.
//!
//! ## Adding a New Neuron Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement `NeuronModel` (schema, defaults, step)
//! 3. Add a `NeuronKind` variant and its dispatch arms

pub mod gaussian;
pub mod hodgkin_huxley;
pub mod izhikevich;
pub mod traits;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fields::FieldTable;

pub use gaussian::Gaussian;
pub use hodgkin_huxley::HodgkinHuxley;
pub use izhikevich::Izhikevich;
pub use traits::{NeuronModel, SynapseModel};

/// Generator for the `draw`-th noise sample of a record seeded with `seed`
pub(crate) fn noise_rng(seed: u64, draw: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ draw)
}

/// Built-in neuron update functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronKind {
    #[default]
    Izhikevich,
    HodgkinHuxley,
    Gaussian,
}

impl NeuronModel for NeuronKind {
    fn model_name(&self) -> &'static str {
        match self {
            NeuronKind::Izhikevich => Izhikevich.model_name(),
            NeuronKind::HodgkinHuxley => HodgkinHuxley.model_name(),
            NeuronKind::Gaussian => Gaussian.model_name(),
        }
    }

    fn schema(&self) -> &'static [&'static str] {
        match self {
            NeuronKind::Izhikevich => Izhikevich.schema(),
            NeuronKind::HodgkinHuxley => HodgkinHuxley.schema(),
            NeuronKind::Gaussian => Gaussian.schema(),
        }
    }

    fn defaults(&self) -> FieldTable {
        match self {
            NeuronKind::Izhikevich => Izhikevich.defaults(),
            NeuronKind::HodgkinHuxley => HodgkinHuxley.defaults(),
            NeuronKind::Gaussian => Gaussian.defaults(),
        }
    }

    fn prepare(&self, fields: &mut FieldTable, seed: u64) {
        match self {
            NeuronKind::Izhikevich => Izhikevich.prepare(fields, seed),
            NeuronKind::HodgkinHuxley => HodgkinHuxley.prepare(fields, seed),
            NeuronKind::Gaussian => Gaussian.prepare(fields, seed),
        }
    }

    #[inline]
    fn step(&self, fields: &mut FieldTable) {
        match self {
            NeuronKind::Izhikevich => Izhikevich.step(fields),
            NeuronKind::HodgkinHuxley => HodgkinHuxley.step(fields),
            NeuronKind::Gaussian => Gaussian.step(fields),
        }
    }
}

impl fmt::Display for NeuronKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}
