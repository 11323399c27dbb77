// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Gaussian noise generator neuron
//!
//! Each tick draws `Vm ~ N(mean, mu)` and mirrors it into `v`, so both the
//! `Vm`-reading and the `v`-reading synapse models can be driven by it. The
//! draw is a pure function of the record's `seed` and `draws` fields, which
//! keeps runs reproducible across processes.

use rand_distr::{Distribution, Normal};

use super::noise_rng;
use super::traits::NeuronModel;
use crate::fields::{FieldTable, INPUT};

#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl NeuronModel for Gaussian {
    fn model_name(&self) -> &'static str {
        "gaussian"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["Vm", "mean", "mu", INPUT]
    }

    fn defaults(&self) -> FieldTable {
        FieldTable::from([
            ("Vm", 0.0),
            ("v", 0.0),
            ("mean", 12.0),
            ("mu", 30.0),
            (INPUT, 0.0),
            ("draws", 0.0),
        ])
    }

    fn prepare(&self, fields: &mut FieldTable, seed: u64) {
        if !fields.contains("seed") {
            fields.set("seed", seed as f64);
        }
    }

    fn step(&self, fields: &mut FieldTable) {
        let draws = fields.value("draws");
        let mut rng = noise_rng(fields.value("seed") as u64, draws as u64);

        let mean = fields.value("mean");
        let value = match Normal::new(mean, fields.value("mu").abs()) {
            Ok(normal) => normal.sample(&mut rng),
            Err(_) => mean,
        };

        fields.set("Vm", value);
        fields.set("v", value);
        fields.set("draws", draws + 1.0);
        fields.set(INPUT, 0.0);
    }
}
