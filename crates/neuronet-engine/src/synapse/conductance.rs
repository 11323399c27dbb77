// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Logistic-gated conductance synapse
//!
//! ```text
//! gate = 1 / (1 + exp(-steepness (Vm_src - VmTurn)))
//! gi   = gate wi + |N(0, sd)|
//! ge   = gate we + |N(0, sd)|
//! I_dst -= dt (gl (V - El) + gi (V - Ei) + ge (V - Ee))      V = Vm_dst
//! ```
//! No delay line. The two noise draws come from the record's `seed` and
//! `draws` fields.

use rand_distr::{Distribution, Normal};

use crate::error::SimResult;
use crate::fields::{FieldTable, DT, INPUT};
use crate::models::{noise_rng, SynapseModel};

use super::state::SynapseState;

/// Logistic function returning `max / 2` at `turnpoint`
#[inline]
pub fn transfer(x: f64, turnpoint: f64, max: f64, steepness: f64) -> f64 {
    max / (1.0 + (-steepness * (x - turnpoint)).exp())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Conductance;

impl SynapseModel for Conductance {
    fn model_name(&self) -> &'static str {
        "conductance"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["wi", "we", "gl", "El", "Ee", "Ei", "VmTurn", "steepness", "sd"]
    }

    fn defaults(&self) -> FieldTable {
        FieldTable::from([
            ("wi", 0.0),
            ("we", 0.0),
            ("gl", 0.0),
            ("El", -70.0),
            ("Ee", -30.0),
            ("Ei", -75.0),
            ("VmTurn", 25.0),
            ("steepness", 5.0),
            ("sd", 0.1),
            ("draws", 0.0),
        ])
    }

    fn init_state(&self, mut fields: FieldTable, _dt: f64, seed: u64) -> SimResult<SynapseState> {
        if !fields.contains("seed") {
            fields.set("seed", seed as f64);
        }
        Ok(SynapseState::new(fields))
    }

    fn step(&self, state: &mut SynapseState, source: &FieldTable, dest: &mut FieldTable) {
        let f = &mut state.fields;
        let gate = transfer(source.value("Vm"), f.value("VmTurn"), 1.0, f.value("steepness"));

        let draws = f.value("draws");
        let mut rng = noise_rng(f.value("seed") as u64, draws as u64);
        let (noise_i, noise_e) = match Normal::new(0.0, f.value("sd").abs()) {
            Ok(normal) => (normal.sample(&mut rng).abs(), normal.sample(&mut rng).abs()),
            Err(_) => (0.0, 0.0),
        };
        f.set("draws", draws + 1.0);

        let gi = gate * f.value("wi") + noise_i;
        let ge = gate * f.value("we") + noise_e;
        let v = dest.value("Vm");
        let current = f.value("gl") * (v - f.value("El"))
            + gi * (v - f.value("Ei"))
            + ge * (v - f.value("Ee"));
        dest.add(INPUT, -source.value(DT) * current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_midpoint_and_saturation() {
        assert_eq!(transfer(25.0, 25.0, 1.0, 5.0), 0.5);
        assert!(transfer(1000.0, 25.0, 1.0, 5.0) > 0.999);
        assert_eq!(transfer(-1000.0, 25.0, 1.0, 5.0), 0.0);
    }

    #[test]
    fn test_excitatory_current_without_noise() {
        let fields = Conductance.defaults().with("we", 2.0).with("sd", 0.0);
        let mut state = Conductance.init_state(fields, 0.1, 9).unwrap();
        let source = FieldTable::from([("Vm", 25.0), (DT, 0.1)]);
        let mut dest = FieldTable::from([("Vm", -60.0), (INPUT, 1.0)]);

        Conductance.step(&mut state, &source, &mut dest);

        // gate 0.5 -> ge = 1.0; I -= 0.1 * (1.0 * (-60 - -30))
        assert!((dest.value(INPUT) - 4.0).abs() < 1e-12);
        assert_eq!(state.fields.get("draws"), Some(1.0));
        assert_eq!(state.fields.get("seed"), Some(9.0));
    }

    #[test]
    fn test_noise_is_reproducible() {
        let run = || {
            let mut state = Conductance.init_state(Conductance.defaults(), 0.1, 4).unwrap();
            let source = FieldTable::from([("Vm", -65.0), (DT, 0.1)]);
            let mut dest = FieldTable::from([("Vm", -60.0), (INPUT, 0.0)]);
            for _ in 0..5 {
                Conductance.step(&mut state, &source, &mut dest);
            }
            dest.value(INPUT)
        };
        assert_eq!(run(), run());
    }
}
