// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Izhikevich Neuron Model
//!
//! ```text
//! dv/dt = 0.04 v² + 5 v + 140 - u + I + Istim
//! du/dt = a (b v - u)
//!
//! if v >= 30:  v <- c,  u <- u + d
//! ```
//! Integrated with one forward-Euler step of `dt` per tick.

use super::traits::NeuronModel;
use crate::fields::{FieldTable, DT, INPUT};

/// Spike peak; crossing it triggers the reset
pub const PEAK_MV: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Izhikevich;

impl NeuronModel for Izhikevich {
    fn model_name(&self) -> &'static str {
        "izhikevich"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["v", "u", INPUT, "Istim", "a", "b", "c", "d"]
    }

    fn defaults(&self) -> FieldTable {
        FieldTable::from([
            ("v", -65.0),
            ("u", 0.0),
            (INPUT, 0.0),
            ("Istim", 0.0),
            ("a", 0.02),
            ("b", 0.2),
            ("c", -50.0),
            ("d", 2.0),
        ])
    }

    #[inline]
    fn step(&self, fields: &mut FieldTable) {
        let dt = fields.value(DT);
        let v = fields.value("v");
        let u = fields.value("u");
        let input = fields.value(INPUT) + fields.value("Istim");
        let (a, b) = (fields.value("a"), fields.value("b"));

        let mut v_next = v + dt * (0.04 * v * v + 5.0 * v + 140.0 + input - u);
        let mut u_next = u + dt * (a * (b * v - u));
        if v_next >= PEAK_MV {
            v_next = fields.value("c");
            u_next = u + fields.value("d");
        }

        fields.set("v", v_next);
        fields.set("u", u_next);
        fields.set(INPUT, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neuron(dt: f64) -> FieldTable {
        let mut fields = Izhikevich.defaults();
        fields.set(DT, dt);
        fields
    }

    #[test]
    fn test_input_consumed_and_reset() {
        let mut fields = neuron(0.1);
        fields.set(INPUT, 5.0);
        Izhikevich.step(&mut fields);
        assert_eq!(fields.get(INPUT), Some(0.0));
        // 0.04*4225 - 325 + 140 + 5 - 0 = -11
        assert!((fields.value("v") - (-65.0 + 0.1 * -11.0)).abs() < 1e-9);
    }

    #[test]
    fn test_reset_after_peak() {
        let mut fields = neuron(0.1);
        fields.set("v", 29.0);
        fields.set("u", 1.0);
        fields.set(INPUT, 1000.0);
        Izhikevich.step(&mut fields);
        assert_eq!(fields.get("v"), Some(-50.0));
        assert_eq!(fields.get("u"), Some(3.0));
    }

    #[test]
    fn test_stimulus_drives_spiking() {
        let mut fields = neuron(0.05);
        fields.set("Istim", 10.0);
        let mut spikes = 0;
        for _ in 0..4000 {
            let before = fields.value("v");
            Izhikevich.step(&mut fields);
            if fields.value("v") < before - 20.0 {
                spikes += 1;
            }
        }
        assert!(spikes > 0);
    }
}
