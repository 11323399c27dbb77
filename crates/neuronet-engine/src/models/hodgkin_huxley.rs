// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Hodgkin-Huxley Neuron Model
//!
//! Voltages are relative to the resting potential `Eq`:
//!
//! ```text
//! IK  = gK  n⁴   (V - EK)
//! INa = gNa m³ h (V - ENa)
//! Il  = gl       (V - El)          V = Vm - Eq
//!
//! dVm/dt = (min(I, Imax) + Istim - IK - INa - Il) / Cm
//! dx/dt  = αx(V) (1 - x) - βx(V) x       for x in {n, m, h}
//! ```
//! The gates are advanced with the already-updated `Vm`.

use super::traits::NeuronModel;
use crate::fields::{FieldTable, DT, INPUT};

#[derive(Debug, Clone, Copy, Default)]
pub struct HodgkinHuxley;

/// `x / (exp(x / y) - 1)`, continuous at `x = 0`
#[inline]
fn vtrap(x: f64, y: f64) -> f64 {
    if (x / y).abs() < 1e-6 {
        y * (1.0 - x / y / 2.0)
    } else {
        x / ((x / y).exp() - 1.0)
    }
}

#[inline]
fn alpha_n(v: f64) -> f64 {
    0.01 * vtrap(10.0 - v, 10.0)
}

#[inline]
fn beta_n(v: f64) -> f64 {
    0.125 * (-v / 80.0).exp()
}

#[inline]
fn alpha_m(v: f64) -> f64 {
    0.1 * vtrap(25.0 - v, 10.0)
}

#[inline]
fn beta_m(v: f64) -> f64 {
    4.0 * (-v / 18.0).exp()
}

#[inline]
fn alpha_h(v: f64) -> f64 {
    0.07 * (-v / 20.0).exp()
}

#[inline]
fn beta_h(v: f64) -> f64 {
    1.0 / (((30.0 - v) / 10.0).exp() + 1.0)
}

impl NeuronModel for HodgkinHuxley {
    fn model_name(&self) -> &'static str {
        "hodgkin_huxley"
    }

    fn schema(&self) -> &'static [&'static str] {
        &[
            "Vm", "Eq", "INa", "IK", "Il", "gNa", "gK", "gl", "ENa", "EK", "El", "Cm", "n", "m",
            "h", INPUT, "Imax", "Istim",
        ]
    }

    fn defaults(&self) -> FieldTable {
        FieldTable::from([
            ("Vm", -60.0),
            ("Eq", -65.0),
            ("INa", 0.0),
            ("IK", 0.0),
            ("Il", 0.0),
            ("gNa", 120.0),
            ("gK", 36.0),
            ("gl", 0.3),
            ("ENa", 115.0),
            ("EK", -12.0),
            ("El", 10.6),
            ("Cm", 1.0),
            ("n", 0.3),
            ("m", 0.5),
            ("h", 0.5),
            (INPUT, 0.0),
            ("Imax", 200.0),
            ("Istim", 0.0),
        ])
    }

    fn step(&self, f: &mut FieldTable) {
        let dt = f.value(DT);
        let eq = f.value("Eq");
        let input = f.value(INPUT).min(f.value("Imax"));
        let (n, m, h) = (f.value("n"), f.value("m"), f.value("h"));

        let v = f.value("Vm") - eq;
        let ik = f.value("gK") * n.powi(4) * (v - f.value("EK"));
        let ina = f.value("gNa") * m.powi(3) * h * (v - f.value("ENa"));
        let il = f.value("gl") * (v - f.value("El"));

        let vm = f.value("Vm") + dt / f.value("Cm") * (input + f.value("Istim") - ik - ina - il);
        let v = vm - eq;

        f.set("IK", ik);
        f.set("INa", ina);
        f.set("Il", il);
        f.set("Vm", vm);
        f.set("m", m + dt * (alpha_m(v) * (1.0 - m) - beta_m(v) * m));
        f.set("n", n + dt * (alpha_n(v) * (1.0 - n) - beta_n(v) * n));
        f.set("h", h + dt * (alpha_h(v) * (1.0 - h) - beta_h(v) * h));
        f.set(INPUT, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neuron(dt: f64) -> FieldTable {
        let mut fields = HodgkinHuxley.defaults();
        fields.set(DT, dt);
        fields
    }

    #[test]
    fn test_vtrap_is_continuous() {
        assert!((vtrap(0.0, 10.0) - 10.0).abs() < 1e-9);
        assert!((vtrap(1e-4, 10.0) - vtrap(-1e-4, 10.0)).abs() < 1e-3);
        assert!(alpha_n(10.0).is_finite());
        assert!(alpha_m(25.0).is_finite());
    }

    #[test]
    fn test_input_is_clamped() {
        let mut clamped = neuron(0.01);
        clamped.set(INPUT, 1e6);
        let mut at_max = neuron(0.01);
        at_max.set(INPUT, 200.0);

        HodgkinHuxley.step(&mut clamped);
        HodgkinHuxley.step(&mut at_max);
        assert_eq!(clamped.get("Vm"), at_max.get("Vm"));
        assert_eq!(clamped.get(INPUT), Some(0.0));
    }

    #[test]
    fn test_stimulus_produces_action_potential() {
        let mut fields = neuron(0.01);
        fields.set("Istim", 10.0);
        let mut peak = f64::MIN;
        for _ in 0..3000 {
            HodgkinHuxley.step(&mut fields);
            peak = peak.max(fields.value("Vm"));
            assert!(fields.value("Vm").is_finite());
        }
        // a spike rises well above rest (-65 mV)
        assert!(peak > 0.0, "peak {}", peak);
    }
}
