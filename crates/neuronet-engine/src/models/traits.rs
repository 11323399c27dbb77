// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Update capabilities of neuron and synapse records

use crate::error::SimResult;
use crate::fields::FieldTable;
use crate::synapse::SynapseState;

/// Per-tick update of one neuron.
///
/// `step` must consume the accumulated input field ([`crate::fields::INPUT`])
/// as the total synaptic input since the previous update, integrate the
/// neuron's state over `dt`, and reset the input field to zero before
/// returning. Synapses rely on that reset to accumulate the next tick's input.
pub trait NeuronModel {
    fn model_name(&self) -> &'static str;

    /// Fields every record of this model must carry
    fn schema(&self) -> &'static [&'static str];

    /// Template used when a neuron is added without explicit fields
    fn defaults(&self) -> FieldTable;

    /// Fill in per-record values derived from the neuron id (e.g. noise seeds)
    fn prepare(&self, _fields: &mut FieldTable, _seed: u64) {}

    fn step(&self, fields: &mut FieldTable);
}

/// Per-tick update of one synapse.
///
/// `step` must add its contribution into the destination's input field,
/// never overwrite it: several synapses may target the same neuron in one
/// tick. The source is read-only.
pub trait SynapseModel {
    fn model_name(&self) -> &'static str;

    fn schema(&self) -> &'static [&'static str];

    fn defaults(&self) -> FieldTable;

    /// Build the synapse state from its merged fields, allocating a delay
    /// line if the model needs one. `seed` seeds per-record noise.
    fn init_state(&self, fields: FieldTable, dt: f64, seed: u64) -> SimResult<SynapseState>;

    fn step(&self, state: &mut SynapseState, source: &FieldTable, dest: &mut FieldTable);
}
