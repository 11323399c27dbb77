// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Delayed-buffer synapses
//!
//! Each tick the slot under the cursor is delivered into the destination's
//! input, then refilled with this tick's contribution (if the source is above
//! `threshold`), and the cursor advances. A contribution therefore arrives
//! `len` ticks after it was written, `len = floor(delay_ms / dt)`.

use crate::error::{SimError, SimResult};
use crate::fields::{FieldTable, DT, INPUT};
use crate::models::SynapseModel;

use super::state::SynapseState;

/// Longest delay line a synapse may allocate, in ticks
pub const MAX_DELAY_SLOTS: usize = 1 << 24;

fn delay_slots(fields: &FieldTable, dt: f64) -> SimResult<usize> {
    let delay_ms = fields.value("delay_ms");
    if !(delay_ms >= 0.0) || !(dt > 0.0) {
        return Err(SimError::Config(format!(
            "delay_ms = {} with dt = {} does not give a delay length",
            delay_ms, dt
        )));
    }
    let slots = (delay_ms / dt + 1e-9).floor();
    if slots > MAX_DELAY_SLOTS as f64 {
        return Err(SimError::Config(format!(
            "delay_ms = {} with dt = {} needs {} slots, limit is {}",
            delay_ms, dt, slots, MAX_DELAY_SLOTS
        )));
    }
    Ok((slots as usize).max(1))
}

/// Resize the line when the state has none or `delay_ms` asks for another length
fn ensure_delay_line(state: &mut SynapseState, dt: f64) -> SimResult<()> {
    let slots = delay_slots(&state.fields, dt)?;
    if state.delay.as_ref().map(|line| line.len()) != Some(slots) {
        state.delay = Some(super::state::DelayLine::new(slots));
    }
    Ok(())
}

/// Delayed synapse on the source's `v`: writes `v * w` while `v > threshold`
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayBuffer;

impl SynapseModel for DelayBuffer {
    fn model_name(&self) -> &'static str {
        "delay_buffer"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["w", "threshold", "delay_ms"]
    }

    fn defaults(&self) -> FieldTable {
        FieldTable::from([("w", 3.0), ("threshold", 10.0), ("delay_ms", 1.0)])
    }

    fn init_state(&self, fields: FieldTable, dt: f64, _seed: u64) -> SimResult<SynapseState> {
        let mut state = SynapseState::new(fields);
        ensure_delay_line(&mut state, dt)?;
        Ok(state)
    }

    #[inline]
    fn step(&self, state: &mut SynapseState, source: &FieldTable, dest: &mut FieldTable) {
        let Some(line) = state.delay.as_mut() else {
            return;
        };
        dest.add(INPUT, line.take());

        let v = source.value("v");
        if v > state.fields.value("threshold") {
            line.write(v * state.fields.value("w"));
        }
        line.advance();
    }
}

/// Delayed synapse on the source's `Vm` with a refractory counter.
///
/// A crossing writes `Vm * w / dt` and arms the counter `i2` with `rp` ticks;
/// further crossings are ignored until it has counted down.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayBufferHH;

impl SynapseModel for DelayBufferHH {
    fn model_name(&self) -> &'static str {
        "delay_buffer_hh"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["w", "threshold", "delay_ms", "i2", "rp"]
    }

    fn defaults(&self) -> FieldTable {
        FieldTable::from([
            ("w", 1.0),
            ("threshold", 10.0),
            ("delay_ms", 5.0),
            ("refractory_ms", 1.0),
            ("i2", 0.0),
        ])
    }

    fn init_state(&self, mut fields: FieldTable, dt: f64, _seed: u64) -> SimResult<SynapseState> {
        if !fields.contains("rp") {
            let ticks = (fields.value("refractory_ms") / dt + 1e-9).floor();
            fields.set("rp", ticks.max(0.0));
        }
        let mut state = SynapseState::new(fields);
        ensure_delay_line(&mut state, dt)?;
        Ok(state)
    }

    #[inline]
    fn step(&self, state: &mut SynapseState, source: &FieldTable, dest: &mut FieldTable) {
        let Some(line) = state.delay.as_mut() else {
            return;
        };
        dest.add(INPUT, line.take());

        let vm = source.value("Vm");
        let countdown = state.fields.value("i2");
        if vm > state.fields.value("threshold") && countdown <= 0.0 {
            line.write(vm * state.fields.value("w") / source.value(DT));
            state.fields.set("i2", state.fields.value("rp"));
        } else if countdown > 0.0 {
            state.fields.set("i2", countdown - 1.0);
        }
        line.advance();
    }
}
