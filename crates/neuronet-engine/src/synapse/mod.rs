// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Synapse models and state

pub mod conductance;
pub mod delay;
pub mod state;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimResult;
use crate::fields::FieldTable;
use crate::models::SynapseModel;

pub use conductance::Conductance;
pub use delay::{DelayBuffer, DelayBufferHH};
pub use state::{DelayLine, SynapseState};

/// Built-in synapse update functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynapseKind {
    #[default]
    DelayBuffer,
    DelayBufferHH,
    Conductance,
}

impl SynapseModel for SynapseKind {
    fn model_name(&self) -> &'static str {
        match self {
            SynapseKind::DelayBuffer => DelayBuffer.model_name(),
            SynapseKind::DelayBufferHH => DelayBufferHH.model_name(),
            SynapseKind::Conductance => Conductance.model_name(),
        }
    }

    fn schema(&self) -> &'static [&'static str] {
        match self {
            SynapseKind::DelayBuffer => DelayBuffer.schema(),
            SynapseKind::DelayBufferHH => DelayBufferHH.schema(),
            SynapseKind::Conductance => Conductance.schema(),
        }
    }

    fn defaults(&self) -> FieldTable {
        match self {
            SynapseKind::DelayBuffer => DelayBuffer.defaults(),
            SynapseKind::DelayBufferHH => DelayBufferHH.defaults(),
            SynapseKind::Conductance => Conductance.defaults(),
        }
    }

    fn init_state(&self, fields: FieldTable, dt: f64, seed: u64) -> SimResult<SynapseState> {
        match self {
            SynapseKind::DelayBuffer => DelayBuffer.init_state(fields, dt, seed),
            SynapseKind::DelayBufferHH => DelayBufferHH.init_state(fields, dt, seed),
            SynapseKind::Conductance => Conductance.init_state(fields, dt, seed),
        }
    }

    #[inline]
    fn step(&self, state: &mut SynapseState, source: &FieldTable, dest: &mut FieldTable) {
        match self {
            SynapseKind::DelayBuffer => DelayBuffer.step(state, source, dest),
            SynapseKind::DelayBufferHH => DelayBufferHH.step(state, source, dest),
            SynapseKind::Conductance => Conductance.step(state, source, dest),
        }
    }
}

impl fmt::Display for SynapseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}
