// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Per-synapse mutable state

use serde::{Deserialize, Serialize};

use crate::fields::FieldTable;

/// Ring buffer of delayed input values with a write cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayLine {
    values: Vec<f64>,
    cursor: usize,
}

impl DelayLine {
    /// Zero-filled line of `len` slots (at least one)
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len.max(1)],
            cursor: 0,
        }
    }

    /// Number of ticks between a write and its delivery
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Take the value due now, leaving the slot zeroed for the next write
    #[inline]
    pub fn take(&mut self) -> f64 {
        std::mem::take(&mut self.values[self.cursor])
    }

    /// Add to the slot under the cursor; it is delivered `len` ticks later
    #[inline]
    pub fn write(&mut self, value: f64) {
        self.values[self.cursor] += value;
    }

    #[inline]
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.values.len();
    }
}

/// Fields of one synapse plus its optional delay line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynapseState {
    pub fields: FieldTable,
    pub delay: Option<DelayLine>,
}

impl SynapseState {
    pub fn new(fields: FieldTable) -> Self {
        Self {
            fields,
            delay: None,
        }
    }

    pub fn with_delay(fields: FieldTable, len: usize) -> Self {
        Self {
            fields,
            delay: Some(DelayLine::new(len)),
        }
    }
}
