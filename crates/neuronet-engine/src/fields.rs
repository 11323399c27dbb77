// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Named numeric fields of neuron and synapse records
//!
//! A [`FieldTable`] is validated against its model's declared schema when the
//! record is created; after that, update functions read and write it freely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};

/// Field holding the network time step, set on every neuron
pub const DT: &str = "dt";

/// Accumulated synaptic input, consumed and reset by every neuron update
pub const INPUT: &str = "I";

/// Name -> value mapping, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldTable(BTreeMap<String, f64>);

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Value of `name`, or 0.0 when the field is absent
    #[inline]
    pub fn value(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// Value of `name`, or a [`SimError::NotFound`] naming the field
    pub fn require(&self, name: &str) -> SimResult<f64> {
        self.get(name)
            .ok_or_else(|| SimError::NotFound(format!("field '{}'", name)))
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Add `delta` to `name`, creating the field at 0.0 if absent
    #[inline]
    pub fn add(&mut self, name: &str, delta: f64) {
        match self.0.get_mut(name) {
            Some(value) => *value += delta,
            None => {
                self.0.insert(name.to_string(), delta);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Overwrite or add every field of `overrides`
    pub fn merge(&mut self, overrides: &FieldTable) {
        for (name, value) in &overrides.0 {
            self.0.insert(name.clone(), *value);
        }
    }

    /// Copy of `self` with `overrides` laid over it
    pub fn merged(&self, overrides: &FieldTable) -> FieldTable {
        let mut merged = self.clone();
        merged.merge(overrides);
        merged
    }

    /// Fail with [`SimError::Config`] listing every `schema` field that is absent
    pub fn validate(&self, model: &str, schema: &[&str]) -> SimResult<()> {
        let missing: Vec<&str> = schema
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SimError::Config(format!(
                "{} record is missing field(s): {}",
                model,
                missing.join(", ")
            )))
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        FieldTable(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<const N: usize> From<[(&str, f64); N]> for FieldTable {
    fn from(pairs: [(&str, f64); N]) -> Self {
        pairs.into_iter().collect()
    }
}
