// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Identity types for neurons, synapses, networks and recorders

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }
    };
}

define_id!(
    /// Neuron id, unique within its network
    NeuronId,
    "Neuron"
);
define_id!(
    /// Synapse id, unique within its network and never reused
    SynapseId,
    "Synapse"
);
define_id!(
    /// Network id, assigned by the simulator
    NetworkId,
    "Network"
);
define_id!(
    /// Recorder id, assigned by the simulator
    RecorderId,
    "Recorder"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(NeuronId(7).to_string(), "Neuron(7)");
        assert_eq!(RecorderId::from(2).to_string(), "Recorder(2)");
    }
}
