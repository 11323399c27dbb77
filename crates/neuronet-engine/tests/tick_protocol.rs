// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Integration Tests: Tick Protocol and Topology
//!
//! - Input reset and additive delivery within a tick
//! - Timeline growth across repeated runs
//! - Cascading deletes under arbitrary add/delete sequences
//! - Graph import and state files

use neuronet_engine::fields::INPUT;
use neuronet_engine::{
    FieldTable, Graph, Network, NeuronId, NeuronKind, NeuronModel, SimError, SynapseKind,
    SynapseModel,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

/// Single-slot delay buffer that always fires
fn always_on(dt: f64, w: f64) -> FieldTable {
    FieldTable::from([("w", w), ("threshold", -1000.0), ("delay_ms", dt)])
}

fn endpoints_present(network: &Network) -> bool {
    let ids: BTreeSet<NeuronId> = network.get_neuron_ids().into_iter().collect();
    network
        .synapses()
        .all(|s| ids.contains(&s.source) && ids.contains(&s.dest))
}

// ═══════════════════════════════════════════════════════════
// Tick protocol
// ═══════════════════════════════════════════════════════════

#[test]
fn test_isolated_neuron_input_stays_neutral() {
    let mut network = Network::new(0.1).unwrap();
    let id = network.add_neuron(None, None, None).unwrap();

    for _ in 0..50 {
        network.simulate(0.1, &mut []).unwrap();
        assert_eq!(network.field_value(id, INPUT), Some(0.0));
    }
}

#[test]
fn test_two_synapses_into_one_destination_both_contribute() {
    let dt = 0.1;
    let mut network = Network::new(dt).unwrap();
    let a = network.add_neuron(None, None, None).unwrap();
    let b = network
        .add_neuron(Some(FieldTable::from([("v", -40.0)])), None, None)
        .unwrap();
    let dest = network.add_neuron(None, None, None).unwrap();
    network.connect(a, dest, Some(&always_on(dt, 2.0)), None, None).unwrap();
    network.connect(b, dest, Some(&always_on(dt, 5.0)), None, None).unwrap();

    // tick 1 writes both contributions, tick 2 delivers them
    network.simulate(dt, &mut []).unwrap();
    let va = network.field_value(a, "v").unwrap();
    let vb = network.field_value(b, "v").unwrap();
    network.simulate(dt, &mut []).unwrap();

    let expected = 0.0 + va * 2.0 + vb * 5.0;
    assert_eq!(network.field_value(dest, INPUT), Some(expected));
}

#[test]
fn test_neuron_phase_runs_before_synapse_phase() {
    let dt = 0.1;
    let mut network = Network::new(dt).unwrap();
    let source = network.add_neuron(None, None, None).unwrap();
    let dest = network.add_neuron(None, None, None).unwrap();
    network
        .connect(source, dest, Some(&always_on(dt, 1.0)), None, None)
        .unwrap();

    let v0 = network.field_value(source, "v").unwrap();
    network.simulate(2.0 * dt, &mut []).unwrap();
    // what arrived was sampled after the source's first update, not before
    let delivered = network.field_value(dest, INPUT).unwrap();
    assert_ne!(delivered, v0);
}

#[test]
fn test_timeline_counts_ticks() {
    let mut network = Network::new(0.01).unwrap();
    network.add_neuron(None, None, None).unwrap();

    network.simulate(100.0, &mut []).unwrap();
    assert_eq!(network.timeline().len(), 10_000);

    network.simulate(0.05, &mut []).unwrap();
    assert_eq!(network.timeline().len(), 10_005);
    assert!(network.timeline().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_zero_duration_is_a_no_op() {
    let mut network = Network::new(0.1).unwrap();
    network.simulate(0.0, &mut []).unwrap();
    assert!(network.timeline().is_empty());
    assert!(matches!(network.simulate(-1.0, &mut []), Err(SimError::Config(_))));
}

#[test]
fn test_mixed_models_in_one_network() {
    let mut network = Network::new(0.01).unwrap();
    let generator = network
        .add_neuron(Some(NeuronKind::Gaussian.defaults()), Some(NeuronKind::Gaussian), None)
        .unwrap();
    let hh = network
        .add_neuron(
            Some(NeuronKind::HodgkinHuxley.defaults()),
            Some(NeuronKind::HodgkinHuxley),
            None,
        )
        .unwrap();
    let state = SynapseKind::Conductance
        .init_state(SynapseKind::Conductance.defaults().with("we", 0.5), 0.01, 0)
        .unwrap();
    network
        .connect(generator, hh, None, Some(SynapseKind::Conductance), Some(state))
        .unwrap();

    network.simulate(5.0, &mut []).unwrap();
    let vm = network.field_value(hh, "Vm").unwrap();
    assert!(vm.is_finite());
    assert_eq!(network.get_neuron(generator).unwrap().fields.get("draws"), Some(500.0));
}

// ═══════════════════════════════════════════════════════════
// Topology
// ═══════════════════════════════════════════════════════════

#[test]
fn test_from_graph_applies_attributes() {
    let mut graph = Graph::new();
    graph.add_node(NeuronId(10), FieldTable::from([("a", 0.1)]));
    graph.add_edge(NeuronId(10), NeuronId(20), FieldTable::from([("w", 6.0)]));
    graph.add_edge(NeuronId(20), NeuronId(10), FieldTable::new());

    let network =
        Network::from_graph(&graph, NeuronKind::Izhikevich, SynapseKind::DelayBuffer, 0.1).unwrap();
    assert_eq!(network.get_neuron_ids(), vec![NeuronId(10), NeuronId(20)]);
    assert_eq!(network.get_neuron(NeuronId(10)).unwrap().fields.get("a"), Some(0.1));
    assert_eq!(network.get_neuron(NeuronId(20)).unwrap().fields.get("a"), Some(0.02));

    let weights: Vec<Option<f64>> = network
        .synapses()
        .map(|s| s.state.fields.get("w"))
        .collect();
    assert_eq!(weights, vec![Some(6.0), Some(3.0)]);
}

#[test]
fn test_state_file_resumes_identically() {
    let dir = tempfile::tempdir().unwrap();
    let build = || {
        let mut network = Network::new(0.05).unwrap();
        let g = network
            .add_neuron(Some(NeuronKind::Gaussian.defaults()), Some(NeuronKind::Gaussian), None)
            .unwrap();
        let n = network.add_neuron(None, None, None).unwrap();
        network.connect(g, n, None, None, None).unwrap();
        network
    };

    let mut straight = build();
    straight.simulate(10.0, &mut []).unwrap();

    let mut first_half = build();
    first_half.simulate(5.0, &mut []).unwrap();
    first_half.save_state(dir.path().join("half")).unwrap();
    let mut resumed = Network::load_state(dir.path().join("half")).unwrap();
    resumed.simulate(5.0, &mut []).unwrap();

    assert_eq!(resumed.timeline().len(), straight.timeline().len());
    for id in straight.get_neuron_ids() {
        assert_eq!(resumed.get_neuron(id).unwrap(), straight.get_neuron(id).unwrap());
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Connect(usize, usize),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Add),
        (0usize..32, 0usize..32).prop_map(|(a, b)| Op::Connect(a, b)),
        (0usize..32).prop_map(Op::Delete),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn topology_stays_consistent(ops in prop::collection::vec(op(), 1..80)) {
        let mut network = Network::new(0.1).unwrap();
        for op in ops {
            let ids = network.get_neuron_ids();
            match op {
                Op::Add => {
                    network.add_neuron(None, None, None).unwrap();
                }
                Op::Connect(a, b) if !ids.is_empty() => {
                    let (s, d) = (ids[a % ids.len()], ids[b % ids.len()]);
                    network.connect(s, d, None, None, None).unwrap();
                }
                Op::Delete(x) if !ids.is_empty() => {
                    let victim = ids[x % ids.len()];
                    let before: Vec<_> = network.synapses().map(|s| (s.id, s.source, s.dest)).collect();
                    network.delete_neuron(victim).unwrap();

                    let expected: Vec<_> = before
                        .into_iter()
                        .filter(|(_, s, d)| *s != victim && *d != victim)
                        .map(|(id, _, _)| id)
                        .collect();
                    prop_assert_eq!(network.get_connection_ids(), expected);
                }
                _ => {}
            }
            prop_assert_eq!(network.neuron_count(), network.get_neuron_ids().len());
            prop_assert!(endpoints_present(&network));
        }
        // the tick loop never meets a dangling endpoint
        prop_assert!(network.simulate(0.3, &mut []).is_ok());
    }
}
