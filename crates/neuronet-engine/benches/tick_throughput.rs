// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Tick throughput
//!
//! Purpose:
//! - Track the cost of one tick (neuron phase + synapse phase) on ring networks.
//! - Compare the cost of recording every neuron's membrane potential.
//!
//! Notes:
//! - Fixed, deterministic topology; no disk I/O.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use neuronet_engine::{FieldTable, Network, NeuronId, Recorder, SynapseKind};

/// `neuron_count` neurons, each connected to its next `fan_out` neighbours
fn ring_network(neuron_count: u64, fan_out: u64, synapse_model: SynapseKind) -> Network {
    let mut network = Network::with_models(0.1, Default::default(), synapse_model).unwrap();
    for i in 0..neuron_count {
        let stimulus = if i % 10 == 0 { 10.0 } else { 0.0 };
        network
            .add_neuron(Some(FieldTable::from([("Istim", stimulus)])), None, None)
            .unwrap();
    }
    for source in 0..neuron_count {
        for offset in 1..=fan_out {
            let dest = (source + offset) % neuron_count;
            network
                .connect(NeuronId(source), NeuronId(dest), None, None, None)
                .unwrap();
        }
    }
    network
}

fn bench_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for &(neurons, fan_out) in &[(100u64, 10u64), (1_000, 10), (1_000, 50)] {
        let label = format!("{}n_{}syn", neurons, fan_out);
        group.throughput(Throughput::Elements(neurons * fan_out));

        let mut network = ring_network(neurons, fan_out, SynapseKind::DelayBuffer);
        group.bench_with_input(BenchmarkId::new("delay_buffer", &label), &neurons, |b, _| {
            b.iter(|| network.simulate(black_box(0.1), &mut []).unwrap());
        });

        let mut network = ring_network(neurons, fan_out, SynapseKind::Conductance);
        group.bench_with_input(BenchmarkId::new("conductance", &label), &neurons, |b, _| {
            b.iter(|| network.simulate(black_box(0.1), &mut []).unwrap());
        });
    }

    group.finish();
}

fn bench_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("recording");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(2));

    let mut network = ring_network(1_000, 10, SynapseKind::DelayBuffer);
    let mut recorder = Recorder::in_memory(&network, None, &["v"]).unwrap();
    group.bench_function("1000n_memory", |b| {
        b.iter(|| network.simulate(black_box(0.1), &mut [&mut recorder]).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_ticks, bench_recording);
criterion_main!(benches);
