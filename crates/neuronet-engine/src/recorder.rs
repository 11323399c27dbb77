// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Field recording
//!
//! A [`Recorder`] samples a set of fields of a set of neurons once per tick.
//! Sequences are kept in memory or in one [`RecordStore`] per `(field, neuron)`
//! pair plus one for the timeline, all inside the recorder's directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use neuronet_config::NeuronetConfig;
use neuronet_store::{OpenMode, RecordStore, StoreOptions};

use crate::error::{SimError, SimResult};
use crate::graph::Graph;
use crate::ids::{NetworkId, NeuronId, RecorderId};
use crate::network::Network;

/// Suffix appended to recorder snapshot files
pub const RECORDER_FILE_EXTENSION: &str = "pRek";
/// Suffix appended to captured network structures
pub const STRUCTURE_FILE_EXTENSION: &str = "nstruct";

const TIMELINE_FILE: &str = "timeline";

fn with_suffix(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn trace_name(field: &str, neuron: NeuronId) -> String {
    format!("var_{}_neuron_{}", field, neuron.0)
}

/// File backing the samples of `field` for `neuron`
pub fn trace_file(directory: &Path, field: &str, neuron: NeuronId) -> PathBuf {
    directory.join(trace_name(field, neuron))
}

/// One growable sequence of samples
#[derive(Debug, Serialize, Deserialize)]
enum Trace {
    Memory(Vec<f64>),
    Disk(RecordStore<f64>),
}

impl Trace {
    fn push(&mut self, value: f64) -> SimResult<()> {
        match self {
            Trace::Memory(values) => values.push(value),
            Trace::Disk(store) => store.append(value)?,
        }
        Ok(())
    }

    fn len(&self) -> usize {
        match self {
            Trace::Memory(values) => values.len(),
            Trace::Disk(store) => store.len(),
        }
    }

    fn values(&mut self) -> SimResult<Vec<f64>> {
        match self {
            Trace::Memory(values) => Ok(values.clone()),
            Trace::Disk(store) => Ok(store.materialize()?),
        }
    }

    fn flush(&mut self) -> SimResult<()> {
        if let Trace::Disk(store) = self {
            store.flush()?;
        }
        Ok(())
    }
}

/// Where a recorder keeps its sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Persistence {
    Memory,
    Disk {
        directory: PathBuf,
        mode: OpenMode,
        options: StoreOptions,
    },
}

impl Persistence {
    fn open(&self, name: impl AsRef<Path>) -> SimResult<Trace> {
        match self {
            Persistence::Memory => Ok(Trace::Memory(Vec::new())),
            Persistence::Disk {
                directory,
                mode,
                options,
            } => Ok(Trace::Disk(RecordStore::open(
                directory.join(name),
                *mode,
                *options,
            )?)),
        }
    }
}

/// Samples subscribed neuron fields every tick
#[derive(Debug, Serialize, Deserialize)]
pub struct Recorder {
    id: Option<RecorderId>,
    network: Option<NetworkId>,
    neurons: Vec<NeuronId>,
    fields: Vec<String>,
    dt: Option<f64>,
    persistence: Persistence,
    timeline: Trace,
    traces: BTreeMap<String, BTreeMap<NeuronId, Trace>>,
    structure: Option<Graph>,
}

impl Recorder {
    /// Recorder holding its samples in memory.
    ///
    /// `neurons = None` subscribes every neuron present in `network` now.
    pub fn in_memory(network: &Network, neurons: Option<&[NeuronId]>, fields: &[&str]) -> SimResult<Self> {
        Self::build(network, neurons, fields, Persistence::Memory)
    }

    /// Store-backed recorder writing into `directory`.
    ///
    /// [`OpenMode::ReadOnly`] requires the directory to exist; the other modes
    /// create it.
    pub fn on_disk(
        network: &Network,
        neurons: Option<&[NeuronId]>,
        fields: &[&str],
        directory: impl Into<PathBuf>,
        mode: OpenMode,
        options: StoreOptions,
    ) -> SimResult<Self> {
        let directory = directory.into();
        if mode == OpenMode::ReadOnly {
            if !directory.is_dir() {
                return Err(SimError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("No such directory: {}", directory.display()),
                )));
            }
        } else if directory.is_dir() {
            if mode == OpenMode::Append {
                info!("[RECORDER] Appending to {}", directory.display());
            }
        } else {
            fs::create_dir_all(&directory)?;
        }

        Self::build(
            network,
            neurons,
            fields,
            Persistence::Disk {
                directory,
                mode,
                options,
            },
        )
    }

    /// Recorder laid out by the `[recorder]` and `[store]` sections
    pub fn from_config(
        network: &Network,
        neurons: Option<&[NeuronId]>,
        fields: &[&str],
        config: &NeuronetConfig,
    ) -> SimResult<Self> {
        match config.recorder.mode.to_ascii_lowercase().as_str() {
            "memory" => Self::in_memory(network, neurons, fields),
            "disk" => {
                let mode = match config.recorder.open_mode.to_ascii_lowercase().as_str() {
                    "overwrite" => OpenMode::Overwrite,
                    "append" => OpenMode::Append,
                    "read_only" => OpenMode::ReadOnly,
                    other => {
                        return Err(SimError::Config(format!("unknown open mode '{}'", other)))
                    }
                };
                let options = StoreOptions {
                    buffer_records: config.store.buffer_records,
                    chunk_records: config.store.chunk_records,
                };
                Self::on_disk(network, neurons, fields, &config.recorder.directory, mode, options)
            }
            other => Err(SimError::Config(format!("unknown recorder mode '{}'", other))),
        }
    }

    fn build(
        network: &Network,
        neurons: Option<&[NeuronId]>,
        fields: &[&str],
        persistence: Persistence,
    ) -> SimResult<Self> {
        let mut subscribed: Vec<NeuronId> = match neurons {
            Some(ids) => ids.to_vec(),
            None => network.get_neuron_ids(),
        };
        subscribed.sort_unstable();
        subscribed.dedup();

        let mut names: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !names.iter().any(|n| n == field) {
                names.push((*field).to_string());
            }
        }

        let timeline = persistence.open(TIMELINE_FILE)?;
        let mut traces = BTreeMap::new();
        for field in &names {
            let mut per_neuron = BTreeMap::new();
            for id in &subscribed {
                per_neuron.insert(*id, persistence.open(trace_name(field, *id))?);
            }
            traces.insert(field.clone(), per_neuron);
        }

        debug!(
            "[RECORDER] Subscribed {} neuron(s) x {} field(s) of {:?}",
            subscribed.len(),
            names.len(),
            network.id()
        );
        Ok(Self {
            id: None,
            network: network.id(),
            neurons: subscribed,
            fields: names,
            dt: None,
            persistence,
            timeline,
            traces,
            structure: None,
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════

    pub fn id(&self) -> Option<RecorderId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: RecorderId) {
        self.id = Some(id);
    }

    /// The network this recorder was built for, once that network is registered
    pub fn network_id(&self) -> Option<NetworkId> {
        self.network
    }

    pub(crate) fn bind(&mut self, network: NetworkId) {
        self.network = Some(network);
    }

    pub fn neuron_ids(&self) -> &[NeuronId] {
        &self.neurons
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Step size of the run this recorder was last attached to
    pub fn dt(&self) -> Option<f64> {
        self.dt
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn is_on_disk(&self) -> bool {
        matches!(self.persistence, Persistence::Disk { .. })
    }

    /// Number of ticks recorded so far
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.len() == 0
    }

    // ═══════════════════════════════════════════════════════════
    // Sampling
    // ═══════════════════════════════════════════════════════════

    pub(crate) fn attach(&mut self, dt: f64) {
        self.dt = Some(dt);
    }

    /// Append the subscribed fields of every subscribed neuron still present,
    /// then the tick time once
    pub(crate) fn sample(&mut self, network: &Network, time: f64) -> SimResult<()> {
        for (field, per_neuron) in self.traces.iter_mut() {
            for (id, trace) in per_neuron.iter_mut() {
                if let Some(value) = network.field_value(*id, field) {
                    trace.push(value)?;
                }
            }
        }
        self.timeline.push(time)
    }

    /// Write buffered samples through to disk
    pub fn flush(&mut self) -> SimResult<()> {
        self.timeline.flush()?;
        for per_neuron in self.traces.values_mut() {
            for trace in per_neuron.values_mut() {
                trace.flush()?;
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Retrieval
    // ═══════════════════════════════════════════════════════════

    fn trace_mut(&mut self, field: &str, neuron: NeuronId) -> SimResult<&mut Trace> {
        self.traces
            .get_mut(field)
            .ok_or_else(|| SimError::NotFound(format!("recorded field '{}'", field)))?
            .get_mut(&neuron)
            .ok_or_else(|| SimError::NotFound(format!("recorded {}", neuron)))
    }

    /// Whole sampled sequence of `field` for `neuron`
    pub fn trace(&mut self, field: &str, neuron: NeuronId) -> SimResult<Vec<f64>> {
        self.trace_mut(field, neuron)?.values()
    }

    /// Every sampled sequence of `field`, keyed by neuron id
    pub fn traces(&mut self, field: &str) -> SimResult<BTreeMap<NeuronId, Vec<f64>>> {
        let per_neuron = self
            .traces
            .get_mut(field)
            .ok_or_else(|| SimError::NotFound(format!("recorded field '{}'", field)))?;
        let mut traces = BTreeMap::new();
        for (id, trace) in per_neuron.iter_mut() {
            traces.insert(*id, trace.values()?);
        }
        Ok(traces)
    }

    /// Tick times recorded so far
    pub fn timeline(&mut self) -> SimResult<Vec<f64>> {
        self.timeline.values()
    }

    // ═══════════════════════════════════════════════════════════
    // Network structure
    // ═══════════════════════════════════════════════════════════

    /// Capture the network's nodes and its edges weighted by `weight_field`
    /// (0.0 where a synapse lacks it)
    pub fn set_network_structure(&mut self, network: &Network, weight_field: &str) {
        let mut graph = Graph::new();
        for id in network.get_neuron_ids() {
            graph.add_node(id, Default::default());
        }
        for synapse in network.synapses() {
            let weight = synapse.state.fields.value(weight_field);
            graph.add_edge(
                synapse.source,
                synapse.dest,
                [(weight_field, weight)].into_iter().collect(),
            );
        }
        self.structure = Some(graph);
    }

    pub fn network_structure(&self) -> Option<&Graph> {
        self.structure.as_ref()
    }

    /// Write the captured structure to `<path>.nstruct`
    pub fn save_network_structure(&self, path: impl AsRef<Path>) -> SimResult<PathBuf> {
        let structure = self
            .structure
            .as_ref()
            .ok_or_else(|| SimError::NotFound("captured network structure".to_string()))?;
        let file = with_suffix(path.as_ref(), STRUCTURE_FILE_EXTENSION);
        let mut out = BufWriter::new(File::create(&file)?);
        bincode::serialize_into(&mut out, structure)?;
        out.flush()?;
        Ok(file)
    }

    // ═══════════════════════════════════════════════════════════
    // Persistence
    // ═══════════════════════════════════════════════════════════

    /// Write an in-memory recorder to `<path>.pRek`
    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<PathBuf> {
        if self.is_on_disk() {
            return Err(SimError::Config(
                "a store-backed recorder is already persisted".to_string(),
            ));
        }
        let file = with_suffix(path.as_ref(), RECORDER_FILE_EXTENSION);
        let mut out = BufWriter::new(File::create(&file)?);
        bincode::serialize_into(&mut out, self)?;
        out.flush()?;
        info!("[RECORDER] Saved to {}", file.display());
        Ok(file)
    }

    /// Read a recorder written by [`Recorder::save`]
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let file = with_suffix(path.as_ref(), RECORDER_FILE_EXTENSION);
        Ok(bincode::deserialize_from(BufReader::new(File::open(&file)?))?)
    }

    /// One `<prefix>_<field>.txt` per field, rows `id,v0,v1,...`
    pub fn save_to_text(&mut self, prefix: impl AsRef<Path>) -> SimResult<Vec<PathBuf>> {
        let prefix = prefix.as_ref();
        let mut written = Vec::with_capacity(self.fields.len());
        for field in self.fields.clone() {
            let mut name = OsString::from(prefix.as_os_str());
            name.push(format!("_{}.txt", field));
            let path = PathBuf::from(name);

            let mut out = BufWriter::new(File::create(&path)?);
            for (id, values) in self.traces(&field)? {
                write_row(&mut out, id, &values)?;
            }
            out.flush()?;
            written.push(path);
        }
        Ok(written)
    }
}

/// `id,v0,v1,...` followed by a newline
pub(crate) fn write_row(out: &mut impl Write, id: NeuronId, values: &[f64]) -> io::Result<()> {
    write!(out, "{}", id.0)?;
    for value in values {
        write!(out, ",{}", value)?;
    }
    writeln!(out)
}
