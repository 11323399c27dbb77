// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # Network: topology and tick protocol
//!
//! Each tick runs three phases in strict order:
//!
//! 1. **Neuron phase**: every neuron's model consumes its accumulated input
//!    (`I`), integrates one `dt`, and resets `I` to zero.
//! 2. **Synapse phase**: every synapse, in id order, reads its source and adds
//!    its contribution into its destination's `I`.
//! 3. **Recording phase**: every attached recorder samples its subscribed
//!    fields of the neurons still present, then appends the tick time once.
//!
//! Neurons live in an arena (`Vec`) addressed through an id -> slot map so
//! that a synapse can borrow its source immutably and its destination mutably
//! at the same time. A neuron -> incident synapse index keeps cascading
//! deletes proportional to the neuron's degree.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use neuronet_config::NeuronetConfig;

use crate::error::{SimError, SimResult};
use crate::fields::{FieldTable, DT};
use crate::graph::GraphSource;
use crate::ids::{NetworkId, NeuronId, RecorderId, SynapseId};
use crate::models::{NeuronKind, NeuronModel, SynapseModel};
use crate::recorder::Recorder;
use crate::synapse::{SynapseKind, SynapseState};

/// Suffix appended to network state files
pub const STATE_FILE_EXTENSION: &str = "pNet";

const DEFAULT_PROGRESS_INTERVAL_SECS: f64 = 60.0;

/// Upper bound on the ticks of one `simulate` call; every tick is kept in the timeline
pub const MAX_TICKS_PER_RUN: u64 = u32::MAX as u64;

/// One neuron: its update function and its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronRecord {
    pub id: NeuronId,
    pub model: NeuronKind,
    pub fields: FieldTable,
}

/// One directed synapse. `source` and `dest` are lookups, not ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseRecord {
    pub id: SynapseId,
    pub source: NeuronId,
    pub dest: NeuronId,
    pub model: SynapseKind,
    pub state: SynapseState,
}

/// Neurons, synapses, clock and timeline of one independent simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    id: Option<NetworkId>,
    dt: f64,

    neurons: Vec<NeuronRecord>,
    slots: BTreeMap<NeuronId, usize>,
    synapses: BTreeMap<SynapseId, SynapseRecord>,
    incident: AHashMap<NeuronId, BTreeSet<SynapseId>>,

    next_neuron: u64,
    next_synapse: u64,

    time: f64,
    timeline: Vec<f64>,
    attached: Vec<RecorderId>,

    neuron_model: NeuronKind,
    neuron_template: FieldTable,
    synapse_model: SynapseKind,
    synapse_template: FieldTable,

    verbose: bool,
    progress_interval_secs: f64,
}

/// Source immutably and destination mutably out of one slice (`a != b`)
fn split_pair(neurons: &mut [NeuronRecord], a: usize, b: usize) -> (&NeuronRecord, &mut NeuronRecord) {
    if a < b {
        let (head, tail) = neurons.split_at_mut(b);
        (&head[a], &mut tail[0])
    } else {
        let (head, tail) = neurons.split_at_mut(a);
        (&tail[0], &mut head[b])
    }
}

fn state_file(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(STATE_FILE_EXTENSION);
    PathBuf::from(name)
}

impl Network {
    /// Empty network with the default models (Izhikevich neurons, delayed-buffer synapses)
    pub fn new(dt: f64) -> SimResult<Self> {
        Self::with_models(dt, NeuronKind::default(), SynapseKind::default())
    }

    /// Empty network whose templates come from the given models
    pub fn with_models(dt: f64, neuron_model: NeuronKind, synapse_model: SynapseKind) -> SimResult<Self> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(SimError::Config(format!("time step must be positive, got {}", dt)));
        }
        Ok(Self {
            id: None,
            dt,
            neurons: Vec::new(),
            slots: BTreeMap::new(),
            synapses: BTreeMap::new(),
            incident: AHashMap::new(),
            next_neuron: 0,
            next_synapse: 0,
            time: 0.0,
            timeline: Vec::new(),
            attached: Vec::new(),
            neuron_model,
            neuron_template: neuron_model.defaults(),
            synapse_model,
            synapse_template: synapse_model.defaults(),
            verbose: false,
            progress_interval_secs: DEFAULT_PROGRESS_INTERVAL_SECS,
        })
    }

    /// Empty network using `simulation.dt`, `verbose` and the progress interval
    pub fn from_config(config: &NeuronetConfig) -> SimResult<Self> {
        let mut network = Self::new(config.simulation.dt)?;
        network.verbose = config.simulation.verbose;
        network.progress_interval_secs = config.simulation.progress_interval_secs;
        Ok(network)
    }

    /// Every node becomes a neuron (template overridden by node attributes),
    /// every edge a synapse (template overridden by edge attributes).
    pub fn from_graph(
        graph: &dyn GraphSource,
        neuron_model: NeuronKind,
        synapse_model: SynapseKind,
        dt: f64,
    ) -> SimResult<Self> {
        let mut network = Self::with_models(dt, neuron_model, synapse_model)?;
        let started = Instant::now();

        for (id, attributes) in graph.nodes() {
            network.add_neuron(Some(attributes.clone()), None, Some(id))?;
        }
        for (source, dest, attributes) in graph.edges() {
            network.connect(source, dest, Some(attributes), None, None)?;
        }

        debug!(
            "[NETWORK] Created network with {} nodes and {} connections in {:.2}s",
            network.neuron_count(),
            network.synapse_count(),
            started.elapsed().as_secs_f64()
        );
        Ok(network)
    }

    // ═══════════════════════════════════════════════════════════
    // Settings
    // ═══════════════════════════════════════════════════════════

    pub fn id(&self) -> Option<NetworkId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: NetworkId) {
        self.id = Some(id);
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Minimum seconds between progress lines while verbose
    pub fn set_progress_interval(&mut self, secs: f64) {
        self.progress_interval_secs = secs;
    }

    pub fn neuron_model(&self) -> NeuronKind {
        self.neuron_model
    }

    pub fn synapse_model(&self) -> SynapseKind {
        self.synapse_model
    }

    /// Replace the default neuron template; it must satisfy the default model's schema
    pub fn set_neuron_template(&mut self, template: FieldTable) -> SimResult<()> {
        template.validate(self.neuron_model.model_name(), self.neuron_model.schema())?;
        self.neuron_template = template;
        Ok(())
    }

    /// Replace the default synapse template
    pub fn set_synapse_template(&mut self, template: FieldTable) -> SimResult<()> {
        let state = self.synapse_model.init_state(template.clone(), self.dt, 0)?;
        state
            .fields
            .validate(self.synapse_model.model_name(), self.synapse_model.schema())?;
        self.synapse_template = template;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Topology mutation
    // ═══════════════════════════════════════════════════════════

    fn neuron_base(&self, model: NeuronKind) -> FieldTable {
        if model == self.neuron_model {
            self.neuron_template.clone()
        } else {
            model.defaults()
        }
    }

    /// Add a neuron and return its id.
    ///
    /// Without `fields` and `model` the network's template and default model
    /// are used. Supplied `fields` are laid over the model's template. A model
    /// without fields is a [`SimError::Config`]. Without `id` the next free id
    /// is assigned; an explicit id that exists is a [`SimError::DuplicateId`].
    pub fn add_neuron(
        &mut self,
        fields: Option<FieldTable>,
        model: Option<NeuronKind>,
        id: Option<NeuronId>,
    ) -> SimResult<NeuronId> {
        let (model, mut fields) = match (fields, model) {
            (None, None) => (self.neuron_model, self.neuron_template.clone()),
            (Some(fields), model) => {
                let model = model.unwrap_or(self.neuron_model);
                (model, self.neuron_base(model).merged(&fields))
            }
            (None, Some(model)) => {
                return Err(SimError::Config(format!(
                    "neuron model '{}' given without its fields",
                    model
                )))
            }
        };

        let id = match id {
            Some(id) if self.slots.contains_key(&id) => {
                return Err(SimError::DuplicateId(id.to_string()));
            }
            Some(id) => id,
            None => {
                while self.slots.contains_key(&NeuronId(self.next_neuron)) {
                    self.next_neuron += 1;
                }
                NeuronId(self.next_neuron)
            }
        };

        fields.set(DT, self.dt);
        model.prepare(&mut fields, id.0);
        fields.validate(model.model_name(), model.schema())?;

        self.slots.insert(id, self.neurons.len());
        self.neurons.push(NeuronRecord { id, model, fields });
        trace!("[NETWORK] Added {} ({})", id, model);
        Ok(id)
    }

    /// Connect `source -> dest` and return the new synapse id.
    ///
    /// Without `model` and `state` the network's synapse template is used.
    /// `model` and `state` must be given together, otherwise
    /// [`SimError::Config`]. `overrides` are merged onto the fields either way.
    pub fn connect(
        &mut self,
        source: NeuronId,
        dest: NeuronId,
        overrides: Option<&FieldTable>,
        model: Option<SynapseKind>,
        state: Option<SynapseState>,
    ) -> SimResult<SynapseId> {
        for endpoint in [source, dest] {
            if !self.slots.contains_key(&endpoint) {
                return Err(SimError::NotFound(format!("{} (synapse endpoint)", endpoint)));
            }
        }

        let id = SynapseId(self.next_synapse);
        let (model, state) = match (model, state) {
            (None, None) => {
                let mut fields = self.synapse_template.clone();
                if let Some(overrides) = overrides {
                    fields.merge(overrides);
                }
                let model = self.synapse_model;
                (model, model.init_state(fields, self.dt, id.0)?)
            }
            (Some(model), Some(given)) => {
                let mut fields = given.fields;
                if let Some(overrides) = overrides {
                    fields.merge(overrides);
                }
                let mut state = model.init_state(fields, self.dt, id.0)?;
                if state.delay.is_some() && given.delay.is_some() {
                    state.delay = given.delay;
                }
                (model, state)
            }
            (Some(model), None) => {
                return Err(SimError::Config(format!(
                    "synapse model '{}' given without its state",
                    model
                )))
            }
            (None, Some(_)) => {
                return Err(SimError::Config(
                    "synapse state given without its model".to_string(),
                ))
            }
        };
        state.fields.validate(model.model_name(), model.schema())?;

        self.synapses.insert(
            id,
            SynapseRecord {
                id,
                source,
                dest,
                model,
                state,
            },
        );
        self.incident.entry(source).or_default().insert(id);
        self.incident.entry(dest).or_default().insert(id);
        self.next_synapse += 1;
        trace!("[NETWORK] Connected {} -> {} as {}", source, dest, id);
        Ok(id)
    }

    fn unlink(&mut self, neuron: NeuronId, synapse: SynapseId) {
        if let Some(set) = self.incident.get_mut(&neuron) {
            set.remove(&synapse);
            if set.is_empty() {
                self.incident.remove(&neuron);
            }
        }
    }

    /// Remove a synapse and return it
    pub fn delete_connection(&mut self, id: SynapseId) -> SimResult<SynapseRecord> {
        let record = self
            .synapses
            .remove(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))?;
        self.unlink(record.source, id);
        self.unlink(record.dest, id);
        Ok(record)
    }

    /// Remove a neuron and every synapse whose source or destination it is.
    /// The id is not reassigned by later automatic allocation until the
    /// counter reaches it again.
    pub fn delete_neuron(&mut self, id: NeuronId) -> SimResult<NeuronRecord> {
        let slot = self
            .slots
            .remove(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))?;

        let incident = self.incident.remove(&id).unwrap_or_default();
        for synapse in &incident {
            if let Some(record) = self.synapses.remove(synapse) {
                let other = if record.source == id {
                    record.dest
                } else {
                    record.source
                };
                if other != id {
                    self.unlink(other, *synapse);
                }
            }
        }

        let record = self.neurons.swap_remove(slot);
        if let Some(moved) = self.neurons.get(slot) {
            self.slots.insert(moved.id, slot);
        }
        debug!(
            "[NETWORK] Deleted {} and {} incident synapse(s)",
            id,
            incident.len()
        );
        Ok(record)
    }

    // ═══════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════

    /// Ids of all present neurons, ascending
    pub fn get_neuron_ids(&self) -> Vec<NeuronId> {
        self.slots.keys().copied().collect()
    }

    /// Ids of all present synapses, ascending
    pub fn get_connection_ids(&self) -> Vec<SynapseId> {
        self.synapses.keys().copied().collect()
    }

    pub fn contains_neuron(&self, id: NeuronId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn get_neuron(&self, id: NeuronId) -> SimResult<&NeuronRecord> {
        self.slots
            .get(&id)
            .map(|slot| &self.neurons[*slot])
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    /// Mutable access, e.g. to set a stimulus between runs
    pub fn get_neuron_mut(&mut self, id: NeuronId) -> SimResult<&mut NeuronRecord> {
        match self.slots.get(&id) {
            Some(slot) => Ok(&mut self.neurons[*slot]),
            None => Err(SimError::NotFound(id.to_string())),
        }
    }

    pub fn get_synapse(&self, id: SynapseId) -> SimResult<&SynapseRecord> {
        self.synapses
            .get(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    pub fn get_synapse_mut(&mut self, id: SynapseId) -> SimResult<&mut SynapseRecord> {
        self.synapses
            .get_mut(&id)
            .ok_or_else(|| SimError::NotFound(id.to_string()))
    }

    /// Synapses whose source or destination is `id`, ascending
    pub fn incident_synapses(&self, id: NeuronId) -> Vec<SynapseId> {
        self.incident
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Current value of one neuron field, if both exist
    pub fn field_value(&self, id: NeuronId, field: &str) -> Option<f64> {
        self.slots
            .get(&id)
            .and_then(|slot| self.neurons[*slot].fields.get(field))
    }

    pub fn neuron_count(&self) -> usize {
        self.slots.len()
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    pub fn synapses(&self) -> impl Iterator<Item = &SynapseRecord> {
        self.synapses.values()
    }

    /// Elapsed simulated time in ms
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Every tick time simulated so far
    pub fn timeline(&self) -> &[f64] {
        &self.timeline
    }

    /// Recorders attached during the latest run
    pub fn attached_recorders(&self) -> &[RecorderId] {
        &self.attached
    }

    // ═══════════════════════════════════════════════════════════
    // Simulation
    // ═══════════════════════════════════════════════════════════

    fn tag(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => "Network(-)".to_string(),
        }
    }

    /// Neuron phase then synapse phase
    fn step(&mut self) {
        for neuron in &mut self.neurons {
            neuron.model.step(&mut neuron.fields);
        }

        for synapse in self.synapses.values_mut() {
            let (Some(&src), Some(&dst)) = (self.slots.get(&synapse.source), self.slots.get(&synapse.dest))
            else {
                debug!("[NETWORK] Skipping {} with a missing endpoint", synapse.id);
                continue;
            };
            if src == dst {
                let source = self.neurons[src].fields.clone();
                synapse
                    .model
                    .step(&mut synapse.state, &source, &mut self.neurons[dst].fields);
            } else {
                let (source, dest) = split_pair(&mut self.neurons, src, dst);
                synapse
                    .model
                    .step(&mut synapse.state, &source.fields, &mut dest.fields);
            }
        }
    }

    /// Number of ticks `duration_ms` covers with this network's `dt`
    pub fn ticks_for(&self, duration_ms: f64) -> SimResult<u64> {
        if !(duration_ms >= 0.0) || !duration_ms.is_finite() {
            return Err(SimError::Config(format!(
                "duration must be a non-negative number of ms, got {}",
                duration_ms
            )));
        }
        let ticks = (duration_ms / self.dt + 1e-9).floor();
        if ticks > MAX_TICKS_PER_RUN as f64 {
            return Err(SimError::Config(format!(
                "duration {} ms at dt = {} needs {} ticks, more than one run can record ({})",
                duration_ms, self.dt, ticks, MAX_TICKS_PER_RUN
            )));
        }
        Ok(ticks as u64)
    }

    /// Advance `floor(duration_ms / dt)` ticks, sampling into `recorders`.
    ///
    /// Tick `k` of this call happens at `time() + k * dt`; each tick time is
    /// appended to the network timeline and to every recorder's timeline.
    /// Recorders are flushed at the end.
    pub fn simulate(&mut self, duration_ms: f64, recorders: &mut [&mut Recorder]) -> SimResult<()> {
        let ticks = self.ticks_for(duration_ms)?;
        let start = self.time;

        self.attached = recorders.iter().filter_map(|r| r.id()).collect();
        for recorder in recorders.iter_mut() {
            recorder.attach(self.dt);
        }
        self.timeline.try_reserve(ticks as usize).map_err(|e| {
            SimError::Config(format!("cannot hold a timeline of {} more ticks: {}", ticks, e))
        })?;

        let interval = Duration::try_from_secs_f64(self.progress_interval_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_PROGRESS_INTERVAL_SECS));
        let started = Instant::now();
        let mut last_report = started;

        for k in 1..=ticks {
            let time = start + k as f64 * self.dt;
            self.step();
            self.time = time;
            self.timeline.push(time);
            for recorder in recorders.iter_mut() {
                recorder.sample(self, time)?;
            }

            if self.verbose && last_report.elapsed() >= interval {
                let runtime = started.elapsed().as_secs_f64();
                let remaining = runtime / k as f64 * (ticks - k) as f64;
                info!(
                    "[NETWORK] {} estimated time remaining: {:.4}s (running {:.2}s)",
                    self.tag(),
                    remaining,
                    runtime
                );
                last_report = Instant::now();
            }
        }

        for recorder in recorders.iter_mut() {
            recorder.flush()?;
        }
        debug!(
            "[NETWORK] {} simulated {} ticks in {:.4}s",
            self.tag(),
            ticks,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Persistence
    // ═══════════════════════════════════════════════════════════

    /// Write a snapshot to `<path>.pNet` and return the file written
    pub fn save_state(&self, path: impl AsRef<Path>) -> SimResult<PathBuf> {
        let file = state_file(path.as_ref());
        let mut writer = BufWriter::new(File::create(&file)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        info!("[NETWORK] Saved {} to {}", self.tag(), file.display());
        Ok(file)
    }

    /// Read a snapshot written by [`Network::save_state`]
    pub fn load_state(path: impl AsRef<Path>) -> SimResult<Self> {
        let file = state_file(path.as_ref());
        let reader = BufReader::new(File::open(&file)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}
