//! Main simulator interface.

use std::io::Write;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::circuit::{validate_circuit, Circuit, Grid, GridId};
use crate::element::Element;
use crate::error::{Result, SeoError};
use crate::output::{SnapshotStore, Trace, TunnelEvent};

use super::events::{select_event, SelectedEvent};
use super::relaxation::{relax, VoltageTrigger};
use super::{
    DEFAULT_DT, DEFAULT_END_TIME, DEFAULT_RELAXATION_PASSES, DEFAULT_TRIGGER_WINDOW_STEPS,
};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Base time step.
    pub dt: f64,
    /// The run loop stops once `t >= end_time`.
    pub end_time: f64,
    /// Relaxation sweeps per step.
    pub relaxation_passes: usize,
    /// Trigger window length in multiples of `dt`.
    pub trigger_window_steps: f64,
    /// Snapshot period; `None` uses `dt`.
    pub snapshot_interval: Option<f64>,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Fail with [`SeoError::NumericalOverflow`] on NaN/Inf after each step.
    pub check_finite: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            end_time: DEFAULT_END_TIME,
            relaxation_passes: DEFAULT_RELAXATION_PASSES,
            trigger_window_steps: DEFAULT_TRIGGER_WINDOW_STEPS,
            snapshot_interval: None,
            seed: None,
            check_finite: true,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = end_time;
        self
    }

    /// Set the number of relaxation sweeps per step.
    ///
    /// Voltages in large grids settle slowly, so fewer passes trade
    /// accuracy of the neighbour coupling for speed.
    pub fn with_relaxation_passes(mut self, passes: usize) -> Self {
        self.relaxation_passes = passes;
        self
    }

    pub fn with_trigger_window_steps(mut self, steps: f64) -> Self {
        self.trigger_window_steps = steps;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: f64) -> Self {
        self.snapshot_interval = Some(interval);
        self
    }

    /// Fix the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_check_finite(mut self, check: bool) -> Self {
        self.check_finite = check;
        self
    }

    /// Effective snapshot period.
    pub fn snapshot_interval(&self) -> f64 {
        self.snapshot_interval.unwrap_or(self.dt)
    }

    /// Trigger window length in time units.
    pub fn trigger_window(&self) -> f64 {
        self.trigger_window_steps * self.dt
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SeoError::invalid_simulation_param(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.end_time.is_finite() || self.end_time <= 0.0 {
            return Err(SeoError::invalid_simulation_param(format!(
                "end_time must be finite and > 0, got {}",
                self.end_time
            )));
        }
        if self.relaxation_passes == 0 {
            return Err(SeoError::invalid_simulation_param(
                "relaxation_passes must be at least 1",
            ));
        }
        if !self.trigger_window_steps.is_finite() || self.trigger_window_steps < 0.0 {
            return Err(SeoError::invalid_simulation_param(
                "trigger_window_steps must be finite and >= 0",
            ));
        }
        let interval = self.snapshot_interval();
        if !interval.is_finite() || interval <= 0.0 {
            return Err(SeoError::invalid_simulation_param(format!(
                "snapshot_interval must be finite and > 0, got {interval}"
            )));
        }
        Ok(())
    }
}

/// What happened during one [`Simulator::run_step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Time advanced by the step
    pub step: f64,
    /// Tunnel event applied, if one fell inside the step
    pub event: Option<TunnelEvent>,
}

/// The grid simulator.
pub struct Simulator {
    circuit: Circuit,
    grids: Vec<Grid>,
    config: SimulatorConfig,
    rng: ChaCha8Rng,
    /// Current simulation time
    t: f64,
    triggers: Vec<VoltageTrigger>,
    snapshots: SnapshotStore,
    traces: Vec<Trace>,
    tunnel_events: Vec<TunnelEvent>,
    tunnel_log: Option<Box<dyn Write>>,
    /// Last progress stage reported (0..=10)
    progress_stage: Option<usize>,
}

impl Simulator {
    /// Create a simulator with default configuration and the given timing.
    pub fn new(circuit: Circuit, dt: f64, end_time: f64) -> Result<Self> {
        let config = SimulatorConfig::default()
            .with_dt(dt)
            .with_end_time(end_time);
        Self::with_config(circuit, config)
    }

    pub fn with_config(circuit: Circuit, config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let snapshots = SnapshotStore::new(config.snapshot_interval());
        Ok(Self {
            circuit,
            grids: Vec::new(),
            config,
            rng,
            t: 0.0,
            triggers: Vec::new(),
            snapshots,
            traces: Vec::new(),
            tunnel_events: Vec::new(),
            tunnel_log: None,
            progress_stage: None,
        })
    }

    // ============ Setup ============

    /// Register a grid. Grids are swept in registration order.
    pub fn add_grid(&mut self, grid: Grid) -> GridId {
        self.grids.push(grid);
        GridId(self.grids.len() - 1)
    }

    /// Register a voltage trigger.
    ///
    /// The target is not checked here; a missing grid or out-of-range cell
    /// is reported when the trigger becomes active.
    pub fn add_voltage_trigger(
        &mut self,
        time: f64,
        grid: GridId,
        row: usize,
        col: usize,
        magnitude: f64,
    ) {
        self.triggers
            .push(VoltageTrigger::new(time, grid, row, col, magnitude));
    }

    /// Write a line per step with the voltages of the trace's elements.
    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    /// Also write every tunnel event as a text line to `sink`.
    pub fn set_tunnel_log(&mut self, sink: impl Write + 'static) {
        self.tunnel_log = Some(Box::new(sink));
    }

    // ============ Stepping ============

    /// Advance the simulation by one step.
    pub fn run_step(&mut self) -> Result<StepOutcome> {
        let t = self.t;
        let dt = self.config.dt;

        self.snapshots.capture_due(t, &self.circuit, &self.grids)?;
        for trace in &mut self.traces {
            trace.write_line(t, &self.circuit)?;
        }

        relax(
            &mut self.circuit,
            &mut self.grids,
            &self.triggers,
            t,
            self.config.trigger_window(),
            self.config.relaxation_passes,
        )?;

        for grid in &self.grids {
            grid.update_energies(&mut self.circuit)?;
        }

        let mut step = dt;
        let mut event = None;
        if let Some(selected) = select_event(&mut self.circuit, &mut self.grids, dt, &mut self.rng)? {
            step = selected.wait_time();
            event = Some(self.apply_event(selected)?);
        }

        for grid in &self.grids {
            grid.update_charges(&mut self.circuit, step)?;
        }
        if self.config.check_finite {
            self.circuit.check_finite()?;
        }

        self.t += step;
        Ok(StepOutcome { step, event })
    }

    fn apply_event(&mut self, selected: SelectedEvent) -> Result<TunnelEvent> {
        let site = selected.site;
        let direction = site.candidate.direction;
        self.circuit.tunnel(site.cell, direction)?;

        let event = TunnelEvent {
            t: self.t,
            grid: selected.grid,
            grid_label: self.grid_label(selected.grid),
            row: site.row,
            col: site.col,
            element: site.candidate.element,
            direction,
        };
        let kind = self.circuit.get(site.cell).map_or("unknown", Element::kind);
        log::debug!("tunnel ({kind}): {event}");
        if let Some(sink) = self.tunnel_log.as_mut() {
            writeln!(sink, "{event}").map_err(|e| SeoError::io("tunnel log", e))?;
        }
        self.tunnel_events.push(event.clone());
        Ok(event)
    }

    fn grid_label(&self, id: GridId) -> String {
        self.grids
            .get(id.0)
            .and_then(Grid::output_label)
            .map_or_else(|| id.to_string(), str::to_string)
    }

    /// Run until `t >= end_time`, then flush all outputs.
    pub fn run(&mut self) -> Result<()> {
        validate_circuit(&self.circuit, &self.grids)?;
        log::info!(
            "starting simulation: {} grids, {} elements, dt={}, end_time={}",
            self.grids.len(),
            self.circuit.len(),
            self.config.dt,
            self.config.end_time
        );

        while self.t < self.config.end_time {
            self.run_step()?;
            self.report_progress();
        }

        self.flush()?;
        log::info!(
            "simulation finished at t={} with {} tunnel events",
            self.t,
            self.tunnel_events.len()
        );
        Ok(())
    }

    fn report_progress(&mut self) {
        let stage = ((self.t / self.config.end_time) * 10.0).clamp(0.0, 10.0) as usize;
        if self.progress_stage != Some(stage) {
            self.progress_stage = Some(stage);
            log::info!("simulation progress: {}%", stage * 10);
        }
    }

    /// Flush traces and the tunnel log.
    pub fn flush(&mut self) -> Result<()> {
        for trace in &mut self.traces {
            trace.flush()?;
        }
        if let Some(sink) = self.tunnel_log.as_mut() {
            sink.flush().map_err(|e| SeoError::io("tunnel log", e))?;
        }
        Ok(())
    }

    // ============ Accessors ============

    /// Current simulation time.
    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.get(id.0)
    }

    pub fn grid_mut(&mut self, id: GridId) -> Option<&mut Grid> {
        self.grids.get_mut(id.0)
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn triggers(&self) -> &[VoltageTrigger] {
        &self.triggers
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Every tunnel event applied so far, in order.
    pub fn tunnel_events(&self) -> &[TunnelEvent] {
        &self.tunnel_events
    }
}
