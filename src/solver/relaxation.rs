//! Iterative voltage relaxation and external voltage triggers.

use crate::circuit::{Circuit, Grid, GridId};
use crate::error::{Result, SeoError};

/// An external voltage pulse added to one cell's neighbour sum.
///
/// The trigger is active while `time <= t < time + window`, where the
/// window length is set by
/// [`SimulatorConfig::trigger_window_steps`](super::SimulatorConfig).
/// While active it is re-applied on every relaxation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageTrigger {
    pub time: f64,
    pub grid: GridId,
    pub row: usize,
    pub col: usize,
    pub magnitude: f64,
}

impl VoltageTrigger {
    pub fn new(time: f64, grid: GridId, row: usize, col: usize, magnitude: f64) -> Self {
        Self {
            time,
            grid,
            row,
            col,
            magnitude,
        }
    }

    /// Whether `t` falls inside the active window.
    pub fn is_active(&self, t: f64, window: f64) -> bool {
        t >= self.time && t < self.time + window
    }

    /// Resolve the target grid, checking the coordinates against it.
    fn target<'a>(&self, grids: &'a [Grid]) -> Result<&'a Grid> {
        let grid = grids
            .get(self.grid.0)
            .ok_or(SeoError::MissingGrid { grid: self.grid })?;
        if !grid.contains(self.row, self.col) {
            return Err(SeoError::TriggerOutOfBounds {
                grid: self.grid,
                row: self.row,
                col: self.col,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        Ok(grid)
    }
}

/// Run `passes` relaxation sweeps over all grids at time `t`.
///
/// Per pass and per grid: neighbour sums are recomputed from the previous
/// voltages, every active trigger raises its target cell's sum, then the
/// grid's voltages are recomputed. A trigger is therefore applied once per
/// grid visit, whichever grid holds its target. Active triggers are
/// resolved at the start of every pass.
pub(crate) fn relax(
    circuit: &mut Circuit,
    grids: &mut [Grid],
    triggers: &[VoltageTrigger],
    t: f64,
    window: f64,
    passes: usize,
) -> Result<()> {
    let active: Vec<&VoltageTrigger> = triggers.iter().filter(|tr| tr.is_active(t, window)).collect();
    let mut targets = Vec::with_capacity(active.len());

    for pass in 0..passes {
        targets.clear();
        for trigger in &active {
            let id = trigger.target(grids)?.element(trigger.row, trigger.col)?;
            targets.push((id, trigger.magnitude));
        }
        for grid in grids.iter_mut() {
            grid.update_surrounding_voltages(circuit)?;
            for &(id, magnitude) in &targets {
                circuit.inject_voltage(id, magnitude)?;
            }
            grid.update_voltages(circuit)?;
        }
        log::trace!("t={t}: relaxation pass {} of {passes} done", pass + 1);
    }
    Ok(())
}
