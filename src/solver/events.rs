//! Global tunnel event selection across grids.

use rand::RngCore;

use crate::circuit::{Circuit, Grid, GridId, TunnelSite};
use crate::error::Result;

/// The event chosen for the current step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SelectedEvent {
    pub grid: GridId,
    pub site: TunnelSite,
}

impl SelectedEvent {
    pub fn wait_time(&self) -> f64 {
        self.site.candidate.wait_time
    }
}

/// Sample every grid and pick the smallest wait time below `dt`.
///
/// Ties go to the grid added first.
pub(crate) fn select_event(
    circuit: &mut Circuit,
    grids: &mut [Grid],
    dt: f64,
    rng: &mut dyn RngCore,
) -> Result<Option<SelectedEvent>> {
    let mut best: Option<SelectedEvent> = None;
    let mut min_wt = dt;
    for (index, grid) in grids.iter_mut().enumerate() {
        if !grid.min_wait_time(circuit, dt, rng)? {
            continue;
        }
        if let Some(site) = grid.tunnel_place() {
            if grid.min_wt() < min_wt {
                min_wt = grid.min_wt();
                best = Some(SelectedEvent {
                    grid: GridId(index),
                    site,
                });
            }
        }
    }
    Ok(best)
}
