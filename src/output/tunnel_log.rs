use std::fmt;

use crate::circuit::{Direction, ElementId, GridId};

/// A tunnel event applied during a step.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelEvent {
    /// Simulation time at the start of the step
    pub t: f64,
    pub grid: GridId,
    /// Output label of the grid, or its id if unlabeled
    pub grid_label: String,
    pub row: usize,
    pub col: usize,
    /// Oscillator that tunneled (a member for one-way cells)
    pub element: ElementId,
    pub direction: Direction,
}

impl fmt::Display for TunnelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={}, x={}, y={}, dir={}, grid={}",
            self.t, self.col, self.row, self.direction, self.grid_label
        )
    }
}
