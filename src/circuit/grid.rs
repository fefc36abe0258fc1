//! Dense 2D grid of element handles.

use rand::RngCore;

use super::network::Circuit;
use super::types::{Direction, ElementId, TunnelCandidate};
use crate::error::{Result, SeoError};

/// Location and target of the next tunnel event within a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelSite {
    pub row: usize,
    pub col: usize,
    /// Element stored in the cell (may be a one-way unit)
    pub cell: ElementId,
    /// Concrete oscillator and direction that will tunnel
    pub candidate: TunnelCandidate,
}

/// A rows×cols array of element handles.
///
/// The grid does not own its elements: they live in a [`Circuit`] and may
/// also be neighbours of elements in other grids. Cells start empty; bulk
/// operations skip empty cells.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<ElementId>>,
    output_enabled: bool,
    label: Option<String>,
    /// Smallest enabled wait time from the last [`Grid::min_wait_time`]
    min_wt: f64,
    tunnel_place: Option<TunnelSite>,
    /// Neighbour sums buffered before commit
    scratch: Vec<(ElementId, f64)>,
}

impl Grid {
    /// Create an empty grid with output enabled and no label.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            output_enabled: true,
            label: None,
            min_wt: f64::INFINITY,
            tunnel_place: None,
            scratch: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_output_enabled(mut self, enabled: bool) -> Self {
        self.output_enabled = enabled;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if !self.contains(row, col) {
            return Err(SeoError::CellOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Place an element handle in a cell, replacing any previous one.
    pub fn set_element(&mut self, row: usize, col: usize, element: ElementId) -> Result<()> {
        let idx = self.index(row, col)?;
        self.cells[idx] = Some(element);
        Ok(())
    }

    /// Handle stored in a cell.
    pub fn element(&self, row: usize, col: usize) -> Result<ElementId> {
        let idx = self.index(row, col)?;
        self.cells[idx].ok_or(SeoError::EmptyCell { row, col })
    }

    /// Handle stored in a cell, `None` if empty or out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<ElementId> {
        self.index(row, col).ok().and_then(|idx| self.cells[idx])
    }

    /// Iterate populated cells as `(row, col, element)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, ElementId)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|id| (i / cols, i % cols, id)))
    }

    /// Position of an element, if it is stored in this grid.
    pub fn position_of(&self, element: ElementId) -> Option<(usize, usize)> {
        self.cells()
            .find(|&(_, _, id)| id == element)
            .map(|(row, col, _)| (row, col))
    }

    // ============ Output metadata ============

    pub fn is_output_enabled(&self) -> bool {
        self.output_enabled
    }

    pub fn set_output_enabled(&mut self, enabled: bool) {
        self.output_enabled = enabled;
    }

    pub fn has_output_label(&self) -> bool {
        self.label.is_some()
    }

    pub fn output_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_output_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    // ============ Bulk operations ============

    /// Recompute `V_sum` for every cell from the neighbours' current `Vn`.
    ///
    /// All sums are computed before any is written back.
    pub fn update_surrounding_voltages(&mut self, circuit: &mut Circuit) -> Result<()> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        for (_, _, id) in self.cells() {
            for leaf in circuit.leaf_ids(id)? {
                scratch.push((leaf, circuit.neighbor_sum(leaf)?));
            }
        }
        for &(leaf, sum) in &scratch {
            circuit.oscillator_mut(leaf)?.node_mut().v_sum = sum;
        }
        self.scratch = scratch;
        Ok(())
    }

    /// Recompute `Vn` for every cell.
    pub fn update_voltages(&self, circuit: &mut Circuit) -> Result<()> {
        for (_, _, id) in self.cells() {
            circuit.update_voltage(id)?;
        }
        Ok(())
    }

    /// Recompute `dE` for every cell.
    pub fn update_energies(&self, circuit: &mut Circuit) -> Result<()> {
        for (_, _, id) in self.cells() {
            circuit.update_energy(id)?;
        }
        Ok(())
    }

    /// Integrate the leakage current of every cell over `dt`.
    pub fn update_charges(&self, circuit: &mut Circuit, dt: f64) -> Result<()> {
        for (_, _, id) in self.cells() {
            circuit.update_charge(id, dt)?;
        }
        Ok(())
    }

    /// Sample wait times for every cell and record the smallest one.
    ///
    /// Returns `true` if that minimum is strictly below `dt`. When no cell
    /// is enabled the minimum is infinite and the result is `false`.
    pub fn min_wait_time(
        &mut self,
        circuit: &mut Circuit,
        dt: f64,
        rng: &mut dyn RngCore,
    ) -> Result<bool> {
        self.min_wt = f64::INFINITY;
        self.tunnel_place = None;

        let cols = self.cols;
        for (i, cell) in self.cells.iter().enumerate() {
            let Some(id) = *cell else { continue };
            if !circuit.sample_wait_times(id, rng)? {
                continue;
            }
            if let Some(candidate) = circuit.next_event(id)? {
                if candidate.wait_time < self.min_wt {
                    self.min_wt = candidate.wait_time;
                    self.tunnel_place = Some(TunnelSite {
                        row: i / cols,
                        col: i % cols,
                        cell: id,
                        candidate,
                    });
                }
            }
        }
        Ok(self.min_wt < dt)
    }

    /// Smallest wait time found by the last sampling (infinite if none).
    pub fn min_wt(&self) -> f64 {
        self.min_wt
    }

    pub fn tunnel_place(&self) -> Option<TunnelSite> {
        self.tunnel_place
    }

    pub fn tunnel_direction(&self) -> Option<Direction> {
        self.tunnel_place.map(|site| site.candidate.direction)
    }
}
