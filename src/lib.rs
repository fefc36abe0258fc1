//! # SEO Grid
//!
//! A stochastic simulator for networks of single-electron tunneling
//! oscillators (SEOs) arranged on 2D grids.
//!
//! This library provides:
//! - Oscillator models: single junctions, series junction stacks and
//!   four-member one-way conduction units
//! - An element arena with explicit neighbour wiring, shared by any number
//!   of grids
//! - A time-stepping engine combining iterative voltage relaxation with
//!   kinetic Monte Carlo selection of tunnel events
//! - Snapshot, trace, gnuplot and tunnel-log outputs
//!
//! ## Architecture
//!
//! - [`element`] - Oscillator physics (voltage, tunnel energy, wait times)
//! - [`circuit`] - Element arena, grids and validation
//! - [`solver`] - Relaxation, event selection and the [`Simulator`]
//! - [`output`] - Snapshots, traces and logs
//!
//! ## Usage
//!
//! ```no_run
//! use seo_grid::{Circuit, Grid, Simulator, SimulatorConfig};
//! use seo_grid::element::ElementParams;
//!
//! # fn main() -> seo_grid::Result<()> {
//! let mut circuit = Circuit::new();
//! let seo = circuit.add_junction(ElementParams::new(0.5, 0.002, seo_grid::CJ_LEG4, 2.0, 0.0044, 4))?;
//!
//! let mut grid = Grid::new(1, 1).with_label("single");
//! grid.set_element(0, 0, seo)?;
//!
//! let config = SimulatorConfig::new().with_dt(0.1).with_end_time(200.0).with_seed(7);
//! let mut sim = Simulator::with_config(circuit, config)?;
//! sim.add_grid(grid);
//! sim.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Simulation Method
//!
//! Each node holds a charge `Q` and sees the voltages of its neighbours
//! through coupling capacitors `C`. Per step, node voltages are relaxed over
//! a fixed number of sweeps, the energy `dE` released by tunneling one
//! electron up or down is computed, and every direction with `dE > 0`
//! draws an exponential wait time with rate `dE / (e²·Rj)`. The globally
//! smallest wait time fires if it is shorter than `dt` and becomes the
//! step size; charges then relax towards the bias through `R`.
//!
//! Units are scaled: capacitances in aF, voltages in V, resistances in
//! GΩ-scaled units and time in ns, so `e = 0.1602`.

pub mod circuit;
pub mod element;
pub mod error;
pub mod output;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Circuit, Grid};
pub use error::{Result, SeoError};
pub use solver::{Simulator, SimulatorConfig};

/// Elementary charge in the simulator's scaled units
pub const ELEMENTARY_CHARGE: f64 = 0.1602;

/// Junction capacitance for an element with one neighbour
pub const CJ_LEG1: f64 = 18.0;
/// Junction capacitance for an element with two neighbours
pub const CJ_LEG2: f64 = 16.0;
/// Junction capacitance for an element with three neighbours
pub const CJ_LEG3: f64 = 14.0;
/// Junction capacitance for an element with four neighbours
pub const CJ_LEG4: f64 = 12.0;
/// Junction capacitance for an element with five neighbours
pub const CJ_LEG5: f64 = 10.0;
/// Junction capacitance for an element with six neighbours
pub const CJ_LEG6: f64 = 8.0;

/// Junction capacitance used for junction stacks
pub const MULTI_CJ: f64 = 390.0;
