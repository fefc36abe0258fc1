//! Time-stepping engine.
//!
//! Each step of the [`Simulator`] runs:
//!
//! 1. Snapshot and trace output for the current time
//! 2. Relaxation: [`DEFAULT_RELAXATION_PASSES`] sweeps over every grid
//!    recomputing neighbour sums, applying voltage triggers and
//!    recomputing node voltages
//! 3. Tunnel energies for every cell
//! 4. Kinetic Monte Carlo event selection: the smallest sampled wait time
//!    over all grids fires if it falls inside the step
//! 5. Charge integration over the chosen step (`dt`, or the wait time of
//!    the event that fired)

mod events;
mod relaxation;
mod simulator;

pub use relaxation::VoltageTrigger;
pub use simulator::{Simulator, SimulatorConfig, StepOutcome};

/// Relaxation sweeps per time step.
pub const DEFAULT_RELAXATION_PASSES: usize = 5;

/// Length of a trigger's active window, in multiples of `dt`.
pub const DEFAULT_TRIGGER_WINDOW_STEPS: f64 = 10.0;

/// Default base time step.
pub const DEFAULT_DT: f64 = 0.1;

/// Default simulated duration.
pub const DEFAULT_END_TIME: f64 = 200.0;
