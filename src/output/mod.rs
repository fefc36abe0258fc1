//! Simulation outputs.
//!
//! - [`SnapshotStore`]: periodic frames of interior node voltages per grid
//! - [`Trace`]: one line per step with the voltages of selected elements
//! - [`gnuplot`]: plotting script for a trace file
//! - [`TunnelEvent`]: record of each tunnel event

pub mod gnuplot;
mod snapshot;
mod trace;
mod tunnel_log;

pub use gnuplot::{gnuplot_script, write_gnuplot_script};
pub use snapshot::{Frame, SnapshotStore};
pub use trace::Trace;
pub use tunnel_log::TunnelEvent;
