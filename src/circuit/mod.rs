//! Element arena, grids and validation.
//!
//! Elements live in a [`Circuit`] arena and are addressed by [`ElementId`].
//! A [`Grid`] is a 2D view onto that arena: it stores handles, so one
//! element may sit in a grid cell and still be the neighbour of cells in
//! other grids.

mod grid;
mod network;
mod types;
mod validate;

pub use grid::{Grid, TunnelSite};
pub use network::{Circuit, LeafIds};
pub use types::*;
pub use validate::validate_circuit;
