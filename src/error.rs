//! Error types for the SEO grid simulator.
//!
//! This module provides a unified error type [`SeoError`] that covers
//! all error conditions that can occur during element wiring, grid
//! population, trigger application, and simulation.

use thiserror::Error;

use crate::circuit::{ElementId, GridId};

/// Result type alias using [`SeoError`].
pub type Result<T> = std::result::Result<T, SeoError>;

/// Unified error type for all simulator operations.
#[derive(Error, Debug)]
pub enum SeoError {
    // ============ Configuration Errors ============
    /// An element was wired to itself
    #[error("Element {element} cannot be connected to itself")]
    SelfConnection { element: ElementId },

    /// More connections than the element has legs
    #[error("Element {element} has {legs} legs but {requested} connections were given")]
    TooManyConnections {
        element: ElementId,
        legs: usize,
        requested: usize,
    },

    /// Unknown tunnel direction string
    #[error("Invalid tunnel direction '{value}' (expected 'up' or 'down')")]
    InvalidDirection { value: String },

    /// Unknown one-way orientation string
    #[error("Invalid one-way orientation '{value}' (expected 'left' or 'right')")]
    InvalidOrientation { value: String },

    /// Operation only valid for a directional composite unit
    #[error("Element {element} is not a one-way unit")]
    NotComposite { element: ElementId },

    /// Invalid physical parameter
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    /// Plot label rejected
    #[error("Invalid plot label at index {index}: {message}")]
    InvalidLabel { index: usize, message: String },

    // ============ Bounds Errors ============
    /// Cell coordinates outside the grid
    #[error("Cell (row={row}, col={col}) is outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Cell has no element assigned
    #[error("Cell (row={row}, col={col}) has no element")]
    EmptyCell { row: usize, col: usize },

    /// Voltage trigger coordinates outside its grid
    #[error("Trigger coordinates (x={col}, y={row}) are out of bounds for grid {grid} ({cols}x{rows})")]
    TriggerOutOfBounds {
        grid: GridId,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    // ============ Reference Errors ============
    /// Handle does not belong to this circuit
    #[error("Unknown element {element}")]
    UnknownElement { element: ElementId },

    /// Per-node physics requested from a one-way unit
    #[error("Element {element} is a one-way unit, not a single oscillator")]
    NotLeaf { element: ElementId },

    /// Voltage trigger references a grid that is not part of the simulation
    #[error("Trigger references missing grid {grid}")]
    MissingGrid { grid: GridId },

    // ============ Simulation Errors ============
    /// Numerical overflow detected
    #[error("Numerical overflow detected at element {element} (value: {value:.2e})")]
    NumericalOverflow { element: ElementId, value: f64 },

    // ============ I/O Errors ============
    /// Error writing simulation output
    #[error("Failed to write {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SeoError {
    /// Create a too-many-connections error
    pub fn too_many_connections(element: ElementId, legs: usize, requested: usize) -> Self {
        Self::TooManyConnections {
            element,
            legs,
            requested,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid simulation parameter error
    pub fn invalid_simulation_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with a short description of what was being written
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
