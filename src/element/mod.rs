//! Element models for the oscillator network.
//!
//! This module provides the three element variants a grid cell can hold:
//! - [`Junction`]: a single tunnel junction oscillator
//! - [`JunctionStack`]: `N` junctions in series that must all tunnel
//!   before a charge crosses
//! - [`OnewayUnit`]: four oscillators wired into a one-way conduction cell
//!
//! Junctions and stacks implement [`Oscillator`], the per-node physics
//! contract. One-way units only hold handles to their members; the
//! [`Circuit`](crate::circuit::Circuit) arena delegates to those members.

mod junction;
mod oneway;
mod stack;

pub use junction::Junction;
pub(crate) use oneway::select_candidate;
pub use oneway::{MemberKind, OnewayParams, OnewayUnit};
pub use stack::JunctionStack;

use rand::distributions::Open01;
use rand::{Rng, RngCore};

use crate::circuit::{Direction, ElementId, PerDirection};
use crate::error::{Result, SeoError};
use crate::ELEMENTARY_CHARGE;

/// Physical parameters of one oscillator node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementParams {
    /// Leakage resistance to the bias source
    pub r: f64,
    /// Tunnel resistance
    pub rj: f64,
    /// Junction capacitance
    pub cj: f64,
    /// Coupling capacitance to each neighbour
    pub c: f64,
    /// Initial bias voltage
    pub vd: f64,
    /// Maximum number of neighbours
    pub legs: usize,
}

impl ElementParams {
    pub fn new(r: f64, rj: f64, cj: f64, c: f64, vd: f64, legs: usize) -> Self {
        Self {
            r,
            rj,
            cj,
            c,
            vd,
            legs,
        }
    }

    /// Check that every parameter is physically meaningful.
    pub fn validate(&self) -> Result<()> {
        let positive = [("R", self.r), ("Rj", self.rj), ("Cj", self.cj)];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SeoError::invalid_parameter(
                    name,
                    format!("must be finite and > 0, got {value}"),
                ));
            }
        }
        if !self.c.is_finite() || self.c < 0.0 {
            return Err(SeoError::invalid_parameter(
                "C",
                format!("must be finite and >= 0, got {}", self.c),
            ));
        }
        if !self.vd.is_finite() {
            return Err(SeoError::invalid_parameter("Vd", "must be finite"));
        }
        Ok(())
    }

    /// Total capacitance seen by the node: `legs·C + Cj`.
    pub fn total_capacitance(&self) -> f64 {
        self.legs as f64 * self.c + self.cj
    }
}

/// Mutable state shared by every oscillator variant.
#[derive(Debug, Clone, Default)]
pub struct NodeState {
    /// Accumulated charge
    pub q: f64,
    /// Node voltage
    pub vn: f64,
    /// Bias voltage
    pub vd: f64,
    /// Sum of neighbour voltages from the last sweep
    pub v_sum: f64,
    /// Energy released by tunneling in each direction
    pub d_e: PerDirection<f64>,
    /// Sampled wait time per direction (0 = disabled)
    pub wt: PerDirection<f64>,
    /// Neighbour handles
    pub connections: Vec<ElementId>,
}

impl NodeState {
    fn with_bias(vd: f64) -> Self {
        Self {
            vd,
            ..Self::default()
        }
    }
}

/// Per-node physics shared by junctions and junction stacks.
pub trait Oscillator {
    fn params(&self) -> &ElementParams;
    fn node(&self) -> &NodeState;
    fn node_mut(&mut self) -> &mut NodeState;

    /// Recompute `Vn` from `Q` and `V_sum`.
    fn update_voltage(&mut self);

    /// Recompute `dE` for both directions.
    fn update_energy(&mut self);

    /// Sample wait times for every direction with `dE > 0`.
    ///
    /// Returns `true` if at least one direction is enabled.
    fn sample_wait_times(&mut self, rng: &mut dyn RngCore) -> bool;

    /// Apply one tunnel event.
    fn tunnel(&mut self, direction: Direction);

    /// Euler step of the leakage current: `Q += dt·(Vd − Vn)/R`.
    fn update_charge(&mut self, dt: f64) {
        let r = self.params().r;
        let node = self.node_mut();
        node.q += dt * (node.vd - node.vn) / r;
    }
}

/// A circuit element stored in the arena.
#[derive(Debug, Clone)]
pub enum Element {
    Junction(Junction),
    Stack(JunctionStack),
    Oneway(OnewayUnit),
}

impl Element {
    /// The oscillator physics of a leaf element, `None` for one-way units.
    pub fn oscillator(&self) -> Option<&dyn Oscillator> {
        match self {
            Element::Junction(j) => Some(j),
            Element::Stack(s) => Some(s),
            Element::Oneway(_) => None,
        }
    }

    pub fn oscillator_mut(&mut self) -> Option<&mut dyn Oscillator> {
        match self {
            Element::Junction(j) => Some(j),
            Element::Stack(s) => Some(s),
            Element::Oneway(_) => None,
        }
    }

    pub fn as_oneway(&self) -> Option<&OnewayUnit> {
        match self {
            Element::Oneway(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_oneway_mut(&mut self) -> Option<&mut OnewayUnit> {
        match self {
            Element::Oneway(unit) => Some(unit),
            _ => None,
        }
    }

    /// Short variant name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Junction(_) => "junction",
            Element::Stack(_) => "stack",
            Element::Oneway(_) => "oneway",
        }
    }
}

/// Draw one exponentially distributed wait time for a tunnel rate of
/// `dE / (e²·Rj)`.
pub(crate) fn exponential_wait(rj: f64, d_e: f64, rng: &mut dyn RngCore) -> f64 {
    // Open interval keeps ln(1/U) strictly positive and finite.
    let u: f64 = rng.sample(Open01);
    (ELEMENTARY_CHARGE * ELEMENTARY_CHARGE * rj / d_e) * (1.0 / u).ln()
}

/// Check a neighbour list against the leg count and the element's own handle.
pub(crate) fn check_connections(
    element: ElementId,
    legs: usize,
    connections: &[ElementId],
) -> Result<()> {
    if connections.len() > legs {
        return Err(SeoError::too_many_connections(
            element,
            legs,
            connections.len(),
        ));
    }
    if connections.contains(&element) {
        return Err(SeoError::SelfConnection { element });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_params_validation() {
        assert!(ElementParams::new(0.5, 0.002, 10.0, 2.0, 0.004, 4)
            .validate()
            .is_ok());
        assert!(matches!(
            ElementParams::new(0.0, 0.002, 10.0, 2.0, 0.004, 4).validate(),
            Err(SeoError::InvalidParameter { .. })
        ));
        assert!(ElementParams::new(0.5, 0.002, 10.0, -1.0, 0.004, 4)
            .validate()
            .is_err());
        assert!(ElementParams::new(0.5, 0.002, f64::NAN, 2.0, 0.004, 4)
            .validate()
            .is_err());
    }

    #[test]
    fn test_check_connections() {
        let me = ElementId(0);
        let four = [ElementId(1), ElementId(2), ElementId(3), ElementId(4)];
        assert!(check_connections(me, 4, &four).is_ok());

        let five = [ElementId(1), ElementId(2), ElementId(3), ElementId(4), ElementId(5)];
        assert!(matches!(
            check_connections(me, 4, &five),
            Err(SeoError::TooManyConnections { legs: 4, requested: 5, .. })
        ));

        assert!(matches!(
            check_connections(me, 6, &[ElementId(1), me]),
            Err(SeoError::SelfConnection { .. })
        ));
    }

    #[test]
    fn test_exponential_wait_is_positive() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let wt = exponential_wait(0.002, 1e-3, &mut rng);
            assert!(wt.is_finite() && wt > 0.0);
        }
    }

    #[test]
    fn test_exponential_wait_mean() {
        // Mean of the distribution is e²·Rj/dE.
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (rj, d_e) = (0.002, 1e-3);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| exponential_wait(rj, d_e, &mut rng)).sum::<f64>() / n as f64;
        let expected = ELEMENTARY_CHARGE * ELEMENTARY_CHARGE * rj / d_e;
        assert!((mean - expected).abs() / expected < 0.05);
    }
}
