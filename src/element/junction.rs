//! Single tunnel junction oscillator.
//!
//! The node is coupled to `legs` neighbours through capacitance `C` and
//! to the reservoir through a junction of capacitance `Cj` and tunnel
//! resistance `Rj`. With total capacitance `CΣ = legs·C + Cj`:
//!
//!   Vn = (Q + C·ΣVi) / CΣ
//!   dE_up   = −e·(e − 2(Q + C·ΣVi)) / 2CΣ
//!   dE_down = −e·(e + 2(Q + C·ΣVi)) / 2CΣ

use rand::RngCore;

use crate::circuit::Direction;
use crate::ELEMENTARY_CHARGE as E;

use super::{exponential_wait, ElementParams, NodeState, Oscillator};

/// A single tunnel junction oscillator.
#[derive(Debug, Clone)]
pub struct Junction {
    params: ElementParams,
    state: NodeState,
}

impl Junction {
    /// Create a new junction. The bias starts at `params.vd`.
    pub fn new(params: ElementParams) -> Self {
        Self {
            params,
            state: NodeState::with_bias(params.vd),
        }
    }

    /// Overwrite the charge (test and initialisation helper).
    pub fn set_q(&mut self, q: f64) {
        self.state.q = q;
    }

    /// Overwrite the node voltage (test helper).
    pub fn set_vn(&mut self, vn: f64) {
        self.state.vn = vn;
    }

    /// Overwrite one energy value (test helper).
    pub fn set_d_e(&mut self, direction: Direction, value: f64) {
        self.state.d_e[direction] = value;
    }
}

impl Oscillator for Junction {
    fn params(&self) -> &ElementParams {
        &self.params
    }

    fn node(&self) -> &NodeState {
        &self.state
    }

    fn node_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn update_voltage(&mut self) {
        let ElementParams { cj, c, legs, .. } = self.params;
        let legs = legs as f64;
        let s = &mut self.state;
        s.vn = s.q / cj + (c / (cj * (legs * c + cj))) * (cj * s.v_sum - legs * s.q);
    }

    fn update_energy(&mut self) {
        let c_total = self.params.total_capacitance();
        let s = &mut self.state;
        let induced = s.q + self.params.c * s.v_sum;
        s.d_e.up = -E * (E - 2.0 * induced) / (2.0 * c_total);
        s.d_e.down = -E * (E + 2.0 * induced) / (2.0 * c_total);
    }

    fn sample_wait_times(&mut self, rng: &mut dyn RngCore) -> bool {
        let rj = self.params.rj;
        let s = &mut self.state;
        let mut enabled = false;
        for dir in Direction::ALL {
            s.wt[dir] = 0.0;
            if s.d_e[dir] > 0.0 {
                s.wt[dir] = exponential_wait(rj, s.d_e[dir], rng);
                enabled = true;
            }
        }
        enabled
    }

    fn tunnel(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.state.q -= E,
            Direction::Down => self.state.q += E,
        }
    }
}
