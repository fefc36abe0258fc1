//! Series stack of tunnel junctions.
//!
//! A stack of `N` junctions only moves a full charge onto the node once
//! every junction in the series has tunneled. `tunnel_num` counts the
//! signed partial progress (`+` for up, `−` for down); reaching `±N`
//! commits `∓e` to `Q` and resets the counter.
//!
//! With `k = tunnel_num`:
//!
//!   Vn = N·(Q + C·ΣVi − k·e) / (N·legs·C + Cj)
//!
//! Both formulas reduce to the single junction at `N = 1, k = 0`.

use rand::RngCore;

use crate::circuit::Direction;
use crate::error::{Result, SeoError};
use crate::ELEMENTARY_CHARGE as E;

use super::{exponential_wait, ElementParams, NodeState, Oscillator};

/// `N` tunnel junctions in series acting as one oscillator node.
#[derive(Debug, Clone)]
pub struct JunctionStack {
    params: ElementParams,
    state: NodeState,
    multi_num: u32,
    tunnel_num: i32,
}

impl JunctionStack {
    /// Create a stack of `multi_num` junctions.
    pub fn new(params: ElementParams, multi_num: u32) -> Result<Self> {
        if multi_num == 0 || multi_num > i32::MAX as u32 {
            return Err(SeoError::invalid_parameter(
                "multi_num",
                format!("must be in 1..={}, got {multi_num}", i32::MAX),
            ));
        }
        Ok(Self {
            params,
            state: NodeState::with_bias(params.vd),
            multi_num,
            tunnel_num: 0,
        })
    }

    /// Number of junctions in series.
    pub fn multi_num(&self) -> u32 {
        self.multi_num
    }

    /// Signed partial tunneling progress.
    pub fn tunnel_num(&self) -> i32 {
        self.tunnel_num
    }

    pub fn set_q(&mut self, q: f64) {
        self.state.q = q;
    }

    pub fn set_vn(&mut self, vn: f64) {
        self.state.vn = vn;
    }

    pub fn set_d_e(&mut self, direction: Direction, value: f64) {
        self.state.d_e[direction] = value;
    }

    /// Denominator shared by the voltage and energy formulas: `N·legs·C + Cj`.
    fn stack_capacitance(&self) -> f64 {
        self.multi_num as f64 * self.params.legs as f64 * self.params.c + self.params.cj
    }
}

impl Oscillator for JunctionStack {
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
        let n = self.multi_num as f64;
        let k = self.tunnel_num as f64;
        let denom = self.stack_capacitance();
        let c = self.params.c;
        let s = &mut self.state;
        s.vn = n * (s.q + c * s.v_sum - k * E) / denom;
    }

    fn update_energy(&mut self) {
        let n = self.multi_num as f64;
        let k = self.tunnel_num as f64;
        let legs = self.params.legs as f64;
        let ElementParams { c, cj, .. } = self.params;
        let denom = 2.0 * cj * self.stack_capacitance();
        let s = &mut self.state;

        let shift_up = (-(n - 1.0) * legs + 2.0 * legs * k) * c * E;
        s.d_e.up = E * (shift_up + cj * (2.0 * s.q - E) + 2.0 * c * cj * s.v_sum) / denom;

        let shift_down = ((n - 1.0) * legs + 2.0 * legs * k) * c * E;
        s.d_e.down = -E * (shift_down + cj * (2.0 * s.q + E) + 2.0 * c * cj * s.v_sum) / denom;
    }

    fn sample_wait_times(&mut self, rng: &mut dyn RngCore) -> bool {
        let rj = self.params.rj;
        // First junction among the ones still waiting to fire.
        let remaining = self.multi_num - self.tunnel_num.unsigned_abs();
        let s = &mut self.state;
        let mut enabled = false;
        for dir in Direction::ALL {
            s.wt[dir] = 0.0;
            if s.d_e[dir] > 0.0 {
                let d_e = s.d_e[dir];
                s.wt[dir] = (0..remaining)
                    .map(|_| exponential_wait(rj, d_e, rng))
                    .fold(f64::INFINITY, f64::min);
                enabled = true;
            }
        }
        enabled
    }

    fn tunnel(&mut self, direction: Direction) {
        let n = self.multi_num as i32;
        match direction {
            Direction::Up => {
                self.tunnel_num += 1;
                if self.tunnel_num.abs() == n {
                    self.state.q -= E;
                    self.tunnel_num = 0;
                }
            }
            Direction::Down => {
                self.tunnel_num -= 1;
                if self.tunnel_num.abs() == n {
                    self.state.q += E;
                    self.tunnel_num = 0;
                }
            }
        }
    }
}
