//! One-way conduction unit built from four oscillators.
//!
//! ```text
//!            ┌── m1 ──┐
//!   left ── m0        m3 ── right
//!            └── m2 ──┘
//! ```
//!
//! Members 0 and 3 have three legs (one external neighbour plus m1, m2),
//! members 1 and 2 have two (m0, m3). The boundary members are biased at
//! `−Vd`, the inner ones at `+Vd`, and the downstream boundary member gets
//! an extra `C·e / ((3C + Cj3)(2C + Cj2))` offset. That asymmetry lets a
//! charge wave pass in the conduction direction only.

use crate::circuit::{ElementId, Orientation, PerDirection, TunnelCandidate};
use crate::error::{Result, SeoError};
use crate::ELEMENTARY_CHARGE as E;

use super::ElementParams;

/// Which oscillator variant fills the four member slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberKind {
    #[default]
    Junction,
    /// Series stacks of the given junction count
    Stack(u32),
}

/// Shared parameters for the members of a one-way unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnewayParams {
    pub r: f64,
    pub rj: f64,
    /// Junction capacitance of the two-leg inner members
    pub cj_leg2: f64,
    /// Junction capacitance of the three-leg boundary members
    pub cj_leg3: f64,
    pub c: f64,
    pub vd: f64,
}

impl OnewayParams {
    pub fn new(r: f64, rj: f64, cj_leg2: f64, cj_leg3: f64, c: f64, vd: f64) -> Self {
        Self {
            r,
            rj,
            cj_leg2,
            cj_leg3,
            c,
            vd,
        }
    }

    /// Bias of the downstream boundary member.
    pub fn gate_bias(&self) -> f64 {
        -self.vd + (self.c * E) / ((3.0 * self.c + self.cj_leg3) * (2.0 * self.c + self.cj_leg2))
    }

    /// Parameters for members 0..=3 in the given orientation.
    pub fn member_params(&self, orientation: Orientation) -> [ElementParams; 4] {
        let boundary = ElementParams::new(self.r, self.rj, self.cj_leg3, self.c, -self.vd, 3);
        let inner = ElementParams::new(self.r, self.rj, self.cj_leg2, self.c, self.vd, 2);
        let mut members = [boundary, inner, inner, boundary];
        let gate = match orientation {
            Orientation::Right => 3,
            Orientation::Left => 0,
        };
        members[gate].vd = self.gate_bias();
        members
    }
}

/// A directional composite of four member oscillators.
#[derive(Debug, Clone)]
pub struct OnewayUnit {
    members: [ElementId; 4],
    orientation: Orientation,
    /// Member and direction holding the smallest positive wait time
    locate: Option<TunnelCandidate>,
}

impl OnewayUnit {
    pub(crate) fn new(members: [ElementId; 4], orientation: Orientation) -> Self {
        Self {
            members,
            orientation,
            locate: None,
        }
    }

    pub fn members(&self) -> [ElementId; 4] {
        self.members
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Member chosen by the last wait-time sampling, if any was enabled.
    pub fn locate(&self) -> Option<TunnelCandidate> {
        self.locate
    }

    pub(crate) fn set_locate(&mut self, locate: Option<TunnelCandidate>) {
        self.locate = locate;
    }

    /// Neighbour lists for each member given the external endpoints.
    pub fn member_connections(&self, left: ElementId, right: ElementId) -> [Vec<ElementId>; 4] {
        let [m0, m1, m2, m3] = self.members;
        [
            vec![left, m1, m2],
            vec![m0, m3],
            vec![m0, m3],
            vec![right, m1, m2],
        ]
    }

    /// Reject endpoints that are one of this unit's own members.
    pub(crate) fn check_endpoints(&self, unit: ElementId, left: ElementId, right: ElementId) -> Result<()> {
        for endpoint in [left, right] {
            if endpoint == unit || self.members.contains(&endpoint) {
                return Err(SeoError::SelfConnection { element: endpoint });
            }
        }
        Ok(())
    }
}

/// Pick the member/direction with the globally smallest positive wait time.
pub(crate) fn select_candidate(
    member_waits: impl IntoIterator<Item = (ElementId, PerDirection<f64>)>,
) -> Option<TunnelCandidate> {
    let mut best: Option<TunnelCandidate> = None;
    for (element, wt) in member_waits {
        for (direction, wait_time) in wt.iter() {
            if wait_time <= 0.0 {
                continue;
            }
            if best.map_or(true, |b| wait_time < b.wait_time) {
                best = Some(TunnelCandidate {
                    element,
                    direction,
                    wait_time,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Direction;
    use crate::{CJ_LEG2, CJ_LEG3};
    use approx::assert_relative_eq;

    fn params() -> OnewayParams {
        OnewayParams::new(0.5, 0.002, CJ_LEG2, CJ_LEG3, 2.0, 0.0039)
    }

    #[test]
    fn test_member_params_right() {
        let p = params();
        let m = p.member_params(Orientation::Right);
        assert_eq!(m[0].legs, 3);
        assert_eq!(m[1].legs, 2);
        assert_eq!(m[2].legs, 2);
        assert_eq!(m[3].legs, 3);
        assert_relative_eq!(m[0].vd, -0.0039);
        assert_relative_eq!(m[1].vd, 0.0039);
        assert_relative_eq!(m[0].cj, CJ_LEG3);
        assert_relative_eq!(m[1].cj, CJ_LEG2);
        let offset = 2.0 * E / ((6.0 + CJ_LEG3) * (4.0 + CJ_LEG2));
        assert_relative_eq!(m[3].vd, -0.0039 + offset, epsilon = 1e-15);
    }

    #[test]
    fn test_member_params_left_moves_gate() {
        let p = params();
        let m = p.member_params(Orientation::Left);
        assert_relative_eq!(m[0].vd, p.gate_bias());
        assert_relative_eq!(m[3].vd, -0.0039);
    }

    #[test]
    fn test_member_connections_topology() {
        let unit = OnewayUnit::new(
            [ElementId(1), ElementId(2), ElementId(3), ElementId(4)],
            Orientation::Right,
        );
        let conns = unit.member_connections(ElementId(10), ElementId(11));
        assert_eq!(conns[0], vec![ElementId(10), ElementId(2), ElementId(3)]);
        assert_eq!(conns[1], vec![ElementId(1), ElementId(4)]);
        assert_eq!(conns[2], vec![ElementId(1), ElementId(4)]);
        assert_eq!(conns[3], vec![ElementId(11), ElementId(2), ElementId(3)]);
    }

    #[test]
    fn test_endpoints_cannot_be_members() {
        let unit = OnewayUnit::new(
            [ElementId(1), ElementId(2), ElementId(3), ElementId(4)],
            Orientation::Right,
        );
        assert!(unit.check_endpoints(ElementId(5), ElementId(0), ElementId(6)).is_ok());
        assert!(unit.check_endpoints(ElementId(5), ElementId(2), ElementId(6)).is_err());
        assert!(unit.check_endpoints(ElementId(5), ElementId(0), ElementId(5)).is_err());
    }

    #[test]
    fn test_select_candidate_ignores_disabled() {
        let waits = vec![
            (ElementId(1), PerDirection { up: 0.0, down: 0.0 }),
            (ElementId(2), PerDirection { up: 0.0, down: 0.7 }),
            (ElementId(3), PerDirection { up: 0.3, down: 0.0 }),
            (ElementId(4), PerDirection { up: 0.0, down: 0.0 }),
        ];
        let best = select_candidate(waits).unwrap();
        assert_eq!(best.element, ElementId(3));
        assert_eq!(best.direction, Direction::Up);
        assert_relative_eq!(best.wait_time, 0.3);
    }

    #[test]
    fn test_select_candidate_none_enabled() {
        let waits = vec![(ElementId(1), PerDirection::splat(0.0)); 4];
        assert!(select_candidate(waits).is_none());
    }
}
