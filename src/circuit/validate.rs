//! Circuit validation.

use crate::element::Element;
use crate::error::{Result, SeoError};

use super::{Circuit, Grid};

/// Validate a circuit and its grids before simulation.
///
/// Checks:
/// - Every grid cell references an element of the circuit
/// - Every neighbour handle references an element of the circuit
///
/// One-way units whose members have no external neighbours are accepted
/// but logged, since they cannot exchange charge with the rest of the
/// network.
pub fn validate_circuit(circuit: &Circuit, grids: &[Grid]) -> Result<()> {
    for grid in grids {
        for (_, _, id) in grid.cells() {
            if !circuit.contains(id) {
                return Err(SeoError::UnknownElement { element: id });
            }
        }
    }

    for (id, element) in circuit.iter() {
        match element {
            Element::Oneway(unit) => {
                let [m0, _, _, m3] = unit.members();
                if circuit.connections(m0)?.is_empty() && circuit.connections(m3)?.is_empty() {
                    log::warn!("one-way unit {id} has no external connections");
                }
            }
            _ => {
                for &neighbor in circuit.connections(id)? {
                    if !circuit.contains(neighbor) {
                        return Err(SeoError::UnknownElement { element: neighbor });
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{ElementId, Orientation};
    use crate::element::{ElementParams, MemberKind, OnewayParams};
    use crate::{CJ_LEG2, CJ_LEG3, CJ_LEG4};

    #[test]
    fn test_valid_circuit() {
        let mut circuit = Circuit::new();
        let a = circuit
            .add_junction(ElementParams::new(0.5, 0.002, CJ_LEG4, 2.0, 0.004, 4))
            .unwrap();
        let b = circuit
            .add_junction(ElementParams::new(0.5, 0.002, CJ_LEG4, 2.0, 0.004, 4))
            .unwrap();
        circuit.connect(a, &[b]).unwrap();
        circuit.connect(b, &[a]).unwrap();
        let mut grid = Grid::new(1, 2);
        grid.set_element(0, 0, a).unwrap();
        grid.set_element(0, 1, b).unwrap();
        assert!(validate_circuit(&circuit, &[grid]).is_ok());
    }

    #[test]
    fn test_grid_with_foreign_handle() {
        let circuit = Circuit::new();
        let mut grid = Grid::new(1, 1);
        grid.set_element(0, 0, ElementId(3)).unwrap();
        assert!(matches!(
            validate_circuit(&circuit, &[grid]),
            Err(SeoError::UnknownElement { element: ElementId(3) })
        ));
    }

    #[test]
    fn test_unwired_oneway_is_accepted() {
        let mut circuit = Circuit::new();
        circuit
            .add_oneway(
                Orientation::Left,
                OnewayParams::new(0.5, 0.002, CJ_LEG2, CJ_LEG3, 2.0, 0.0039),
                MemberKind::Junction,
            )
            .unwrap();
        assert!(validate_circuit(&circuit, &[]).is_ok());
    }
}
