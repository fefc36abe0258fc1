//! End-to-end simulation runs.

use approx::assert_relative_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use seo_grid::circuit::{Direction, ElementId, Orientation};
use seo_grid::element::{ElementParams, Junction, JunctionStack, MemberKind, OnewayParams, Oscillator};
use seo_grid::output::TunnelEvent;
use seo_grid::{Circuit, Grid, Simulator, SimulatorConfig, CJ_LEG2, CJ_LEG3, CJ_LEG4, MULTI_CJ};

/// Run an isolated element for 2000 steps of dt = 0.1 and return its charge history.
fn charge_history(legs: usize, vd: f64) -> (Vec<f64>, usize) {
    let mut circuit = Circuit::new();
    let seo = circuit
        .add_junction(ElementParams::new(0.5, 0.002, 10.0, 2.0, vd, legs))
        .unwrap();
    let mut grid = Grid::new(1, 1);
    grid.set_element(0, 0, seo).unwrap();

    let config = SimulatorConfig::new()
        .with_dt(0.1)
        .with_end_time(1e9)
        .with_seed(17);
    let mut sim = Simulator::with_config(circuit, config).unwrap();
    sim.add_grid(grid);

    let mut history = Vec::with_capacity(2000);
    for _ in 0..2000 {
        let outcome = sim.run_step().unwrap();
        assert_eq!(outcome.step, 0.1);
        history.push(sim.circuit().q(seo).unwrap());
    }
    (history, sim.tunnel_events().len())
}

#[test]
fn isolated_element_charges_monotonically() {
    // Q settles where Vn = Vd, i.e. Q = Vd·(legs·C + Cj) = 0.0044·18,
    // just below the e/2 tunnel threshold.
    let (history, events) = charge_history(4, 0.0044);
    assert_eq!(events, 0);
    assert!(history.windows(2).all(|w| w[1] >= w[0]));
    assert_relative_eq!(*history.last().unwrap(), 0.0044 * 18.0, epsilon = 1e-6);
}

#[test]
fn isolated_element_without_legs_charges_to_vd_cj() {
    let (history, events) = charge_history(0, 0.0044);
    assert_eq!(events, 0);
    assert!(history.windows(2).all(|w| w[1] >= w[0]));
    assert_relative_eq!(*history.last().unwrap(), 0.0044 * 10.0, epsilon = 1e-6);
}

/// Elements of the one-way scenario, in conduction order.
struct OnewayRun {
    left: ElementId,
    members: [ElementId; 4],
    right: ElementId,
    events: Vec<TunnelEvent>,
}

/// A right-conducting unit between two biased dummies, excited at t = 100
/// on the dummy in column `trigger_col` (1 = left, 2 = right).
fn run_oneway(seed: u64, trigger_col: usize) -> OnewayRun {
    let vd = 0.0039;
    let mut circuit = Circuit::new();
    let unit = circuit
        .add_oneway(
            Orientation::Right,
            OnewayParams::new(0.5, 0.002, CJ_LEG2, CJ_LEG3, 2.0, vd),
            MemberKind::Junction,
        )
        .unwrap();
    let members = circuit.members(unit).unwrap();
    let dummy = ElementParams::new(0.5, 0.002, CJ_LEG4, 2.0, vd, 4);
    let left = circuit.add_junction(dummy).unwrap();
    let right = circuit.add_junction(dummy).unwrap();
    circuit.connect(left, &[members[0]]).unwrap();
    circuit.connect(right, &[members[3]]).unwrap();
    circuit.connect_oneway(unit, left, right).unwrap();

    let mut unit_grid = Grid::new(3, 3).with_label("unit");
    unit_grid.set_element(1, 1, unit).unwrap();
    let mut dummy_grid = Grid::new(3, 3).with_label("dummies");
    dummy_grid.set_element(1, 1, left).unwrap();
    dummy_grid.set_element(1, 2, right).unwrap();

    let config = SimulatorConfig::new()
        .with_dt(0.1)
        .with_end_time(130.0)
        .with_seed(seed);
    let mut sim = Simulator::with_config(circuit, config).unwrap();
    sim.add_grid(unit_grid);
    let dummies = sim.add_grid(dummy_grid);
    sim.add_voltage_trigger(100.0, dummies, 1, trigger_col, 0.01);
    sim.run().unwrap();
    assert!(sim.t() >= 130.0);

    // The unit snapshots its single interior cell, i.e. member 0.
    let frames = sim.snapshots().frames("unit").unwrap();
    assert_eq!(frames[0], vec![vec![0.0]]);

    OnewayRun {
        left,
        members,
        right,
        events: sim.tunnel_events().to_vec(),
    }
}

fn position(run: &OnewayRun, element: ElementId, direction: Direction) -> Option<usize> {
    run.events
        .iter()
        .position(|e| e.element == element && e.direction == direction)
}

#[test]
fn oneway_unit_passes_excitation_downstream() {
    let runs: Vec<OnewayRun> = (0..16).map(|seed| run_oneway(seed, 1)).collect();

    let mut reached_output = 0;
    for run in &runs {
        // Nothing tunnels before the trigger at t = 100.
        assert!(run.events.iter().all(|e| e.t >= 100.0));
        if let Some(first) = run.events.first() {
            assert_eq!((first.element, first.direction), (run.left, Direction::Up));
        }
        if let Some(out) = position(run, run.members[3], Direction::Down) {
            let entry = position(run, run.members[0], Direction::Down);
            assert!(matches!(entry, Some(entry) if entry < out));
            reached_output += 1;
        }
    }
    assert!(reached_output > 0);
}

#[test]
fn oneway_unit_blocks_excitation_upstream() {
    let mut right_fired = 0;
    for seed in 0..16 {
        let run = run_oneway(seed, 2);
        for event in &run.events {
            assert_eq!(event.element, run.right, "unexpected event {event}");
        }
        if !run.events.is_empty() {
            right_fired += 1;
        }
    }
    assert!(right_fired > 0);
}

#[test]
fn stack_tunnels_in_steps() {
    let mut stack = JunctionStack::new(ElementParams::new(0.5, 0.002, MULTI_CJ, 2.0, 0.0, 4), 3).unwrap();
    stack.set_q(0.3);
    let q0 = stack.node().q;
    stack.tunnel(Direction::Up);
    stack.tunnel(Direction::Up);
    assert_eq!(stack.node().q, q0);
    assert_eq!(stack.tunnel_num(), 2);
    stack.tunnel(Direction::Up);
    assert_relative_eq!(stack.node().q, q0 - seo_grid::ELEMENTARY_CHARGE);
    assert_eq!(stack.tunnel_num(), 0);
}

proptest! {
    #[test]
    fn junction_wait_time_enabled_iff_energy_positive(
        q in -0.5f64..0.5,
        v_sum in -0.05f64..0.05,
        seed in any::<u64>(),
    ) {
        let mut j = Junction::new(ElementParams::new(0.5, 0.002, CJ_LEG4, 2.0, 0.004, 4));
        j.set_q(q);
        j.node_mut().v_sum = v_sum;
        j.update_energy();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let enabled = j.sample_wait_times(&mut rng);

        let node = j.node();
        for dir in Direction::ALL {
            prop_assert_eq!(node.wt[dir] > 0.0, node.d_e[dir] > 0.0);
        }
        prop_assert_eq!(enabled, node.wt.up > 0.0 || node.wt.down > 0.0);
    }

    #[test]
    fn stack_wait_time_enabled_iff_energy_positive(
        q in -0.5f64..0.5,
        v_sum in -0.05f64..0.05,
        n in 1u32..6,
        ups in 0u32..5,
        seed in any::<u64>(),
    ) {
        let params = ElementParams::new(0.5, 0.002, MULTI_CJ, 2.0, 0.004, 4);
        let mut stack = JunctionStack::new(params, n).unwrap();
        for _ in 0..ups {
            stack.tunnel(Direction::Up);
        }
        stack.set_q(q);
        stack.node_mut().v_sum = v_sum;
        stack.update_energy();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        stack.sample_wait_times(&mut rng);

        let node = stack.node();
        for dir in Direction::ALL {
            prop_assert_eq!(node.wt[dir] > 0.0, node.d_e[dir] > 0.0);
        }
    }

    #[test]
    fn junction_up_then_down_restores_charge(q in -1.0f64..1.0) {
        let mut j = Junction::new(ElementParams::new(0.5, 0.002, CJ_LEG4, 2.0, 0.004, 4));
        j.set_q(q);
        j.tunnel(Direction::Up);
        j.tunnel(Direction::Down);
        prop_assert!((j.node().q - q).abs() < 1e-12);
    }
}
