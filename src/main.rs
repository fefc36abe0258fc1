//! seosim - SEO grid simulator demonstrations
//!
//! Runs one of the built-in scenarios and writes a voltage trace, a gnuplot
//! script for it and an optional tunnel-event log.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info seosim oneway --trigger right --trace out/oneway_vn.txt
//! gnuplot -p out/oneway_vn_gnu.txt
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use seo_grid::{
    circuit::{ElementId, Orientation},
    element::{ElementParams, MemberKind, OnewayParams},
    error::{Result, SeoError},
    output::{write_gnuplot_script, Trace},
    Circuit, Grid, Simulator, SimulatorConfig, CJ_LEG2, CJ_LEG3, CJ_LEG4,
};

const R: f64 = 0.5;
const RJ: f64 = 0.002;
const C: f64 = 2.0;

/// Single-electron oscillator grid simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    scenario: Scenario,

    /// Base time step
    #[arg(long, global = true, default_value_t = 0.1)]
    dt: f64,

    /// Simulated duration
    #[arg(long, global = true, default_value_t = 200.0)]
    end_time: f64,

    /// RNG seed (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Write the per-step voltage trace here (plus a gnuplot script)
    #[arg(long, global = true, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Write every tunnel event to this file
    #[arg(long, global = true, value_name = "FILE")]
    tunnel_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Scenario {
    /// One isolated junction charging through its bias resistor
    Single {
        /// Bias voltage
        #[arg(long, default_value_t = 0.0044)]
        vd: f64,
    },
    /// A one-way unit between two junctions, excited from one side
    Oneway {
        /// Side that receives the trigger at t = 100
        #[arg(long, value_enum, default_value_t = Side::Right)]
        trigger: Side,

        /// Member variant of the unit
        #[arg(long, default_value_t = 1)]
        stack: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Side {
    Left,
    Right,
}

/// A scenario ready to run, with the elements to trace.
struct Setup {
    circuit: Circuit,
    grids: Vec<Grid>,
    traced: Vec<(String, ElementId)>,
    trigger: Option<(f64, usize, usize, usize, f64)>,
}

fn single(vd: f64) -> Result<Setup> {
    let mut circuit = Circuit::new();
    let seo = circuit.add_junction(ElementParams::new(R, RJ, 10.0, C, vd, 4))?;
    let mut grid = Grid::new(1, 1).with_label("single");
    grid.set_element(0, 0, seo)?;
    Ok(Setup {
        circuit,
        grids: vec![grid],
        traced: vec![("seo".to_string(), seo)],
        trigger: None,
    })
}

fn oneway(side: Side, stack: u32) -> Result<Setup> {
    let vd = 0.0039;
    let mut circuit = Circuit::new();
    let kind = match stack {
        0 => return Err(SeoError::invalid_parameter("stack", "must be at least 1")),
        1 => MemberKind::Junction,
        n => MemberKind::Stack(n),
    };
    let unit = circuit.add_oneway(
        Orientation::Right,
        OnewayParams::new(R, RJ, CJ_LEG2, CJ_LEG3, C, vd),
        kind,
    )?;
    let [m0, m1, m2, m3] = circuit.members(unit)?;

    let dummy = ElementParams::new(R, RJ, CJ_LEG4, C, vd, 4);
    let left = circuit.add_junction(dummy)?;
    let right = circuit.add_junction(dummy)?;
    circuit.connect(left, &[m0])?;
    circuit.connect(right, &[m3])?;
    circuit.connect_oneway(unit, left, right)?;

    let mut unit_grid = Grid::new(3, 3).with_label("unit");
    unit_grid.set_element(1, 1, unit)?;
    let mut dummy_grid = Grid::new(3, 3).with_label("dummies");
    dummy_grid.set_element(1, 1, left)?;
    dummy_grid.set_element(1, 2, right)?;

    let col = match side {
        Side::Left => 1,
        Side::Right => 2,
    };
    Ok(Setup {
        circuit,
        grids: vec![unit_grid, dummy_grid],
        traced: vec![
            ("dummyL".to_string(), left),
            ("ow0".to_string(), m0),
            ("ow1".to_string(), m1),
            ("ow2".to_string(), m2),
            ("ow3".to_string(), m3),
            ("dummyR".to_string(), right),
        ],
        trigger: Some((100.0, 1, 1, col, 0.004)),
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let setup = match args.scenario {
        Scenario::Single { vd } => single(vd)?,
        Scenario::Oneway { trigger, stack } => oneway(trigger, stack)?,
    };

    let mut config = SimulatorConfig::new()
        .with_dt(args.dt)
        .with_end_time(args.end_time);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut sim = Simulator::with_config(setup.circuit, config)?;
    let grid_ids: Vec<_> = setup.grids.into_iter().map(|g| sim.add_grid(g)).collect();
    if let Some((time, grid, row, col, magnitude)) = setup.trigger {
        sim.add_voltage_trigger(time, grid_ids[grid], row, col, magnitude);
    }

    if let Some(path) = &args.trace {
        let (labels, ids): (Vec<String>, Vec<ElementId>) = setup.traced.into_iter().unzip();
        sim.add_trace(Trace::create(path, ids)?);
        write_gnuplot_script(path, &labels)?;
    }
    if let Some(path) = &args.tunnel_log {
        let file = File::create(path)
            .map_err(|e| SeoError::io(format!("tunnel log {}", path.display()), e))?;
        sim.set_tunnel_log(BufWriter::new(file));
    }

    sim.run()?;

    println!(
        "finished at t={:.3} with {} tunnel events",
        sim.t(),
        sim.tunnel_events().len()
    );
    Ok(())
}
