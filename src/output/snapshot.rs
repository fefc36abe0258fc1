use std::collections::BTreeMap;

use crate::circuit::{Circuit, Grid};
use crate::error::Result;

/// Interior node voltages of one grid at one output time, `[row][col]`.
pub type Frame = Vec<Vec<f64>>;

/// Periodic voltage snapshots keyed by grid label.
///
/// A snapshot covers the interior cells `1..rows-1 × 1..cols-1` of every
/// output-enabled grid. Voltages of cells biased below zero are stored
/// with their sign flipped so that excitations of both polarities show
/// up the same way. Empty cells are recorded as NaN.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    interval: f64,
    next_output_time: f64,
    frames: BTreeMap<String, Vec<Frame>>,
}

impl SnapshotStore {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            next_output_time: 0.0,
            frames: BTreeMap::new(),
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn next_output_time(&self) -> f64 {
        self.next_output_time
    }

    /// Record a frame for every enabled grid if an output time is due.
    ///
    /// Returns `true` if a frame was recorded. At most one frame is taken
    /// per call, so long event-driven steps leave gaps in the frame index.
    pub fn capture_due(&mut self, t: f64, circuit: &Circuit, grids: &[Grid]) -> Result<bool> {
        if t < self.next_output_time {
            return Ok(false);
        }
        let index = (self.next_output_time / self.interval).round() as usize;

        let mut unlabeled = 0;
        for grid in grids.iter().filter(|g| g.is_output_enabled()) {
            let label = match grid.output_label() {
                Some(label) => label.to_string(),
                None => {
                    let label = format!("output{unlabeled}");
                    unlabeled += 1;
                    label
                }
            };
            let frame = interior_frame(circuit, grid)?;
            let frames = self.frames.entry(label).or_default();
            if frames.len() <= index {
                frames.resize(index + 1, Frame::new());
            }
            frames[index] = frame;
        }

        self.next_output_time += self.interval;
        Ok(true)
    }

    /// Labels with at least one frame, in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.frames.keys().map(String::as_str)
    }

    /// All frames of a label; skipped indices hold empty frames.
    pub fn frames(&self, label: &str) -> Option<&[Frame]> {
        self.frames.get(label).map(Vec::as_slice)
    }

    pub fn frame(&self, label: &str, index: usize) -> Option<&Frame> {
        self.frames.get(label)?.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn interior_frame(circuit: &Circuit, grid: &Grid) -> Result<Frame> {
    let (rows, cols) = (grid.rows(), grid.cols());
    if rows < 3 || cols < 3 {
        log::warn!("grid of {rows}x{cols} has no interior cells to snapshot");
        return Ok(Frame::new());
    }
    let mut frame = Vec::with_capacity(rows - 2);
    for row in 1..rows - 1 {
        let mut line = Vec::with_capacity(cols - 2);
        for col in 1..cols - 1 {
            let value = match grid.get(row, col) {
                Some(id) => {
                    let vn = circuit.vn(id)?;
                    if circuit.vd(id)? < 0.0 {
                        -vn
                    } else {
                        vn
                    }
                }
                None => f64::NAN,
            };
            line.push(value);
        }
        frame.push(line);
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementParams;
    use crate::CJ_LEG4;

    fn grid_3x3(circuit: &mut Circuit, vd: f64, vn: f64) -> Grid {
        let mut grid = Grid::new(3, 3);
        for row in 0..3 {
            for col in 0..3 {
                let id = circuit
                    .add_junction(ElementParams::new(0.5, 0.002, CJ_LEG4, 2.0, vd, 4))
                    .unwrap();
                circuit.oscillator_mut(id).unwrap().node_mut().vn = vn;
                grid.set_element(row, col, id).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_capture_interior_with_sign_flip() {
        let mut circuit = Circuit::new();
        let positive = grid_3x3(&mut circuit, 0.004, 0.002).with_label("pos");
        let negative = grid_3x3(&mut circuit, -0.004, 0.002).with_label("neg");
        let mut store = SnapshotStore::new(0.1);

        assert!(store
            .capture_due(0.0, &circuit, &[positive, negative])
            .unwrap());
        assert_eq!(store.frame("pos", 0).unwrap(), &vec![vec![0.002]]);
        assert_eq!(store.frame("neg", 0).unwrap(), &vec![vec![-0.002]]);
        assert_eq!(store.labels().collect::<Vec<_>>(), vec!["neg", "pos"]);
    }

    #[test]
    fn test_capture_only_when_due() {
        let mut circuit = Circuit::new();
        let grids = [grid_3x3(&mut circuit, 0.004, 0.0)];
        let mut store = SnapshotStore::new(1.0);
        assert!(store.capture_due(0.0, &circuit, &grids).unwrap());
        assert!(!store.capture_due(0.5, &circuit, &grids).unwrap());
        assert!(store.capture_due(1.2, &circuit, &grids).unwrap());
        assert_eq!(store.frames("output0").unwrap().len(), 2);
        assert_eq!(store.next_output_time(), 2.0);
    }

    #[test]
    fn test_unlabeled_and_disabled_grids() {
        let mut circuit = Circuit::new();
        let grids = [
            grid_3x3(&mut circuit, 0.004, 0.0),
            grid_3x3(&mut circuit, 0.004, 0.0).with_output_enabled(false),
            grid_3x3(&mut circuit, 0.004, 0.0).with_label("named"),
            grid_3x3(&mut circuit, 0.004, 0.0),
        ];
        let mut store = SnapshotStore::new(0.1);
        store.capture_due(0.0, &circuit, &grids).unwrap();
        assert_eq!(
            store.labels().collect::<Vec<_>>(),
            vec!["named", "output0", "output1"]
        );
    }

    #[test]
    fn test_empty_cells_are_nan() {
        let circuit = Circuit::new();
        let grids = [Grid::new(3, 4).with_label("empty")];
        let mut store = SnapshotStore::new(0.1);
        store.capture_due(0.0, &circuit, &grids).unwrap();
        let frame = store.frame("empty", 0).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].len(), 2);
        assert!(frame[0].iter().all(|v| v.is_nan()));
    }
}
