//! Core types for circuit representation.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::SeoError;

/// Handle of an element stored in a [`Circuit`](super::Circuit).
///
/// Handles stay valid for the lifetime of the circuit; grids and
/// neighbour lists hold these instead of references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Handle of a grid registered with a [`Simulator`](crate::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(pub usize);

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// Direction of a single-charge tunneling event.
///
/// `Up` removes one elementary charge from the node, `Down` adds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Both directions, in evaluation order.
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(SeoError::InvalidDirection {
                value: other.to_string(),
            }),
        }
    }
}

/// A pair of values keyed by [`Direction`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerDirection<T> {
    pub up: T,
    pub down: T,
}

impl<T: Copy> PerDirection<T> {
    pub fn splat(value: T) -> Self {
        Self {
            up: value,
            down: value,
        }
    }

    /// Iterate `(direction, value)` pairs, up first.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, T)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self[d]))
    }
}

impl<T> Index<Direction> for PerDirection<T> {
    type Output = T;

    fn index(&self, dir: Direction) -> &T {
        match dir {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

impl<T> IndexMut<Direction> for PerDirection<T> {
    fn index_mut(&mut self, dir: Direction) -> &mut T {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }
}

/// Conduction direction of a one-way unit.
///
/// `Right` conducts from member 0 towards member 3, `Left` the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    Left,
    #[default]
    Right,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Left => f.write_str("left"),
            Orientation::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Orientation {
    type Err = SeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Orientation::Left),
            "right" => Ok(Orientation::Right),
            other => Err(SeoError::InvalidOrientation {
                value: other.to_string(),
            }),
        }
    }
}

/// The element and direction chosen for the next tunnel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelCandidate {
    /// Concrete junction or stack that will tunnel (never a one-way unit)
    pub element: ElementId,
    pub direction: Direction,
    pub wait_time: f64,
}
