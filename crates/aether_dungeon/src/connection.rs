//! Edge signatures of dungeon modules and the rules deciding whether two
//! modules may sit next to each other.
//!
//! A [`Connection`] holds one [`ConnectionState`] per horizontal edge. Catalog
//! module types only use `Open` and `Closed`; `DontCare` appears in the
//! constraints the layout builder derives for an empty grid cell, where it
//! marks edges without a neighbour.

use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single module edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Open,
    Closed,
    DontCare,
}

impl ConnectionState {
    /// Two edge states are compatible unless one is open and the other closed.
    pub fn is_compatible(self, other: ConnectionState) -> bool {
        !matches!(
            (self, other),
            (ConnectionState::Open, ConnectionState::Closed)
                | (ConnectionState::Closed, ConnectionState::Open)
        )
    }

    fn symbol(self) -> char {
        match self {
            ConnectionState::Open => 'o',
            ConnectionState::Closed => 'x',
            ConnectionState::DontCare => '*',
        }
    }
}

/// Per-edge connection signature `(east, west, south, north)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub east: ConnectionState,
    pub west: ConnectionState,
    pub south: ConnectionState,
    pub north: ConnectionState,
}

impl Connection {
    /// Connection with the given east, west, south and north states.
    pub fn new(
        east: ConnectionState,
        west: ConnectionState,
        south: ConnectionState,
        north: ConnectionState,
    ) -> Self {
        Self { east, west, south, north }
    }

    /// A connection with every edge in the same state.
    pub fn uniform(state: ConnectionState) -> Self {
        Self::new(state, state, state, state)
    }

    /// A fully resolved connection that is open exactly on `open` and closed elsewhere.
    pub fn open_on(open: &[Direction]) -> Self {
        let mut connection = Self::uniform(ConnectionState::Closed);
        for direction in open {
            connection.set_state(*direction, ConnectionState::Open);
        }
        connection
    }

    /// State of the edge facing `direction`.
    pub fn state(&self, direction: Direction) -> ConnectionState {
        match direction {
            Direction::East => self.east,
            Direction::West => self.west,
            Direction::South => self.south,
            Direction::North => self.north,
        }
    }

    /// Replaces the state of one edge.
    pub fn set_state(&mut self, direction: Direction, state: ConnectionState) {
        match direction {
            Direction::East => self.east = state,
            Direction::West => self.west = state,
            Direction::South => self.south = state,
            Direction::North => self.north = state,
        }
    }

    /// Returns true if every edge of `self` is compatible with the same edge of `other`.
    ///
    /// Edge compatibility is symmetric, so `a.is_valid(&b) == b.is_valid(&a)`.
    pub fn is_valid(&self, other: &Connection) -> bool {
        Direction::ALL
            .iter()
            .all(|direction| self.state(*direction).is_compatible(other.state(*direction)))
    }

    /// Returns a copy with every `DontCare` edge turned into `Closed`.
    pub fn set_dont_care_to_closed(&self) -> Connection {
        let close = |state: ConnectionState| match state {
            ConnectionState::DontCare => ConnectionState::Closed,
            other => other,
        };
        Connection::new(close(self.east), close(self.west), close(self.south), close(self.north))
    }

    /// Directions whose edge is open, in priority order.
    pub fn connect_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.state(*direction) == ConnectionState::Open)
    }

    /// True when no edge is `DontCare`.
    pub fn is_resolved(&self) -> bool {
        Direction::ALL
            .iter()
            .all(|direction| self.state(*direction) != ConnectionState::DontCare)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, direction) in Direction::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", direction.letter(), self.state(*direction).symbol())?;
        }
        Ok(())
    }
}
