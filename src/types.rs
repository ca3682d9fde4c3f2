//! # Rover Mission Types Module
//!
//! Core data types shared by the simulation engine, the program driver and the
//! presentation layers (terminal and network).
//!
//! ## Key Components
//!
//! - **CellKind**: what occupies a grid cell
//! - **Heading**: the rover's facing direction, cyclic N → E → S → W
//! - **TurnDirection**: the two rotations a Turn action accepts
//! - **Severity**: tone of a mission log line
//! - **MissionPhase**: where the rover stands with respect to its objective
//!
//! All types are serializable so they can travel inside network frames.

use std::fmt;

use serde::{Deserialize, Serialize};

/// NOTE - Side length of the reference mission grid
pub const DEFAULT_GRID_SIZE: usize = 5;

/// NOTE - Every possible content of a grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Empty,    // NOTE - Traversable ground
    Obstacle, // NOTE - Impassable rock
    Target,   // NOTE - Cell holding the sample
}

impl CellKind {
    /// Terrain name as reported by the analyzer.
    pub fn name(self) -> &'static str {
        match self {
            CellKind::Empty => "empty",
            CellKind::Obstacle => "obstacle",
            CellKind::Target => "target",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// NOTE - Rover heading, ordered as the turn cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    const CYCLE: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    fn index(self) -> usize {
        match self {
            Heading::North => 0,
            Heading::East => 1,
            Heading::South => 2,
            Heading::West => 3,
        }
    }

    /// Heading after a quarter turn in `direction`.
    pub fn turned(self, direction: TurnDirection) -> Heading {
        let idx = match direction {
            TurnDirection::Left => (self.index() + 3) % 4,
            TurnDirection::Right => (self.index() + 1) % 4,
        };
        Self::CYCLE[idx]
    }

    /// Unit step `(dx, dy)` for this heading. North points to decreasing `y`.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }

    /// Single-letter code used in the mission log.
    pub fn letter(self) -> char {
        match self {
            Heading::North => 'N',
            Heading::East => 'E',
            Heading::South => 'S',
            Heading::West => 'W',
        }
    }
}

/// NOTE - Rotation requested by a Turn action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnDirection::Left => f.write_str("LEFT"),
            TurnDirection::Right => f.write_str("RIGHT"),
        }
    }
}

/// NOTE - Tone of a mission log line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Info => "➡",
            Severity::Success => "✅",
            Severity::Error => "❌",
        }
    }
}

/// NOTE - Mission progress, driven only by Drill and Transmit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPhase {
    Exploring,       // NOTE - No sample on board yet
    HoldingSample,   // NOTE - Drilled at the target, awaiting uplink
    MissionComplete, // NOTE - Transmitted with a sample
    MissionFailed,   // NOTE - Transmitted without a sample
}

impl MissionPhase {
    /// True once a Transmit has concluded the mission.
    pub fn is_concluded(self) -> bool {
        matches!(self, MissionPhase::MissionComplete | MissionPhase::MissionFailed)
    }

    pub fn label(self) -> &'static str {
        match self {
            MissionPhase::Exploring => "Exploring",
            MissionPhase::HoldingSample => "Holding sample",
            MissionPhase::MissionComplete => "Mission complete",
            MissionPhase::MissionFailed => "Mission failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_then_right_restores_every_heading() {
        for heading in Heading::CYCLE {
            assert_eq!(heading.turned(TurnDirection::Left).turned(TurnDirection::Right), heading);
            assert_eq!(heading.turned(TurnDirection::Right).turned(TurnDirection::Left), heading);
        }
    }

    #[test]
    fn four_right_turns_are_a_full_circle() {
        let mut heading = Heading::East;
        let mut seen = Vec::new();
        for _ in 0..4 {
            heading = heading.turned(TurnDirection::Right);
            seen.push(heading);
        }
        assert_eq!(seen, vec![Heading::South, Heading::West, Heading::North, Heading::East]);
    }

    #[test]
    fn left_from_north_wraps_to_west() {
        assert_eq!(Heading::North.turned(TurnDirection::Left), Heading::West);
    }
}
