use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::types::{Heading, MissionPhase};

/// Mutable rover state. Only the engine's action handlers write to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoverState {
    pub position: Position,
    pub heading: Heading,
    pub sample_collected: bool,
    /// revealed[y][x], set when the analyzer finds the target. Display only.
    pub revealed: Vec<Vec<bool>>,
    pub phase: MissionPhase,
}

impl RoverState {
    pub fn new(position: Position, heading: Heading, width: usize, height: usize) -> Self {
        Self {
            position,
            heading,
            sample_collected: false,
            revealed: vec![vec![false; width]; height],
            phase: MissionPhase::Exploring,
        }
    }

    pub fn is_revealed(&self, pos: Position) -> bool {
        self.revealed
            .get(pos.y)
            .and_then(|row| row.get(pos.x))
            .copied()
            .unwrap_or(false)
    }

    pub fn reveal(&mut self, pos: Position) {
        if let Some(cell) = self.revealed.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
            *cell = true;
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().flatten().filter(|r| **r).count()
    }

    /// Records a successful drill. A completed mission keeps its phase;
    /// any other phase now holds the sample.
    pub fn collect_sample(&mut self) {
        self.sample_collected = true;
        if self.phase != MissionPhase::MissionComplete {
            self.phase = MissionPhase::HoldingSample;
        }
    }

    /// Concludes the mission according to the payload on board.
    pub fn conclude(&mut self) -> MissionPhase {
        self.phase = if self.sample_collected {
            MissionPhase::MissionComplete
        } else {
            MissionPhase::MissionFailed
        };
        self.phase
    }
}
