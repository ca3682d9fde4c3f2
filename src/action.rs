//! Rover actions and their results.
//!
//! An [`Action`] is what a driver asks of the engine; an [`ActionResult`] is
//! what comes back. Text identifiers (including the block ids of the visual
//! editor) are parsed here so nothing downstream dispatches on strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, MissionError};
use crate::types::{CellKind, TurnDirection};

/// One primitive rover command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move,
    Turn(TurnDirection),
    DetectObstacle,
    AnalyzeTerrain,
    Drill,
    Transmit,
}

impl Action {
    /// Parses one program line. `line` is only used for error reporting.
    pub fn parse_line(text: &str, line: usize) -> Result<Self, ConfigurationError> {
        let mut words = text.split_whitespace();
        let name = words.next().unwrap_or_default();
        let argument = words.next();

        let action = match name.to_ascii_lowercase().as_str() {
            "move" | "rover_move" | "forward" => Action::Move,
            "turn" | "rover_turn" => {
                let argument = argument.unwrap_or_default();
                let direction = match argument.to_ascii_lowercase().as_str() {
                    "left" => TurnDirection::Left,
                    "right" => TurnDirection::Right,
                    _ => {
                        return Err(ConfigurationError::InvalidArgument {
                            line,
                            action: name.to_string(),
                            argument: argument.to_string(),
                        });
                    }
                };
                return Ok(Action::Turn(direction));
            }
            "detect_obstacle" | "rover_detect_obstacle" | "detect" => Action::DetectObstacle,
            "analyze" | "analyse" | "rover_analyze" | "analyze_terrain" => Action::AnalyzeTerrain,
            "drill" | "rover_drill" => Action::Drill,
            "transmit" | "rover_transmit" => Action::Transmit,
            _ => {
                return Err(ConfigurationError::UnknownAction {
                    line,
                    name: name.to_string(),
                });
            }
        };

        match argument {
            None => Ok(action),
            Some(extra) => Err(ConfigurationError::InvalidArgument {
                line,
                action: name.to_string(),
                argument: extra.to_string(),
            }),
        }
    }

    /// True for the actions that suspend for a presentation delay.
    pub fn is_paced(self) -> bool {
        !matches!(self, Action::DetectObstacle | Action::AnalyzeTerrain)
    }
}

impl FromStr for Action {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::parse_line(s, 1)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move => f.write_str("move"),
            Action::Turn(TurnDirection::Left) => f.write_str("turn left"),
            Action::Turn(TurnDirection::Right) => f.write_str("turn right"),
            Action::DetectObstacle => f.write_str("detect_obstacle"),
            Action::AnalyzeTerrain => f.write_str("analyze"),
            Action::Drill => f.write_str("drill"),
            Action::Transmit => f.write_str("transmit"),
        }
    }
}

/// Tagged outcome of one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed(MissionError),
    /// Reading from the obstacle sensor.
    Obstacle(bool),
    /// Reading from the terrain analyzer.
    Terrain(CellKind),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: Action,
    pub outcome: Outcome,
    /// Final log line emitted for this action.
    pub message: String,
}

impl ActionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_block_identifiers() {
        assert_eq!("move".parse::<Action>().unwrap(), Action::Move);
        assert_eq!("rover_move".parse::<Action>().unwrap(), Action::Move);
        assert_eq!("turn LEFT".parse::<Action>().unwrap(), Action::Turn(TurnDirection::Left));
        assert_eq!("rover_turn RIGHT".parse::<Action>().unwrap(), Action::Turn(TurnDirection::Right));
        assert_eq!("Detect_Obstacle".parse::<Action>().unwrap(), Action::DetectObstacle);
        assert_eq!("rover_analyze".parse::<Action>().unwrap(), Action::AnalyzeTerrain);
        assert_eq!("drill".parse::<Action>().unwrap(), Action::Drill);
        assert_eq!("rover_transmit".parse::<Action>().unwrap(), Action::Transmit);
    }

    #[test]
    fn unknown_action_is_a_configuration_error() {
        let err = Action::parse_line("jump", 7).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownAction { line: 7, ref name } if name == "jump"));
    }

    #[test]
    fn turn_requires_a_direction() {
        assert!(matches!(
            Action::parse_line("turn", 2),
            Err(ConfigurationError::InvalidArgument { line: 2, .. })
        ));
        assert!(matches!(
            Action::parse_line("turn around", 3),
            Err(ConfigurationError::InvalidArgument { line: 3, .. })
        ));
        assert!(matches!(
            Action::parse_line("drill now", 4),
            Err(ConfigurationError::InvalidArgument { line: 4, .. })
        ));
    }

    #[test]
    fn display_parses_back() {
        for action in [
            Action::Move,
            Action::Turn(TurnDirection::Left),
            Action::Turn(TurnDirection::Right),
            Action::DetectObstacle,
            Action::AnalyzeTerrain,
            Action::Drill,
            Action::Transmit,
        ] {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn sensors_are_not_paced() {
        assert!(Action::Move.is_paced());
        assert!(Action::Turn(TurnDirection::Right).is_paced());
        assert!(Action::Drill.is_paced());
        assert!(Action::Transmit.is_paced());
        assert!(!Action::DetectObstacle.is_paced());
        assert!(!Action::AnalyzeTerrain.is_paced());
    }

    #[test]
    fn json_encoding() {
        let json = serde_json::to_string(&[Action::Move, Action::Turn(TurnDirection::Left)]).unwrap();
        assert_eq!(json, r#"["move",{"turn":"Left"}]"#);
    }
}
