//! Program ingestion and the sequential driver.
//!
//! A program is the ordered action stream an external code generator
//! produces. It is accepted as text (one action per line) or as a JSON array
//! of actions, and executed strictly one action at a time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionResult};
use crate::engine::Engine;
use crate::error::Result;
use crate::pacing::Pacer;
use crate::types::{MissionPhase, Severity};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    pub actions: Vec<Action>,
}

impl Program {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Parses the text form. Blank lines and `#` comments are skipped.
    pub fn parse(source: &str) -> Result<Self> {
        let mut actions = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            actions.push(Action::parse_line(text, idx + 1)?);
        }
        Ok(Self { actions })
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a program file; `.json` files use the JSON form.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&source),
            _ => Self::parse(&source),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Text form, one action per line.
    pub fn to_text(&self) -> String {
        self.actions.iter().map(|a| format!("{a}\n")).collect()
    }
}

/// What happened during one driven run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReport {
    pub results: Vec<ActionResult>,
    pub phase: MissionPhase,
    /// Actions left unexecuted because a transmit concluded the mission.
    pub skipped: usize,
}

impl MissionReport {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }
}

/// Executes `program` one action at a time, stopping after the first transmit.
pub async fn run_program<P: Pacer>(engine: &mut Engine<P>, program: &Program) -> MissionReport {
    engine.announce(Severity::Info, "--- MISSION START ---");

    let mut results = Vec::with_capacity(program.len());
    for action in &program.actions {
        tracing::debug!(%action, paced = action.is_paced(), "executing");
        let result = engine.execute(*action).await;
        results.push(result);

        if *action == Action::Transmit {
            break;
        }
    }

    let skipped = program.len() - results.len();
    if skipped > 0 {
        tracing::info!(skipped, "mission concluded, remaining actions ignored");
    }

    MissionReport {
        results,
        phase: engine.phase(),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::types::TurnDirection;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let program = Program::parse(
            "# approach\nmove\n\n  turn right  # south\nrover_drill\n",
        )
        .unwrap();
        assert_eq!(program.actions, vec![Action::Move, Action::Turn(TurnDirection::Right), Action::Drill]);
    }

    #[test]
    fn parse_reports_line_of_unknown_action() {
        let err = Program::parse("move\nmove\nhover\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownAction { line: 3, .. }));
    }

    #[test]
    fn json_and_text_agree() {
        let text = Program::parse("move\nturn left\nanalyze\ntransmit").unwrap();
        let json = Program::from_json(r#"["move", {"turn": "Left"}, "analyze_terrain", "transmit"]"#).unwrap();
        assert_eq!(text, json);
        assert_eq!(Program::parse(&text.to_text()).unwrap(), text);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(Program::from_json(r#"["fly"]"#), Err(ConfigurationError::Json(_))));
    }
}
