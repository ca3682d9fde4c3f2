//! Mission configuration.
//!
//! Loaded from a TOML file. Every field is optional and falls back to the
//! reference mission:
//!
//! ```toml
//! width = 5
//! height = 5
//! obstacles = [[1, 1]]
//! target = [4, 4]
//! start = [0, 0]
//! heading = "East"
//! # seed = 7          # procedural layout, ignores obstacles/target
//!
//! [timing]
//! step-ms = 600
//! drill-ms = 1000
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{Grid, Position};
use crate::pacing::Timing;
use crate::types::{DEFAULT_GRID_SIZE, Heading};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MissionConfig {
    pub width: usize,
    pub height: usize,
    pub obstacles: Vec<(usize, usize)>,
    pub target: (usize, usize),
    pub start: (usize, usize),
    pub heading: Heading,
    /// When set, obstacles and target are generated instead of read.
    pub seed: Option<u64>,
    pub timing: Timing,
}

impl Default for MissionConfig {
    fn default() -> Self {
        let corner = DEFAULT_GRID_SIZE - 1;
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            obstacles: vec![(1, 1)],
            target: (corner, corner),
            start: (0, 0),
            heading: Heading::East,
            seed: None,
            timing: Timing::default(),
        }
    }
}

impl MissionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.start.0, self.start.1)
    }

    /// Builds the mission grid. The start cell is checked by the engine.
    pub fn build_grid(&self) -> Result<Grid> {
        match self.seed {
            Some(seed) => Grid::generate(self.width, self.height, self.start_position(), seed),
            None => {
                let obstacles: Vec<Position> = self.obstacles.iter().map(|&(x, y)| Position::new(x, y)).collect();
                Grid::new(self.width, self.height, &obstacles, Position::new(self.target.0, self.target.1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::engine::Engine;
    use crate::error::ConfigurationError;
    use crate::pacing::Instant;

    #[test]
    fn default_builds_reference_grid() {
        let config = MissionConfig::default();
        assert_eq!(config.build_grid().unwrap(), Grid::reference());
        assert_eq!(config.heading, Heading::East);
        assert_eq!(config.timing, Timing::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = MissionConfig::parse(
            r#"
            width = 6
            target = [5, 2]
            heading = "South"

            [timing]
            step-ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, 5);
        assert_eq!(config.heading, Heading::South);
        assert_eq!(config.timing.step_ms, 10);
        assert_eq!(config.timing.drill_ms, 1000);
        assert_eq!(config.build_grid().unwrap().target(), Position::new(5, 2));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let config = MissionConfig::parse("width = 4611686018427387904\nheight = 1\ntarget = [0, 0]").unwrap();
        assert!(matches!(config.build_grid(), Err(ConfigurationError::GridTooLarge { .. })));
    }

    #[test]
    fn start_on_obstacle_is_rejected() {
        let config = MissionConfig {
            start: (1, 1),
            ..MissionConfig::default()
        };
        assert!(matches!(
            Engine::from_config(&config, Instant),
            Err(ConfigurationError::BlockedCell { what: "start", .. })
        ));
    }

    #[test]
    fn start_outside_grid_is_rejected() {
        let config = MissionConfig {
            start: (9, 0),
            ..MissionConfig::default()
        };
        assert!(matches!(
            Engine::from_config(&config, Instant),
            Err(ConfigurationError::OutOfBounds { what: "start", .. })
        ));
    }

    #[test]
    fn invalid_toml_is_a_configuration_error() {
        assert!(matches!(MissionConfig::parse("width = \"wide\""), Err(ConfigurationError::Toml(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "obstacles = [[2, 2], [3, 1]]").unwrap();
        let config = MissionConfig::load(file.path()).unwrap();
        let grid = config.build_grid().unwrap();
        assert!(!grid.is_passable(Position::new(2, 2)));
        assert!(!grid.is_passable(Position::new(3, 1)));
        assert!(grid.is_passable(Position::new(1, 1)));
    }
}
