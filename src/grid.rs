use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::route;
use crate::types::{CellKind, DEFAULT_GRID_SIZE, Heading};

/// Re-rolls allowed before a procedural mission falls back to open ground.
const GENERATION_ATTEMPTS: usize = 8;

/// Largest grid accepted, in cells.
pub const MAX_GRID_CELLS: usize = 65_536;

/// Perlin value above which a cell becomes an obstacle.
const OBSTACLE_THRESHOLD: f64 = 0.35;

/// Integer cell coordinates. `y` grows southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Static mission terrain. Exactly one cell is the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    // NOTE - cells[y][x]
    cells: Vec<Vec<CellKind>>,
    target: Position,
}

impl Grid {
    /// Builds a grid from obstacle coordinates and the target cell.
    pub fn new(width: usize, height: usize, obstacles: &[Position], target: Position) -> Result<Self> {
        check_size(width, height)?;
        check_bounds("target", target, width, height)?;

        let mut cells = vec![vec![CellKind::Empty; width]; height];
        for &obstacle in obstacles {
            check_bounds("obstacle", obstacle, width, height)?;
            if obstacle == target {
                return Err(ConfigurationError::BlockedCell {
                    what: "target",
                    x: target.x,
                    y: target.y,
                });
            }
            cells[obstacle.y][obstacle.x] = CellKind::Obstacle;
        }
        cells[target.y][target.x] = CellKind::Target;

        Ok(Self {
            width,
            height,
            cells,
            target,
        })
    }

    /// Builds a grid from rows of cell kinds, validating the single-target rule.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        check_size(width, height)?;

        let mut targets = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ConfigurationError::OutOfBounds {
                    what: "row",
                    x: row.len(),
                    y,
                    width,
                    height,
                });
            }
            for (x, kind) in row.iter().enumerate() {
                if *kind == CellKind::Target {
                    targets.push(Position::new(x, y));
                }
            }
        }

        match targets.as_slice() {
            [target] => Ok(Self {
                width,
                height,
                target: *target,
                cells: rows,
            }),
            _ => Err(ConfigurationError::TargetCount(targets.len())),
        }
    }

    /// The 5×5 reference mission: obstacle at (1, 1), target at (4, 4).
    pub fn reference() -> Self {
        let mut cells = vec![vec![CellKind::Empty; DEFAULT_GRID_SIZE]; DEFAULT_GRID_SIZE];
        cells[1][1] = CellKind::Obstacle;
        cells[DEFAULT_GRID_SIZE - 1][DEFAULT_GRID_SIZE - 1] = CellKind::Target;
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            cells,
            target: Position::new(DEFAULT_GRID_SIZE - 1, DEFAULT_GRID_SIZE - 1),
        }
    }

    /// Procedural terrain: Perlin obstacles, target in the corner opposite
    /// `start`. Layouts where the target cannot be reached are re-rolled.
    pub fn generate(width: usize, height: usize, start: Position, seed: u64) -> Result<Self> {
        check_size(width, height)?;
        check_bounds("start", start, width, height)?;

        let target = Position::new(
            if start.x < width / 2 { width - 1 } else { 0 },
            if start.y < height / 2 { height - 1 } else { 0 },
        );
        let mut rng = StdRng::seed_from_u64(seed);

        for attempt in 0..GENERATION_ATTEMPTS {
            let perlin = Perlin::new(rng.r#gen());
            let mut obstacles = Vec::new();
            for y in 0..height {
                for x in 0..width {
                    let nx = x as f64 / width as f64;
                    let ny = y as f64 / height as f64;
                    let cell = Position::new(x, y);
                    if cell != start && cell != target && perlin.get([nx * 4.0, ny * 4.0]) > OBSTACLE_THRESHOLD {
                        obstacles.push(cell);
                    }
                }
            }

            let grid = Self::new(width, height, &obstacles, target)?;
            if route::shortest_path(&grid, start, target).is_some() {
                tracing::debug!(attempt, obstacles = obstacles.len(), "procedural grid accepted");
                return Ok(grid);
            }
        }

        tracing::warn!(seed, "no reachable layout found, using open ground");
        Self::new(width, height, &[], target)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Kind of the cell at `pos`, or `None` outside the grid.
    pub fn cell(&self, pos: Position) -> Option<CellKind> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    /// The neighbour of `pos` one step along `heading`, if it lies on the grid.
    pub fn step(&self, pos: Position, heading: Heading) -> Option<Position> {
        let (dx, dy) = heading.delta();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        let next = Position::new(x, y);
        self.contains(next).then_some(next)
    }

    /// True when the rover could stand on `pos`.
    pub fn is_passable(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(kind) if kind != CellKind::Obstacle)
    }

    /// Rejects a start cell off the grid or on an obstacle.
    pub fn check_start(&self, start: Position) -> Result<()> {
        check_bounds("start", start, self.width, self.height)?;
        if !self.is_passable(start) {
            return Err(ConfigurationError::BlockedCell {
                what: "start",
                x: start.x,
                y: start.y,
            });
        }
        Ok(())
    }
}

fn check_size(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ConfigurationError::EmptyGrid { width, height });
    }
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
        _ => Err(ConfigurationError::GridTooLarge {
            width,
            height,
            max: MAX_GRID_CELLS,
        }),
    }
}

fn check_bounds(what: &'static str, pos: Position, width: usize, height: usize) -> Result<()> {
    if pos.x < width && pos.y < height {
        Ok(())
    } else {
        Err(ConfigurationError::OutOfBounds {
            what,
            x: pos.x,
            y: pos.y,
            width,
            height,
        })
    }
}
