//! # Rover Simulation Engine
//!
//! Owns the mission grid and the rover state and executes one primitive
//! action at a time. Every handler takes `&mut self`, so a driver cannot
//! start an action before the previous one has completed.
//!
//! Paced actions (move, turn, drill, transmit) suspend on the injected
//! [`Pacer`]. A state mutation and the events that announce it always happen
//! between two suspension points: dropping an in-flight action future leaves
//! the mission either before or after that mutation, never halfway.

use crate::action::{Action, ActionResult, Outcome};
use crate::config::MissionConfig;
use crate::error::{ConfigurationError, MissionError};
use crate::events::{EngineEvent, EventBus, LogEvent, Snapshot};
use crate::grid::{Grid, Position};
use crate::pacing::{Pacer, Timing, TokioPacer};
use crate::rover::RoverState;
use crate::types::{CellKind, Heading, MissionPhase, Severity, TurnDirection};

use tokio::sync::mpsc::UnboundedReceiver;

pub struct Engine<P = TokioPacer> {
    grid: Grid,
    start: Position,
    start_heading: Heading,
    state: RoverState,
    timing: Timing,
    pacer: P,
    events: EventBus,
    last_message: String,
}

impl Engine<TokioPacer> {
    /// The reference mission on the tokio timer.
    pub fn reference() -> Self {
        Self::from_parts(Grid::reference(), Position::new(0, 0), Heading::East, Timing::default(), TokioPacer)
    }
}

impl<P: Pacer> Engine<P> {
    /// Builds an engine, rejecting a start cell off the grid or on an obstacle.
    pub fn new(
        grid: Grid,
        start: Position,
        heading: Heading,
        timing: Timing,
        pacer: P,
    ) -> Result<Self, ConfigurationError> {
        grid.check_start(start)?;
        Ok(Self::from_parts(grid, start, heading, timing, pacer))
    }

    pub fn from_config(config: &MissionConfig, pacer: P) -> Result<Self, ConfigurationError> {
        let grid = config.build_grid()?;
        Self::new(grid, config.start_position(), config.heading, config.timing, pacer)
    }

    fn from_parts(grid: Grid, start: Position, heading: Heading, timing: Timing, pacer: P) -> Self {
        let state = RoverState::new(start, heading, grid.width(), grid.height());
        Self {
            grid,
            start,
            start_heading: heading,
            state,
            timing,
            pacer,
            events: EventBus::new(),
            last_message: String::new(),
        }
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_log(&mut self) -> UnboundedReceiver<LogEvent> {
        self.events.subscribe_log()
    }

    pub fn subscribe_redraw(&mut self) -> UnboundedReceiver<Snapshot> {
        self.events.subscribe_redraw()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &RoverState {
        &self.state
    }

    pub fn phase(&self) -> MissionPhase {
        self.state.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            position: self.state.position,
            heading: self.state.heading,
            revealed: self.state.revealed.clone(),
            sample_collected: self.state.sample_collected,
            phase: self.state.phase,
        }
    }

    /// Emits a log line outside of any action (banners, driver notices).
    pub fn announce(&mut self, severity: Severity, message: impl Into<String>) {
        self.log(severity, message);
    }

    /// Publishes the current state to redraw subscribers.
    pub fn refresh(&mut self) {
        let snapshot = self.snapshot();
        self.events.redraw(snapshot);
    }

    fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        self.last_message.clone_from(&message);
        self.events.log(severity, message);
    }

    // ── Actions ──

    pub async fn move_forward(&mut self) -> Result<(), MissionError> {
        self.log(Severity::Info, "Moving forward...");

        let blocked = match self.grid.step(self.state.position, self.state.heading) {
            None => Some((MissionError::BoundaryViolation, "CRASH! Boundary detection alarm.")),
            Some(next) if self.grid.cell(next) == Some(CellKind::Obstacle) => {
                Some((MissionError::CollisionDetected, "CRASH! Obstacle impact confirmed."))
            }
            Some(next) => {
                self.state.position = next;
                self.refresh();
                self.log(
                    Severity::Info,
                    format!("Position: ({}, {}) Dir: {}", next.x, next.y, self.state.heading.letter()),
                );
                None
            }
        };

        match blocked {
            Some((err, message)) => {
                self.log(Severity::Error, message);
                self.pacer.pause(self.timing.impact()).await;
                Err(err)
            }
            None => {
                self.pacer.pause(self.timing.step()).await;
                Ok(())
            }
        }
    }

    pub async fn turn(&mut self, direction: TurnDirection) {
        self.log(Severity::Info, format!("Turning {direction}..."));

        self.state.heading = self.state.heading.turned(direction);
        self.refresh();
        self.log(Severity::Info, format!("Heading: {}", self.state.heading.letter()));

        self.pacer.pause(self.timing.step()).await;
    }

    /// Edge of the grid reads as an obstacle here, unlike in [`Self::move_forward`].
    pub fn detect_obstacle(&mut self) -> bool {
        let ahead = self.grid.step(self.state.position, self.state.heading);
        let is_obstacle = match ahead {
            None => true,
            Some(cell) => self.grid.cell(cell) == Some(CellKind::Obstacle),
        };

        self.log(
            Severity::Info,
            format!("Sensor Scan: {}", if is_obstacle { "OBSTACLE" } else { "CLEAR" }),
        );
        is_obstacle
    }

    pub fn analyze_terrain(&mut self) -> CellKind {
        let position = self.state.position;
        // NOTE - position is on the grid by construction
        let kind = self.grid.cell(position).unwrap_or(CellKind::Empty);
        self.log(Severity::Info, format!("Analyzing: {}", kind.name().to_uppercase()));

        if kind == CellKind::Target {
            self.state.reveal(position);
            self.refresh();
        }
        kind
    }

    pub async fn drill(&mut self) -> Result<(), MissionError> {
        self.log(Severity::Info, "Deploying Drill...");
        self.pacer.pause(self.timing.drill()).await;

        let result = if self.grid.cell(self.state.position) == Some(CellKind::Target) {
            if !self.state.sample_collected {
                self.state.collect_sample();
                self.refresh();
            }
            self.log(Severity::Success, "SAMPLE ACQUIRED! Storage secure.");
            Ok(())
        } else {
            self.log(Severity::Error, "Drill Error: No target substrate.");
            Err(MissionError::NoSubstrate)
        };

        self.pacer.pause(self.timing.settle()).await;
        result
    }

    pub async fn transmit(&mut self) -> Result<(), MissionError> {
        self.log(Severity::Info, "Aligning antenna...");
        self.pacer.pause(self.timing.uplink()).await;

        match self.state.conclude() {
            MissionPhase::MissionComplete => {
                self.refresh();
                self.log(Severity::Success, "UPLINK ESTABLISHED. Data sent.");
                self.pacer.pause(self.timing.settle()).await;
                self.log(Severity::Success, "MISSION SUCCESS! Water sample recovered.");
                Ok(())
            }
            _ => {
                self.refresh();
                self.log(Severity::Error, "Uplink failed: No data payload.");
                Err(MissionError::NoPayload)
            }
        }
    }

    /// Back to the start cell and heading. The grid is left as is.
    pub fn reset(&mut self) {
        self.state = RoverState::new(self.start, self.start_heading, self.grid.width(), self.grid.height());
        self.log(Severity::Info, "System Reset. Returned to Base.");
        self.refresh();
    }

    /// Runs one action and wraps its outcome with the last log line it emitted.
    pub async fn execute(&mut self, action: Action) -> ActionResult {
        let outcome = match action {
            Action::Move => completed(self.move_forward().await),
            Action::Turn(direction) => {
                self.turn(direction).await;
                Outcome::Succeeded
            }
            Action::DetectObstacle => Outcome::Obstacle(self.detect_obstacle()),
            Action::AnalyzeTerrain => Outcome::Terrain(self.analyze_terrain()),
            Action::Drill => completed(self.drill().await),
            Action::Transmit => completed(self.transmit().await),
        };

        ActionResult {
            action,
            outcome,
            message: self.last_message.clone(),
        }
    }
}

fn completed(result: Result<(), MissionError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Succeeded,
        Err(err) => Outcome::Failed(err),
    }
}
