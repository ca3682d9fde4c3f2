//! Observer streams published by the engine.
//!
//! Two independent streams, each delivered in emission order:
//! - log events: `(message, severity)` lines for the mission log
//! - redraw notifications: a full [`Snapshot`] of what the grid view shows
//!
//! Consumers that need the relative order of the two (a viewer replaying the
//! mission) subscribe to the combined [`EngineEvent`] stream instead.
//!
//! Subscribers receive an unbounded tokio channel. Emission never blocks and
//! never fails; receivers that were dropped are pruned on the next emit.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::grid::{Grid, Position};
use crate::types::{Heading, MissionPhase, Severity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub message: String,
    pub severity: Severity,
}

/// Everything the grid view needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: Grid,
    pub position: Position,
    pub heading: Heading,
    pub revealed: Vec<Vec<bool>>,
    pub sample_collected: bool,
    pub phase: MissionPhase,
}

/// One item of the combined stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Log(LogEvent),
    Redraw(Snapshot),
}

#[derive(Default)]
pub struct EventBus {
    log_subscribers: Vec<UnboundedSender<LogEvent>>,
    redraw_subscribers: Vec<UnboundedSender<Snapshot>>,
    subscribers: Vec<UnboundedSender<EngineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_log(&mut self) -> UnboundedReceiver<LogEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.log_subscribers.push(tx);
        rx
    }

    pub fn subscribe_redraw(&mut self) -> UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.redraw_subscribers.push(tx);
        rx
    }

    /// Log and redraw events on a single channel, in emission order.
    pub fn subscribe(&mut self) -> UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let event = LogEvent {
            message: message.into(),
            severity,
        };

        // NOTE - Mirror to diagnostics, as the console did for every log line
        match severity {
            Severity::Error => tracing::warn!(target: "rover", "{}", event.message),
            Severity::Info | Severity::Success => tracing::info!(target: "rover", "{}", event.message),
        }

        self.log_subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.subscribers.retain(|tx| tx.send(EngineEvent::Log(event.clone())).is_ok());
    }

    pub fn redraw(&mut self, snapshot: Snapshot) {
        self.redraw_subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        self.subscribers.retain(|tx| tx.send(EngineEvent::Redraw(snapshot.clone())).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_events_arrive_in_order() {
        let mut bus = EventBus::new();
        let mut rx = bus.subscribe_log();
        bus.log(Severity::Info, "one");
        bus.log(Severity::Error, "two");

        assert_eq!(rx.try_recv().unwrap().message, "one");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.message, "two");
        assert_eq!(second.severity, Severity::Error);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn combined_stream_keeps_log_and_redraw_interleaving() {
        let mut bus = EventBus::new();
        let mut rx = bus.subscribe();
        let snapshot = crate::engine::Engine::reference().snapshot();

        bus.log(Severity::Info, "Moving forward...");
        bus.redraw(snapshot.clone());
        bus.log(Severity::Info, "Position: (1, 0) Dir: E");
        bus.redraw(snapshot.clone());

        let order: Vec<&str> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| match event {
                EngineEvent::Log(_) => "log",
                EngineEvent::Redraw(_) => "redraw",
            })
            .collect();
        assert_eq!(order, ["log", "redraw", "log", "redraw"]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe_log();
        let mut kept = bus.subscribe_log();
        drop(rx);

        drop(bus.subscribe());

        bus.log(Severity::Success, "still delivered");
        assert_eq!(bus.log_subscribers.len(), 1);
        assert!(bus.subscribers.is_empty());
        assert_eq!(kept.try_recv().unwrap().message, "still delivered");
    }
}
