//! Presentation pacing.
//!
//! Paced actions suspend for a fixed delay so a viewer can follow the
//! animation. The delay source is injected into the engine: the tokio timer
//! in the binaries, [`Instant`] or [`Recording`] in tests.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub trait Pacer {
    fn pause(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn pause(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Completes every pause immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Instant;

impl Pacer for Instant {
    fn pause(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}

/// Completes immediately and remembers every requested delay.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, oldest first.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Pacer for Recording {
    fn pause(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
        std::future::ready(())
    }
}

/// Presentation delays in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Timing {
    /// After a successful move and after every turn.
    pub step_ms: u64,
    /// After a blocked move.
    pub impact_ms: u64,
    /// Before the drill result is known.
    pub drill_ms: u64,
    /// After a drill, and after a successful uplink.
    pub settle_ms: u64,
    /// Before the uplink result is known.
    pub uplink_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            step_ms: 600,
            impact_ms: 500,
            drill_ms: 1000,
            settle_ms: 500,
            uplink_ms: 800,
        }
    }
}

impl Timing {
    /// All delays zero.
    pub const fn instant() -> Self {
        Self {
            step_ms: 0,
            impact_ms: 0,
            drill_ms: 0,
            settle_ms: 0,
            uplink_ms: 0,
        }
    }

    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    pub fn impact(&self) -> Duration {
        Duration::from_millis(self.impact_ms)
    }

    pub fn drill(&self) -> Duration {
        Duration::from_millis(self.drill_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn uplink(&self) -> Duration {
        Duration::from_millis(self.uplink_ms)
    }
}
