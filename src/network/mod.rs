//! # Mission Broadcast Protocol Module
//!
//! This module implements the link between the mission server, which drives
//! the rover engine, and Earth-side viewers that render the mission log and
//! the grid view.
//!
//! ## Protocol Architecture
//!
//! The server writes one JSON document per line over TCP:
//! - every engine log event becomes a `log` frame
//! - every redraw notification becomes a `redraw` frame with a full snapshot
//! - a single `concluded` frame closes the mission
//!
//! Frames carry complete state, so a viewer joining late only needs the next
//! redraw to be in sync.

use std::io;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::events::{EngineEvent, LogEvent, Snapshot};
use crate::types::MissionPhase;

/// One line on the wire.
///
/// # Examples
///
/// ```rust
/// use rover_mission::network::{MissionFrame, decode_frame, encode_frame};
/// use rover_mission::{LogEvent, Severity};
///
/// let frame = MissionFrame::Log(LogEvent {
///     message: "Moving forward...".to_string(),
///     severity: Severity::Info,
/// });
/// let line = encode_frame(&frame).unwrap();
/// assert!(line.ends_with('\n'));
/// assert_eq!(decode_frame(&line).unwrap(), frame);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MissionFrame {
    /// A mission log line, in emission order.
    Log(LogEvent),

    /// State of the grid view after a change.
    Redraw(Snapshot),

    /// Sent once after the driven program has finished.
    ///
    /// `actions` counts executed actions, `failures` those that failed,
    /// `skipped` those left unexecuted after the concluding transmit.
    Concluded {
        phase: MissionPhase,
        actions: usize,
        failures: usize,
        skipped: usize,
    },
}

impl From<EngineEvent> for MissionFrame {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::Log(event) => MissionFrame::Log(event),
            EngineEvent::Redraw(snapshot) => MissionFrame::Redraw(snapshot),
        }
    }
}

/// Default TCP port for the mission server.
///
/// Viewers connect to `localhost:8080` when running locally.
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum accepted frame size (1 megabyte).
///
/// A 5×5 snapshot is well under 1KB; the cap only guards viewers against a
/// runaway or hostile peer.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Serializes a frame as a newline-terminated JSON line.
pub fn encode_frame(frame: &MissionFrame) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_frame(line: impl AsRef<[u8]>) -> Result<MissionFrame, serde_json::Error> {
    serde_json::from_slice(line.as_ref().trim_ascii_end())
}

/// Result of [`read_frame_line`].
#[derive(Debug, PartialEq, Eq)]
pub enum FrameLine {
    /// A complete line is in the buffer.
    Line,
    /// The peer closed the connection.
    Eof,
    /// A line longer than the limit was skipped; carries its size in bytes.
    Oversized(usize),
}

/// Reads one line into `buf`, never buffering more than `limit + 1` bytes.
///
/// An oversized line is consumed up to and including its newline and
/// discarded, so the next call starts on the following frame.
pub async fn read_frame_line<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<FrameLine>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let cap = limit.saturating_add(1);
    let read = (&mut *reader).take(cap as u64).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(FrameLine::Eof);
    }
    if buf.ends_with(b"\n") || read < cap {
        return Ok(FrameLine::Line);
    }

    let mut dropped = read;
    buf.clear();
    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), available.is_empty()),
            }
        };
        reader.consume(used);
        dropped += used;
        if done {
            return Ok(FrameLine::Oversized(dropped));
        }
    }
}

/// Frame summarizing a finished run.
pub fn concluded_frame(report: &crate::program::MissionReport) -> MissionFrame {
    MissionFrame::Concluded {
        phase: report.phase,
        actions: report.results.len(),
        failures: report.failures(),
        skipped: report.skipped,
    }
}
