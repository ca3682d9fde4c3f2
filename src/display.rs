use std::collections::VecDeque;
use std::io::{Result, Write, stdout};

use crossterm::{
    ExecutableCommand,
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::events::{LogEvent, Snapshot};
use crate::grid::Position;
use crate::types::{CellKind, Heading, Severity};

/// Terminal view: grid, status line and a rolling mission log.
pub struct Display {
    log_messages: VecDeque<LogEvent>,
    max_log_lines: usize,
}

impl Display {
    pub fn new(max_log_lines: usize) -> Self {
        Self {
            log_messages: VecDeque::new(),
            max_log_lines,
        }
    }

    pub fn add_log(&mut self, event: LogEvent) {
        self.log_messages.push_back(event);
        if self.log_messages.len() > self.max_log_lines {
            self.log_messages.pop_front();
        }
    }

    pub fn clear_log(&mut self) {
        self.log_messages.clear();
    }

    pub fn log_lines(&self) -> impl Iterator<Item = &LogEvent> {
        self.log_messages.iter()
    }

    pub fn render(&self, snapshot: &Snapshot) -> Result<()> {
        let mut stdout = stdout();

        stdout.execute(Clear(ClearType::All))?;
        stdout.execute(MoveTo(0, 0))?;
        stdout.execute(SetForegroundColor(Color::Cyan))?;
        stdout.execute(Print("=== MARS ROVER MISSION ===\r\n\r\n"))?;

        let grid = &snapshot.grid;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let (glyph, color) = cell_glyph(snapshot, Position::new(x, y));
                stdout.execute(SetForegroundColor(color))?;
                stdout.execute(Print(glyph))?;
            }
            stdout.execute(Print("\r\n"))?;
        }

        stdout.execute(SetForegroundColor(Color::White))?;
        stdout.execute(Print(format!("\r\n{}\r\n\r\n", status_line(snapshot))))?;

        for event in &self.log_messages {
            let color = match event.severity {
                Severity::Info => Color::Blue,
                Severity::Success => Color::Green,
                Severity::Error => Color::Red,
            };
            stdout.execute(SetForegroundColor(color))?;
            stdout.execute(Print(format!("{} {}\r\n", event.severity.icon(), event.message)))?;
        }

        stdout.execute(ResetColor)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Two-column glyph for one cell. A target stays hidden until analyzed.
pub fn cell_glyph(snapshot: &Snapshot, pos: Position) -> (&'static str, Color) {
    if snapshot.position == pos {
        let arrow = match snapshot.heading {
            Heading::North => "⬆ ",
            Heading::East => "➡ ",
            Heading::South => "⬇ ",
            Heading::West => "⬅ ",
        };
        return (arrow, Color::Yellow);
    }

    let revealed = snapshot
        .revealed
        .get(pos.y)
        .and_then(|row| row.get(pos.x))
        .copied()
        .unwrap_or(false);

    match snapshot.grid.cell(pos) {
        Some(CellKind::Obstacle) => ("██", Color::DarkGrey),
        Some(CellKind::Target) if snapshot.sample_collected => ("✔ ", Color::Green),
        Some(CellKind::Target) if revealed => ("◎ ", Color::Cyan),
        _ => ("· ", Color::White),
    }
}

pub fn status_line(snapshot: &Snapshot) -> String {
    format!(
        "Position: ({}, {}) | Heading: {} | Sample: {} | {}",
        snapshot.position.x,
        snapshot.position.y,
        snapshot.heading.letter(),
        if snapshot.sample_collected { "secured" } else { "none" },
        snapshot.phase.label(),
    )
}
