// src/bin/earth.rs

// Module imports for the Earth viewer
// - Display: terminal rendering of the grid and mission log
// - MissionFrame, DEFAULT_PORT: network frames streamed by the mission server
use rover_mission::display::Display;
use rover_mission::network::{DEFAULT_PORT, FrameLine, MAX_MESSAGE_SIZE, MissionFrame, decode_frame, read_frame_line};
use rover_mission::{LogEvent, MissionPhase, Severity};

use clap::Parser;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "earth", about = "Watch a rover mission streamed by the mission server")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds to keep the final screen before exiting.
    #[arg(long, default_value_t = 5)]
    linger: u64,
}

/// Main asynchronous entry point for the Earth viewer
///
/// Connects to the mission server, then redraws the terminal on every frame
/// until the mission concludes or the connection drops.
///
/// # Errors
/// * Connection errors if the mission server is not running
/// * Terminal manipulation errors
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // NOTE - Connect to mission server
    let stream = match TcpStream::connect((args.host.as_str(), args.port)).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("❌ Cannot reach the mission server: {e}");
            eprintln!("🚀 Start it with: cargo run --bin mission -- <program>");
            return Err(e.into());
        }
    };
    info!(host = %args.host, port = args.port, "connected to mission server");

    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    let mut display = Display::new(12);
    let mut snapshot = None;

    // NOTE - Main event loop: one frame per line
    loop {
        match read_frame_line(&mut reader, &mut line, MAX_MESSAGE_SIZE).await {
            Ok(FrameLine::Eof) => {
                warn!("mission server closed the link");
                break;
            }
            Ok(FrameLine::Oversized(bytes)) => {
                warn!(bytes, "oversized frame dropped");
                continue;
            }
            Ok(FrameLine::Line) => {}
            Err(e) => {
                warn!("link lost: {e}");
                break;
            }
        }

        let frame = match decode_frame(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("corrupted frame: {e}");
                continue;
            }
        };

        match frame {
            MissionFrame::Log(event) => {
                // NOTE - A new run starts with a clean log
                if event.message == "--- MISSION START ---" {
                    display.clear_log();
                }
                display.add_log(event);
            }
            MissionFrame::Redraw(frame) => snapshot = Some(frame),
            MissionFrame::Concluded { phase, actions, failures, skipped } => {
                display.add_log(LogEvent {
                    message: format!("{actions} actions, {failures} failed, {skipped} skipped"),
                    severity: Severity::Info,
                });
                display.add_log(final_banner(phase));
                if let Some(snapshot) = &snapshot {
                    display.render(snapshot)?;
                }
                tokio::time::sleep(tokio::time::Duration::from_secs(args.linger)).await;
                break;
            }
        }

        if let Some(snapshot) = &snapshot {
            display.render(snapshot)?;
        }
    }

    Ok(())
}

fn final_banner(phase: MissionPhase) -> LogEvent {
    match phase {
        MissionPhase::MissionComplete => LogEvent {
            message: "🎉 MISSION SUCCESS! Water sample recovered. Data transmitted. Good job, Commander!".to_string(),
            severity: Severity::Success,
        },
        MissionPhase::MissionFailed => LogEvent {
            message: "Mission Failed: You didn't collect the sample.".to_string(),
            severity: Severity::Error,
        },
        other => LogEvent {
            message: format!("Program ended without transmitting ({})", other.label()),
            severity: Severity::Info,
        },
    }
}
