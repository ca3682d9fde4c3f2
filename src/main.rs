// Runner local : exécute un programme de mission avec rendu terminal

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;

use rover_mission::display::Display;
use rover_mission::pacing::{Timing, TokioPacer};
use rover_mission::route::plan_route;
use rover_mission::{Engine, EngineEvent, MissionConfig, MissionPhase, Program, Severity, Snapshot, run_program};

#[derive(Parser)]
#[command(name = "rover-mission", about = "Drive a Mars rover through a grid mission")]
struct Cli {
    /// Mission config file (TOML). Defaults to the reference mission.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a program (text or .json) with live terminal rendering.
    Run {
        program: PathBuf,
        /// Skip presentation delays.
        #[arg(long)]
        instant: bool,
    },
    /// Print a program that drives the rover to the target and completes the mission.
    Plan,
    /// Render the mission grid.
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => MissionConfig::load(path)?,
        None => MissionConfig::default(),
    };

    match cli.command {
        Command::Run { program, instant } => {
            if instant {
                config.timing = Timing::instant();
            }
            let program = Program::load(&program)?;
            let mut engine = Engine::from_config(&config, TokioPacer)?;

            let events = engine.subscribe();
            let viewer = tokio::spawn(render_loop(engine.snapshot(), events));

            engine.announce(Severity::Info, "System Online. Awaiting commands.");
            let report = run_program(&mut engine, &program).await;
            drop(engine);
            viewer.await??;

            println!();
            match report.phase {
                MissionPhase::MissionComplete => println!("🎉 MISSION SUCCESS! Water sample recovered. Data transmitted."),
                MissionPhase::MissionFailed => println!("Mission Failed: You didn't collect the sample."),
                phase => println!("Program ended without transmitting ({}).", phase.label()),
            }
            println!(
                "{} actions executed, {} failed, {} skipped.",
                report.results.len(),
                report.failures(),
                report.skipped
            );
        }
        Command::Plan => {
            let engine = Engine::from_config(&config, TokioPacer)?;
            let state = engine.state();
            match plan_route(engine.grid(), state.position, state.heading) {
                Some(actions) => print!("{}", Program::new(actions).to_text()),
                None => {
                    eprintln!("❌ No route to the target from the start cell.");
                    std::process::exit(1);
                }
            }
        }
        Command::Show => {
            let engine = Engine::from_config(&config, TokioPacer)?;
            Display::new(0).render(&engine.snapshot())?;
            println!();
        }
    }

    Ok(())
}

/// Redraws the terminal on every event until the engine is dropped.
async fn render_loop(mut snapshot: Snapshot, mut events: UnboundedReceiver<EngineEvent>) -> std::io::Result<()> {
    let mut display = Display::new(10);
    display.render(&snapshot)?;

    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::Log(event) => display.add_log(event),
            EngineEvent::Redraw(frame) => snapshot = frame,
        }
        display.render(&snapshot)?;
    }
    Ok(())
}
