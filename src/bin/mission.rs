// Serveur de mission
// Exécute un programme sur le moteur du rover et diffuse le journal et l'état via TCP

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex as TokioMutex, oneshot, watch};
use tracing::{error, info, warn};

use rover_mission::network::{DEFAULT_PORT, MissionFrame, concluded_frame, encode_frame};
use rover_mission::pacing::{Timing, TokioPacer};
use rover_mission::{Engine, EngineEvent, MissionConfig, Program, Severity, run_program};

#[derive(Parser)]
#[command(name = "mission", about = "Run a rover program and stream it to Earth viewers")]
struct Args {
    /// Program to execute (text, or JSON when the file ends in .json).
    program: PathBuf,

    /// Mission config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Viewers to wait for before the program starts.
    #[arg(long, default_value_t = 1)]
    viewers: usize,

    /// Skip presentation delays.
    #[arg(long)]
    instant: bool,
}

type Clients = Arc<TokioMutex<Vec<TcpStream>>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // === PHASE 1: MISSION ===

    let mut config = match &args.config {
        Some(path) => MissionConfig::load(path)?,
        None => MissionConfig::default(),
    };
    if args.instant {
        config.timing = Timing::instant();
    }
    let program = Program::load(&args.program)?;
    let mut engine = Engine::from_config(&config, TokioPacer)?;
    info!(actions = program.len(), width = config.width, height = config.height, "mission loaded");

    // === PHASE 2: LIAISON TERRE ===

    let listener = TcpListener::bind(("127.0.0.1", args.port)).await.inspect_err(|e| {
        error!(port = args.port, "cannot bind: {e}");
    })?;
    info!(port = args.port, "waiting for Earth viewers");

    let clients: Clients = Arc::new(TokioMutex::new(Vec::new()));
    let (count_tx, mut count_rx) = watch::channel(0usize);
    tokio::spawn(accept_loop(listener, clients.clone(), count_tx));

    while *count_rx.borrow_and_update() < args.viewers {
        count_rx.changed().await?;
    }

    // === PHASE 3: DIFFUSION ===

    let events = engine.subscribe();
    let (done_tx, done_rx) = oneshot::channel();
    let broadcaster = tokio::spawn(broadcast(clients.clone(), events, done_rx));

    engine.announce(Severity::Info, "System Online. Awaiting commands.");
    engine.refresh();

    // === PHASE 4: EXÉCUTION ===

    let report = run_program(&mut engine, &program).await;
    info!(phase = report.phase.label(), failures = report.failures(), "program finished");

    drop(engine);
    if done_tx.send(concluded_frame(&report)).is_err() {
        warn!("broadcaster stopped before the mission concluded");
    }
    broadcaster.await?;

    Ok(())
}

async fn accept_loop(listener: TcpListener, clients: Clients, count_tx: watch::Sender<usize>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(%addr, "Earth viewer connected");
                let mut streams = clients.lock().await;
                streams.push(stream);
                count_tx.send_replace(streams.len());
            }
            Err(e) => error!("accept failed: {e}"),
        }
    }
}

/// Forwards engine events to every viewer until the engine is dropped,
/// then sends the concluding frame.
async fn broadcast(
    clients: Clients,
    mut events: UnboundedReceiver<EngineEvent>,
    done_rx: oneshot::Receiver<MissionFrame>,
) {
    while let Some(event) = events.recv().await {
        send_to_all(&clients, &MissionFrame::from(event)).await;
    }

    if let Ok(frame) = done_rx.await {
        send_to_all(&clients, &frame).await;
    }
}

async fn send_to_all(clients: &Clients, frame: &MissionFrame) {
    let line = match encode_frame(frame) {
        Ok(line) => line,
        Err(e) => {
            error!("frame serialization failed: {e}");
            return;
        }
    };

    let mut streams = clients.lock().await;
    let mut disconnected = Vec::new();
    for (i, stream) in streams.iter_mut().enumerate() {
        if stream.write_all(line.as_bytes()).await.is_err() {
            disconnected.push(i);
        }
    }
    for i in disconnected.into_iter().rev() {
        info!(viewer = i, "Earth viewer disconnected");
        streams.remove(i);
    }
}
