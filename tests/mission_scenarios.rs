use rover_mission::pacing::{Instant, Timing};
use rover_mission::route::plan_route;
use rover_mission::{
    Action, CellKind, Engine, Grid, Heading, MissionConfig, MissionError, MissionPhase, Outcome, Position,
    Program, Severity, TurnDirection, run_program,
};

fn reference_engine() -> Engine<Instant> {
    Engine::new(Grid::reference(), Position::new(0, 0), Heading::East, Timing::instant(), Instant).unwrap()
}

#[tokio::test]
async fn reference_route_collects_and_transmits() {
    let mut engine = reference_engine();
    let mut redraw = engine.subscribe_redraw();

    let mut actions = vec![Action::Move; 4];
    actions.push(Action::Turn(TurnDirection::Right));
    actions.extend([Action::Move; 4]);
    actions.extend([Action::Drill, Action::Transmit]);

    let report = run_program(&mut engine, &Program::new(actions)).await;

    assert_eq!(report.phase, MissionPhase::MissionComplete);
    assert_eq!(report.failures(), 0);
    assert_eq!(report.skipped, 0);
    assert_eq!(engine.state().position, Position::new(4, 4));
    assert!(engine.state().sample_collected);

    let mut path = Vec::new();
    while let Ok(snapshot) = redraw.try_recv() {
        if path.last() != Some(&snapshot.position) {
            path.push(snapshot.position);
        }
    }
    let expected: Vec<Position> = [(1, 0), (2, 0), (3, 0), (4, 0), (4, 1), (4, 2), (4, 3), (4, 4)]
        .into_iter()
        .map(|(x, y)| Position::new(x, y))
        .collect();
    assert_eq!(path, expected);
}

#[tokio::test]
async fn collision_from_west_of_obstacle() {
    let mut engine = reference_engine();
    engine.turn(TurnDirection::Right).await;
    engine.move_forward().await.unwrap();
    engine.turn(TurnDirection::Left).await;
    assert_eq!(engine.state().position, Position::new(0, 1));
    assert_eq!(engine.state().heading, Heading::East);

    assert_eq!(engine.move_forward().await, Err(MissionError::CollisionDetected));
    assert_eq!(engine.state().position, Position::new(0, 1));
    assert!(engine.detect_obstacle());
}

#[tokio::test]
async fn transmit_before_drill_fails_and_concludes() {
    let mut engine = reference_engine();
    let mut log = engine.subscribe_log();

    let program = Program::parse("transmit\nmove\nmove\n").unwrap();
    let report = run_program(&mut engine, &program).await;

    assert_eq!(report.phase, MissionPhase::MissionFailed);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Failed(MissionError::NoPayload));
    assert_eq!(report.skipped, 2);
    assert_eq!(engine.state().position, Position::new(0, 0));

    let mut errors = Vec::new();
    while let Ok(event) = log.try_recv() {
        if event.severity == Severity::Error {
            errors.push(event.message);
        }
    }
    assert_eq!(errors, vec!["Uplink failed: No data payload."]);
}

#[tokio::test]
async fn reset_restores_start_and_keeps_grid() {
    let mut engine = reference_engine();
    let grid_before = engine.grid().clone();

    let program = plan_route(engine.grid(), Position::new(0, 0), Heading::East).unwrap();
    run_program(&mut engine, &Program::new(program)).await;
    assert!(engine.state().sample_collected);
    assert!(engine.state().revealed_count() > 0);

    engine.reset();

    let state = engine.state();
    assert_eq!(state.position, Position::new(0, 0));
    assert_eq!(state.heading, Heading::East);
    assert!(!state.sample_collected);
    assert_eq!(state.revealed_count(), 0);
    assert_eq!(state.phase, MissionPhase::Exploring);
    assert_eq!(engine.grid(), &grid_before);
    assert_eq!(engine.grid().cell(Position::new(1, 1)), Some(CellKind::Obstacle));
    assert_eq!(engine.grid().cell(Position::new(4, 4)), Some(CellKind::Target));
}

#[tokio::test]
async fn analyze_at_target_reports_terrain() {
    let mut engine = reference_engine();
    let program = Program::parse(
        "move\nmove\nmove\nmove\nturn right\nmove\nmove\nmove\nmove\nanalyze\ndrill\ndrill\n",
    )
    .unwrap();
    let report = run_program(&mut engine, &program).await;

    assert_eq!(report.phase, MissionPhase::HoldingSample);
    let outcomes: Vec<Outcome> = report.results.iter().rev().take(3).map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Succeeded, Outcome::Succeeded, Outcome::Terrain(CellKind::Target)]);
    assert!(engine.state().is_revealed(Position::new(4, 4)));
}

#[tokio::test]
async fn autopilot_solves_configured_missions() {
    let config = MissionConfig::parse(
        r#"
        width = 6
        height = 4
        obstacles = [[1, 0], [1, 1], [3, 2], [3, 3], [4, 1]]
        target = [5, 3]
        heading = "North"
        "#,
    )
    .unwrap();
    let mut engine = Engine::from_config(&config, Instant).unwrap();
    let state = engine.state().clone();

    let actions = plan_route(engine.grid(), state.position, state.heading).unwrap();
    let report = run_program(&mut engine, &Program::new(actions)).await;

    assert_eq!(report.failures(), 0);
    assert_eq!(report.phase, MissionPhase::MissionComplete);
    assert_eq!(engine.state().position, Position::new(5, 3));
}

#[tokio::test]
async fn procedural_mission_is_solvable() {
    let config = MissionConfig {
        width: 10,
        height: 8,
        seed: Some(2024),
        timing: Timing::instant(),
        ..MissionConfig::default()
    };
    let mut engine = Engine::from_config(&config, Instant).unwrap();
    let state = engine.state().clone();

    let actions = plan_route(engine.grid(), state.position, state.heading).unwrap();
    let report = run_program(&mut engine, &Program::new(actions)).await;
    assert_eq!(report.phase, MissionPhase::MissionComplete);
}

#[tokio::test]
async fn bundled_demos_load_and_run() {
    let config = MissionConfig::load("demos/canyon.toml").unwrap();
    assert_eq!(config.timing.step_ms, 300);
    assert!(Engine::from_config(&config, Instant).is_ok());

    let program = Program::load("demos/reference.rover").unwrap();
    let mut engine = reference_engine();
    let report = run_program(&mut engine, &program).await;
    assert_eq!(report.phase, MissionPhase::MissionComplete);
}
