//! End-to-end scenarios against the synchronous public API

use anitch::machine::Effect;
use anitch::pipeline::{PipelineEvent, SimulatorStep, StageCommands};
use anitch::session::Action;
use anitch::{
    classify_plan, validate, AnitchConfig, AppState, FileRecord, Interpreter, PipelineSimulator,
    PipelineStage, Session, StageStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_analyze_from_full_coherence() {
    let config = AnitchConfig::default();
    let mut interpreter = Interpreter::new(100, config.costs);
    interpreter.submit("analyze project");
    assert_eq!(interpreter.coherence(), 85);
    assert_eq!(interpreter.app_state(), AppState::AwaitingInput);
}

#[test]
fn test_manifest_with_five_coherence_is_refused() {
    let config = AnitchConfig::default();
    let mut interpreter = Interpreter::new(5, config.costs);
    let (_, applied) = interpreter.submit("manifest a cube");

    assert_eq!(interpreter.coherence(), 5);
    assert_eq!(interpreter.app_state(), AppState::Idle);
    match applied.effects() {
        [Effect::InsufficientCoherence { shortfall, .. }] => assert_eq!(*shortfall, 15),
        other => panic!("unexpected effects {:?}", other),
    }
}

#[test]
fn test_plan_without_build_stage() {
    let plan = validate(&json!({
        "projectName": "p",
        "language": "Python",
        "dependencies": [],
        "buildTool": "pip",
        "buildCommands": ["pip install -r requirements.txt", "python -m venv venv"],
        "runCommand": "python app.py",
        "analysisSummary": ""
    }))
    .unwrap();

    let stages = classify_plan(&plan);
    let summary: Vec<(PipelineStage, Vec<String>)> = stages
        .into_iter()
        .map(|StageCommands { stage, commands }| (stage, commands))
        .collect();
    assert_eq!(
        summary,
        vec![
            (PipelineStage::Setup, vec!["python -m venv venv".to_string()]),
            (
                PipelineStage::Dependencies,
                vec!["pip install -r requirements.txt".to_string()]
            ),
            (PipelineStage::Run, vec!["python app.py".to_string()]),
        ]
    );
}

#[test]
fn test_three_stage_pipeline_completes_once() {
    let mut simulator =
        PipelineSimulator::with_intervals(Duration::from_millis(500), Duration::from_millis(2500));
    let stages: Vec<StageCommands> = [PipelineStage::Setup, PipelineStage::Build, PipelineStage::Run]
        .into_iter()
        .map(|stage| StageCommands {
            stage,
            commands: vec!["step".to_string()],
        })
        .collect();

    let start = simulator.arm(stages).unwrap();
    let mut event = start.event;
    let mut completions = 0;
    for _ in 0..4 {
        match simulator.handle(event) {
            SimulatorStep::Scheduled(next) => event = next.event,
            SimulatorStep::Completed => completions += 1,
            SimulatorStep::Stale => panic!("unexpected stale event"),
        }
    }
    assert_eq!(simulator.handle(PipelineEvent::Advance { generation: simulator.generation() }), SimulatorStep::Stale);

    assert_eq!(simulator.cursor(), 3);
    assert_eq!(completions, 1);
    let statuses = simulator.statuses();
    assert_eq!(statuses.iter().filter(|s| **s == StageStatus::Completed).count(), 3);
    assert_eq!(statuses.iter().filter(|s| **s == StageStatus::Running).count(), 0);
}

#[test]
fn test_oracle_failure_costs_penalty_and_shows_nothing() {
    let mut session = Session::new(&AnitchConfig::default());
    let actions = session.submit_command("ask what lies beyond");
    let token = actions
        .iter()
        .find_map(|a| match a {
            Action::RequestOracle { token, .. } => Some(*token),
            _ => None,
        })
        .unwrap();
    let before = session.coherence();

    session.on_oracle_response(
        token,
        Err(anitch::CollaboratorError::Unavailable("timeout".to_string())),
    );

    let snapshot = session.snapshot();
    assert_eq!(before - snapshot.coherence, 15);
    assert_eq!(snapshot.state, AppState::Idle);
    assert!(snapshot.oracle_response.is_none());
}

#[test]
fn test_files_dropped_outside_analysis_are_ignored() {
    let mut session = Session::new(&AnitchConfig::default());
    let actions = session.drop_files(vec![FileRecord::new("main.py", "print(1)")]);
    assert!(actions.is_empty());
    assert_eq!(session.state(), AppState::Idle);
    assert_eq!(session.coherence(), 100);
}
