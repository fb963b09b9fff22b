//! Session
//!
//! [`Session`] wires the interpreter, the pipeline simulator, command
//! history, scene objects and collaborator request tokens together.
//! [`spawn_session`] runs it as a tokio actor behind a [`SessionHandle`].

pub mod engine;
pub mod runtime;
pub mod types;

pub use engine::{Action, Session};
pub use runtime::{spawn_session, SessionHandle};
pub use types::{HistoryEntry, RequestToken, SceneObject, SessionSnapshot};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_plan::FileRecord;
    use crate::collaborator::CollaboratorError;
    use crate::config::AnitchConfig;
    use crate::machine::AppState;
    use crate::pipeline::{PipelineEvent, StageStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plan_json() -> serde_json::Value {
        json!({
            "projectName": "weather-app",
            "language": "Python",
            "dependencies": ["flask"],
            "buildTool": "pip",
            "buildCommands": ["pip install -r requirements.txt", "python -m venv venv"],
            "runCommand": "python app.py",
            "analysisSummary": "Flask service."
        })
    }

    fn files() -> Vec<FileRecord> {
        vec![FileRecord::new("requirements.txt", "flask")]
    }

    fn build_token(actions: &[Action]) -> RequestToken {
        actions
            .iter()
            .find_map(|a| match a {
                Action::RequestBuildPlan { token, .. } => Some(*token),
                _ => None,
            })
            .expect("build plan request")
    }

    fn oracle_token(actions: &[Action]) -> RequestToken {
        actions
            .iter()
            .find_map(|a| match a {
                Action::RequestOracle { token, .. } => Some(*token),
                _ => None,
            })
            .expect("oracle request")
    }

    fn meditation_generation(actions: &[Action]) -> u64 {
        actions
            .iter()
            .find_map(|a| match a {
                Action::StartMeditation { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("meditation start")
    }

    fn scheduled(actions: &[Action]) -> Option<PipelineEvent> {
        actions.iter().find_map(|a| match a {
            Action::Schedule(s) => Some(s.event),
            _ => None,
        })
    }

    #[test]
    fn test_full_build_flow() {
        let mut session = Session::new(&AnitchConfig::default());
        session.submit_command("analyze project");
        let token = build_token(&session.drop_files(files()));
        assert_eq!(session.state(), AppState::Analyzing);

        let actions = session.on_build_plan(token, Ok(plan_json()));
        assert_eq!(session.state(), AppState::AnalysisComplete);
        assert_eq!(session.snapshot().stages.len(), 3);

        let mut next = scheduled(&actions);
        let mut steps = 0;
        while let Some(event) = next {
            next = scheduled(&session.on_pipeline_event(event));
            steps += 1;
            if steps == 1 {
                assert_eq!(session.state(), AppState::ExecutingPipeline);
            }
        }

        // start + three advances
        assert_eq!(steps, 4);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, AppState::BuildComplete);
        assert_eq!(snapshot.coherence, 30);
        assert!(snapshot
            .stages
            .iter()
            .all(|s| s.status == StageStatus::Completed));
        assert_eq!(snapshot.plan.unwrap().project_name, "weather-app");
    }

    #[test]
    fn test_stale_build_plan_after_reset_is_discarded() {
        let mut session = Session::new(&AnitchConfig::default());
        session.submit_command("analyze");
        let token = build_token(&session.drop_files(files()));
        session.reset();
        assert_eq!(session.coherence(), 80);

        let actions = session.on_build_plan(token, Ok(plan_json()));
        assert!(actions.is_empty());
        assert_eq!(session.state(), AppState::Idle);
        assert_eq!(session.coherence(), 80);
        assert!(session.plan().is_none());
    }

    #[test]
    fn test_invalid_plan_fails_analysis() {
        let mut session = Session::new(&AnitchConfig::default());
        session.submit_command("analyze");
        let token = build_token(&session.drop_files(files()));

        let mut candidate = plan_json();
        candidate["runCommand"] = json!("   ");
        let actions = session.on_build_plan(token, Ok(candidate));

        assert_eq!(session.state(), AppState::Idle);
        assert_eq!(session.coherence(), 55);
        assert!(session.snapshot().stages.is_empty());
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::Notify(n) if n.title == "Analysis Failed"
        )));
    }

    #[test]
    fn test_oracle_failure_returns_to_idle_without_text() {
        let mut session = Session::new(&AnitchConfig::default());
        let token = oracle_token(&session.submit_command("ask what is coherence"));
        assert_eq!(session.coherence(), 90);

        session.on_oracle_response(token, Err(CollaboratorError::Unavailable("down".into())));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, AppState::Idle);
        assert_eq!(snapshot.coherence, 75);
        assert_eq!(snapshot.oracle_response, None);
    }

    #[test]
    fn test_oracle_answer_shown_until_state_changes() {
        let mut session = Session::new(&AnitchConfig::default());
        let token = oracle_token(&session.submit_command("gemini hello"));
        session.on_oracle_response(token, Ok("hi there".into()));
        assert_eq!(session.state(), AppState::DisplayingOracleResponse);
        assert_eq!(session.snapshot().oracle_response.as_deref(), Some("hi there"));

        session.reset();
        assert_eq!(session.snapshot().oracle_response, None);
    }

    #[test]
    fn test_meditation_timer_lifecycle() {
        let mut session = Session::new(&AnitchConfig {
            coherence: crate::config::CoherenceConfig { initial: 40 },
            ..Default::default()
        });
        let actions = session.submit_command("meditate");
        let generation = meditation_generation(&actions);
        session.on_meditation_tick(generation);
        session.on_meditation_tick(generation);
        assert_eq!(session.coherence(), 44);

        let actions = session.exit_meditation();
        assert!(actions.contains(&Action::StopMeditation));
        session.on_meditation_tick(generation);
        assert_eq!(session.coherence(), 44);
    }

    #[test]
    fn test_tick_from_previous_meditation_is_ignored() {
        let mut session = Session::new(&AnitchConfig {
            coherence: crate::config::CoherenceConfig { initial: 40 },
            ..Default::default()
        });
        let first = meditation_generation(&session.submit_command("meditate"));
        session.exit_meditation();
        let second = meditation_generation(&session.submit_command("meditate"));
        assert_ne!(first, second);

        // tick queued before the first meditation was stopped
        assert!(session.on_meditation_tick(first).is_empty());
        assert_eq!(session.coherence(), 40);

        session.on_meditation_tick(second);
        assert_eq!(session.coherence(), 42);
    }

    #[test]
    fn test_stale_oracle_response_after_reset_is_discarded() {
        let mut session = Session::new(&AnitchConfig::default());
        let token = oracle_token(&session.submit_command("ask what is coherence"));
        session.reset();
        assert_eq!(session.coherence(), 90);

        assert!(session.on_oracle_response(token, Ok("too late".into())).is_empty());
        assert!(session
            .on_oracle_response(token, Err(CollaboratorError::Unavailable("down".into())))
            .is_empty());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, AppState::Idle);
        assert_eq!(snapshot.coherence, 90);
        assert_eq!(snapshot.oracle_response, None);
    }

    #[test]
    fn test_stale_oracle_response_after_meditate_is_discarded() {
        let mut session = Session::new(&AnitchConfig::default());
        let token = oracle_token(&session.submit_command("gemini are you there"));
        session.submit_command("meditate");
        assert_eq!(session.state(), AppState::Restoring);

        assert!(session.on_oracle_response(token, Ok("yes".into())).is_empty());
        assert_eq!(session.state(), AppState::Restoring);
        assert_eq!(session.coherence(), 90);
        assert_eq!(session.snapshot().oracle_response, None);
    }

    #[test]
    fn test_plan_without_stages_stays_analysis_complete() {
        let mut session = Session::new(&AnitchConfig::default());
        session.submit_command("analyze");
        session.drop_files(files());
        let before = session.coherence();

        let plan = crate::build_plan::validate(&plan_json()).unwrap();
        let actions = session.accept_plan(plan, Vec::new());

        assert_eq!(session.state(), AppState::AnalysisComplete);
        assert_eq!(session.coherence(), before - 20);
        assert!(scheduled(&actions).is_none());
        assert!(!actions.iter().any(|a| matches!(
            a,
            Action::Notify(n) if n.title == "Build Simulation Complete"
        )));
        assert!(session.snapshot().stages.is_empty());
        assert!(session.plan().is_some());
    }

    #[test]
    fn test_manifest_adds_scene_objects_and_history() {
        let mut session = Session::new(&AnitchConfig::default());
        session.submit_command("manifest a pyramid");
        session.submit_command("Manifest a cube");
        session.submit_command("hello?");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.scene.len(), 2);
        assert_ne!(snapshot.scene[0].id, snapshot.scene[1].id);
        assert_eq!(snapshot.coherence, 55);
        let commands: Vec<_> = snapshot.history.iter().map(|h| h.command.as_str()).collect();
        assert_eq!(commands, vec!["manifest a pyramid", "Manifest a cube", "hello?"]);
        assert!(snapshot.history[0].timestamp <= snapshot.history[2].timestamp);
    }

    #[test]
    fn test_reset_mid_pipeline_cancels_timer() {
        let mut session = Session::new(&AnitchConfig::default());
        session.submit_command("build");
        let token = build_token(&session.drop_files(files()));
        let start = scheduled(&session.on_build_plan(token, Ok(plan_json()))).unwrap();
        session.on_pipeline_event(start);

        let actions = session.reset();
        assert!(actions.contains(&Action::CancelPipelineTimer));
        assert!(session.snapshot().stages.is_empty());
        assert!(session.on_pipeline_event(start).is_empty());
    }
}
