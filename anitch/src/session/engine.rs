//! Single owner of all session state
//!
//! [`Session`] is synchronous. Every entry point returns the [`Action`]s the
//! caller must perform (collaborator requests, timers, notifications), which
//! keeps it testable without a runtime.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::build_plan::{validate, BuildPlan, FileRecord};
use crate::collaborator::CollaboratorError;
use crate::config::AnitchConfig;
use crate::machine::{Applied, AppState, Effect, Interpreter, MachineEvent, Notification};
use crate::pipeline::{
    classify_plan, PipelineEvent, PipelineSimulator, ScheduledEvent, SimulatorStep, StageCommands,
};
use crate::session::types::{HistoryEntry, RequestToken, SceneObject, SessionSnapshot};

/// Work requested by the session
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    RequestBuildPlan {
        token: RequestToken,
        files: Vec<FileRecord>,
    },
    RequestOracle {
        token: RequestToken,
        query: String,
    },
    /// Deliver a pipeline event after its delay, replacing any pending one
    Schedule(ScheduledEvent),
    CancelPipelineTimer,
    /// Tick every `period`, tagging each tick with `generation`
    StartMeditation { period: Duration, generation: u64 },
    StopMeditation,
    Notify(Notification),
}

pub struct Session {
    interpreter: Interpreter,
    pipeline: PipelineSimulator,
    meditation_period: Duration,
    plan: Option<BuildPlan>,
    oracle_response: Option<String>,
    history: Vec<HistoryEntry>,
    scene: Vec<SceneObject>,
    request_generation: u64,
    meditation_generation: u64,
}

impl Session {
    pub fn new(config: &AnitchConfig) -> Self {
        Self {
            interpreter: Interpreter::new(config.coherence.initial, config.costs.clone()),
            pipeline: PipelineSimulator::new(&config.timing),
            meditation_period: config.timing.meditation_tick(),
            plan: None,
            oracle_response: None,
            history: Vec::new(),
            scene: Vec::new(),
            request_generation: 0,
            meditation_generation: 0,
        }
    }

    pub fn state(&self) -> AppState {
        self.interpreter.app_state()
    }

    pub fn coherence(&self) -> u8 {
        self.interpreter.coherence()
    }

    pub fn plan(&self) -> Option<&BuildPlan> {
        self.plan.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.interpreter.app_state(),
            coherence: self.interpreter.coherence(),
            bridge_connected: self.interpreter.bridge_connected(),
            stages: self.pipeline.views(),
            history: self.history.clone(),
            scene: self.scene.clone(),
            plan: self.plan.clone(),
            oracle_response: self.oracle_response.clone(),
        }
    }

    /// Record and interpret one command line
    pub fn submit_command(&mut self, raw: &str) -> Vec<Action> {
        self.history.push(HistoryEntry::now(raw));
        let (_, applied) = self.interpreter.submit(raw);
        self.process(applied)
    }

    /// Hand project files to the analysis step
    pub fn drop_files(&mut self, files: Vec<FileRecord>) -> Vec<Action> {
        let applied = self
            .interpreter
            .dispatch(&MachineEvent::FilesDropped { count: files.len() });
        let begins = applied
            .effects()
            .iter()
            .any(|e| matches!(e, Effect::BeginAnalysis { .. }));

        let mut actions = self.process(applied);
        if begins {
            let token = self.next_token();
            info!(files = files.len(), token = token.0, "requesting build plan");
            actions.push(Action::RequestBuildPlan { token, files });
        }
        actions
    }

    pub fn exit_meditation(&mut self) -> Vec<Action> {
        let applied = self.interpreter.dispatch(&MachineEvent::ExitMeditation);
        self.process(applied)
    }

    /// Back to idle from anywhere; discards plan, oracle text and pending work
    pub fn reset(&mut self) -> Vec<Action> {
        let applied = self.interpreter.dispatch(&MachineEvent::Reset);
        self.process(applied)
    }

    pub fn on_build_plan(
        &mut self,
        token: RequestToken,
        result: Result<Value, CollaboratorError>,
    ) -> Vec<Action> {
        if !self.is_current(token, AppState::Analyzing) {
            warn!(token = token.0, "discarding stale build plan result");
            return Vec::new();
        }

        let plan = result
            .map_err(|e| e.to_string())
            .and_then(|candidate| validate(&candidate).map_err(|e| e.to_string()));

        match plan {
            Ok(plan) => {
                let stages = classify_plan(&plan);
                self.accept_plan(plan, stages)
            }
            Err(reason) => {
                warn!(%reason, "analysis failed");
                let applied = self
                    .interpreter
                    .dispatch(&MachineEvent::AnalysisFailed { reason });
                self.process(applied)
            }
        }
    }

    /// Move to `analysis_complete` and arm the pipeline. An empty stage list
    /// leaves the session there: nothing starts and nothing completes.
    pub(super) fn accept_plan(
        &mut self,
        plan: BuildPlan,
        stages: Vec<StageCommands>,
    ) -> Vec<Action> {
        let applied = self.interpreter.dispatch(&MachineEvent::AnalysisSucceeded);
        let mut actions = self.process(applied);
        info!(project = %plan.project_name, stages = stages.len(), "build plan accepted");
        self.plan = Some(plan);

        match self.pipeline.arm(stages) {
            Some(start) => actions.push(Action::Schedule(start)),
            None => warn!("build plan has no stages; pipeline not started"),
        }
        actions
    }

    pub fn on_oracle_response(
        &mut self,
        token: RequestToken,
        result: Result<String, CollaboratorError>,
    ) -> Vec<Action> {
        if !self.is_current(token, AppState::ConsultingOracle) {
            warn!(token = token.0, "discarding stale oracle response");
            return Vec::new();
        }

        match result {
            Ok(text) => {
                let applied = self.interpreter.dispatch(&MachineEvent::OracleSucceeded);
                self.oracle_response = Some(text);
                self.process(applied)
            }
            Err(e) => {
                warn!(error = %e, "oracle consultation failed");
                let applied = self.interpreter.dispatch(&MachineEvent::OracleFailed {
                    reason: e.to_string(),
                });
                self.process(applied)
            }
        }
    }

    pub fn on_pipeline_event(&mut self, event: PipelineEvent) -> Vec<Action> {
        match self.pipeline.handle(event) {
            SimulatorStep::Stale => Vec::new(),
            SimulatorStep::Scheduled(next) => {
                let mut actions = Vec::new();
                if matches!(event, PipelineEvent::Start { .. }) {
                    let applied = self.interpreter.dispatch(&MachineEvent::PipelineStarted);
                    actions.extend(self.process(applied));
                }
                actions.push(Action::Schedule(next));
                actions
            }
            SimulatorStep::Completed => {
                let applied = self.interpreter.dispatch(&MachineEvent::PipelineCompleted);
                self.process(applied)
            }
        }
    }

    pub fn on_meditation_tick(&mut self, generation: u64) -> Vec<Action> {
        if generation != self.meditation_generation {
            debug!(
                generation,
                current = self.meditation_generation,
                "stale meditation tick discarded"
            );
            return Vec::new();
        }
        let applied = self.interpreter.dispatch(&MachineEvent::MeditationTick);
        self.process(applied)
    }

    fn next_token(&mut self) -> RequestToken {
        self.request_generation += 1;
        RequestToken(self.request_generation)
    }

    fn is_current(&self, token: RequestToken, awaiting: AppState) -> bool {
        token.0 == self.request_generation && self.interpreter.app_state() == awaiting
    }

    /// Turn an applied transition into session updates and actions
    fn process(&mut self, applied: Applied) -> Vec<Action> {
        let mut actions = Vec::new();

        for effect in applied.effects() {
            match effect {
                Effect::ObjectManifested { shape } => self.scene.push(SceneObject::new(*shape)),
                Effect::MeditationStarted => {
                    self.meditation_generation += 1;
                    actions.push(Action::StartMeditation {
                        period: self.meditation_period,
                        generation: self.meditation_generation,
                    });
                }
                Effect::BeginOracle { query } => {
                    let token = self.next_token();
                    info!(token = token.0, "consulting oracle");
                    actions.push(Action::RequestOracle {
                        token,
                        query: query.clone(),
                    });
                }
                Effect::SessionReset => {
                    self.plan = None;
                    self.oracle_response = None;
                }
                _ => {}
            }
            if let Some(notification) = effect.notification() {
                actions.push(Action::Notify(notification));
            }
        }

        let next = applied.transition.next_state.app_state;
        match applied.exited() {
            Some(AppState::Restoring) => {
                self.meditation_generation += 1;
                actions.push(Action::StopMeditation);
            }
            Some(AppState::DisplayingOracleResponse) => self.oracle_response = None,
            Some(AppState::Analyzing | AppState::ConsultingOracle) => {
                // whatever was in flight is no longer wanted
                self.request_generation += 1;
            }
            _ => {}
        }

        if !next.is_build_flow() {
            self.plan = None;
            if self.pipeline.is_armed() {
                self.pipeline.disarm();
                actions.push(Action::CancelPipelineTimer);
            }
        }

        actions
    }
}
