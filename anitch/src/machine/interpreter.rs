//! Pure transition functions and the [`Interpreter`] that applies them

use tracing::{debug, info};

use crate::command::{self, Intent, IntentKind};
use crate::config::CostTable;
use crate::ledger::{CoherenceLedger, LedgerEntry};
use crate::machine::effects::Effect;
use crate::machine::events::MachineEvent;
use crate::machine::state::{AppState, MachineState};

/// Result of interpreting one intent or event. Nothing is applied yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next_state: MachineState,
    pub resource_delta: i32,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Leave everything as it is
    pub fn unchanged(state: &MachineState) -> Self {
        Self {
            next_state: *state,
            resource_delta: 0,
            effects: Vec::new(),
        }
    }

    fn to(next_state: MachineState, resource_delta: i32, effects: Vec<Effect>) -> Self {
        Self {
            next_state,
            resource_delta,
            effects,
        }
    }

    fn rejected(state: &MachineState, effect: Effect) -> Self {
        Self::to(*state, 0, vec![effect])
    }

    fn ignored(state: &MachineState, action: &str) -> Self {
        Self::rejected(
            state,
            Effect::IgnoredInState {
                action: action.to_string(),
                state: state.app_state,
            },
        )
    }

    /// No state change, no delta and nothing to report
    pub fn is_noop(&self, from: &MachineState) -> bool {
        self.next_state == *from && self.resource_delta == 0 && self.effects.is_empty()
    }
}

/// Check the current coherence against a positive cost
fn gate(action: &str, cost: u8, coherence: u8) -> Option<Effect> {
    let ledger = CoherenceLedger::new(coherence as i64);
    let delta = -(cost as i32);
    if ledger.can_afford(delta) {
        return None;
    }
    Some(Effect::InsufficientCoherence {
        action: action.to_string(),
        required: cost,
        available: coherence,
        shortfall: ledger.shortfall(delta),
    })
}

/// Decide what a command does in the given state
pub fn interpret(
    intent: &Intent,
    state: &MachineState,
    coherence: u8,
    costs: &CostTable,
) -> Transition {
    let current = state.app_state;

    match &intent.kind {
        IntentKind::Analyze => {
            let action = "analyze the project";
            if current != AppState::Idle {
                return Transition::ignored(state, action);
            }
            if let Some(effect) = gate(action, costs.analyze, coherence) {
                return Transition::rejected(state, effect);
            }
            Transition::to(
                state.with_state(AppState::AwaitingInput),
                -(costs.analyze as i32),
                vec![Effect::AnalysisRequested],
            )
        }
        IntentKind::ManifestObject(shape) => {
            let action = format!("manifest a {}", shape);
            if !current.is_interactive() {
                return Transition::ignored(state, &action);
            }
            let cost = costs.manifest.cost_for(*shape);
            if let Some(effect) = gate(&action, cost, coherence) {
                return Transition::rejected(state, effect);
            }
            Transition::to(
                *state,
                -(cost as i32),
                vec![Effect::ObjectManifested { shape: *shape }],
            )
        }
        IntentKind::ConsultOracle(query) => {
            let action = "consult the oracle";
            if !matches!(
                current,
                AppState::Idle | AppState::DisplayingOracleResponse
            ) {
                return Transition::ignored(state, action);
            }
            if let Some(effect) = gate(action, costs.consult_oracle, coherence) {
                return Transition::rejected(state, effect);
            }
            Transition::to(
                state.with_state(AppState::ConsultingOracle),
                -(costs.consult_oracle as i32),
                vec![Effect::BeginOracle {
                    query: query.clone(),
                }],
            )
        }
        IntentKind::ToggleBridge if state.bridge_connected => Transition::to(
            MachineState::new(current, false),
            0,
            vec![Effect::BridgeDisconnected],
        ),
        IntentKind::ToggleBridge => {
            let action = "establish a bridge";
            if !matches!(current, AppState::Idle | AppState::Restoring) {
                return Transition::ignored(state, action);
            }
            if let Some(effect) = gate(action, costs.bridge_connect, coherence) {
                return Transition::rejected(state, effect);
            }
            Transition::to(
                MachineState::new(current, true),
                -(costs.bridge_connect as i32),
                vec![Effect::BridgeConnected],
            )
        }
        IntentKind::Meditate => {
            if current == AppState::Restoring {
                return Transition::unchanged(state);
            }
            if current.is_build_flow() {
                return Transition::ignored(state, "meditate");
            }
            Transition::to(
                state.with_state(AppState::Restoring),
                0,
                vec![Effect::MeditationStarted],
            )
        }
        IntentKind::Unknown => Transition::to(
            *state,
            -(costs.unknown_command as i32),
            vec![Effect::UnknownCommand {
                raw: intent.raw.clone(),
            }],
        ),
    }
}

/// Decide what a machine event does in the given state.
///
/// Events that are not legal in `state` produce an unchanged transition.
pub fn transition(event: &MachineEvent, state: &MachineState, costs: &CostTable) -> Transition {
    use AppState::*;

    let current = state.app_state;
    match (event, current) {
        (MachineEvent::FilesDropped { count }, AwaitingInput) if *count > 0 => Transition::to(
            state.with_state(Analyzing),
            -(costs.file_processing as i32),
            vec![Effect::BeginAnalysis { file_count: *count }],
        ),
        (MachineEvent::AnalysisSucceeded, Analyzing) => Transition::to(
            state.with_state(AnalysisComplete),
            -(costs.analysis_success as i32),
            vec![Effect::AnalysisComplete],
        ),
        (MachineEvent::AnalysisFailed { reason }, Analyzing) => Transition::to(
            state.with_state(Idle),
            -(costs.analysis_failure_penalty as i32),
            vec![Effect::AnalysisFailed {
                reason: reason.clone(),
            }],
        ),
        (MachineEvent::PipelineStarted, AnalysisComplete) => Transition::to(
            state.with_state(ExecutingPipeline),
            0,
            vec![Effect::PipelineStarted],
        ),
        (MachineEvent::PipelineCompleted, ExecutingPipeline) => Transition::to(
            state.with_state(BuildComplete),
            -(costs.build_complete as i32),
            vec![Effect::BuildComplete],
        ),
        (MachineEvent::OracleSucceeded, ConsultingOracle) => Transition::to(
            state.with_state(DisplayingOracleResponse),
            0,
            vec![Effect::OracleAnswered],
        ),
        (MachineEvent::OracleFailed { reason }, ConsultingOracle) => Transition::to(
            state.with_state(Idle),
            -(costs.oracle_failure_penalty as i32),
            vec![Effect::OracleFailed {
                reason: reason.clone(),
            }],
        ),
        (MachineEvent::MeditationTick, Restoring) => {
            Transition::to(*state, costs.meditation_restore as i32, Vec::new())
        }
        (MachineEvent::ExitMeditation, Restoring) => Transition::to(
            state.with_state(Idle),
            0,
            vec![Effect::MeditationEnded],
        ),
        (MachineEvent::Reset, _) => {
            let mut effects = Vec::new();
            if state.bridge_connected {
                effects.push(Effect::BridgeDisconnected);
            }
            effects.push(Effect::SessionReset);
            Transition::to(MachineState::default(), 0, effects)
        }
        _ => Transition::unchanged(state),
    }
}

/// A transition after it has been applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub previous: MachineState,
    pub transition: Transition,
    pub ledger: LedgerEntry,
}

impl Applied {
    pub fn state_changed(&self) -> bool {
        self.previous.app_state != self.transition.next_state.app_state
    }

    /// The application state that was exited, if any
    pub fn exited(&self) -> Option<AppState> {
        self.state_changed().then_some(self.previous.app_state)
    }

    pub fn effects(&self) -> &[Effect] {
        &self.transition.effects
    }
}

/// Owner of the machine state and the coherence ledger
#[derive(Clone, Debug)]
pub struct Interpreter {
    state: MachineState,
    ledger: CoherenceLedger,
    costs: CostTable,
}

impl Interpreter {
    pub fn new(initial_coherence: u8, costs: CostTable) -> Self {
        Self {
            state: MachineState::default(),
            ledger: CoherenceLedger::new(initial_coherence as i64),
            costs,
        }
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn app_state(&self) -> AppState {
        self.state.app_state
    }

    pub fn bridge_connected(&self) -> bool {
        self.state.bridge_connected
    }

    pub fn coherence(&self) -> u8 {
        self.ledger.value()
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    /// Parse and interpret a raw command, then apply the result
    pub fn submit(&mut self, raw: &str) -> (Intent, Applied) {
        let intent = command::parse(raw);
        let applied = self.handle_intent(&intent);
        (intent, applied)
    }

    /// Interpret an already parsed intent and apply the result
    pub fn handle_intent(&mut self, intent: &Intent) -> Applied {
        let transition = interpret(intent, &self.state, self.ledger.value(), &self.costs);
        debug!(intent = intent.kind.label(), "intent interpreted");
        self.apply(transition)
    }

    /// Feed a machine event and apply the result
    pub fn dispatch(&mut self, event: &MachineEvent) -> Applied {
        let transition = transition(event, &self.state, &self.costs);
        if transition.is_noop(&self.state) {
            debug!(
                event = event.label(),
                state = %self.state.app_state,
                "event not applicable in current state"
            );
        }
        self.apply(transition)
    }

    fn apply(&mut self, transition: Transition) -> Applied {
        let previous = self.state;
        let ledger = self.ledger.apply_entry(transition.resource_delta);
        self.state = transition.next_state;

        if previous.app_state != self.state.app_state {
            info!(
                from = %previous.app_state,
                to = %self.state.app_state,
                coherence = ledger.after,
                "state transition"
            );
        }
        if previous.bridge_connected != self.state.bridge_connected {
            info!(connected = self.state.bridge_connected, "bridge toggled");
        }

        Applied {
            previous,
            transition,
            ledger,
        }
    }
}
