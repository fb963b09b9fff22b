//! Actor runtime around [`Session`]
//!
//! One task owns the session and handles one message at a time, so no two
//! interpretations ever overlap. Collaborator calls and timers run as side
//! tasks that report back through an internal channel; their results are
//! checked against the session's request token or pipeline generation.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::build_plan::FileRecord;
use crate::collaborator::{Collaborator, CollaboratorError};
use crate::config::AnitchConfig;
use crate::error::{AnitchError, AnitchResult};
use crate::machine::Notification;
use crate::pipeline::{PipelineEvent, ScheduledEvent};
use crate::session::engine::{Action, Session};
use crate::session::types::{RequestToken, SessionSnapshot};

const COMMAND_BUFFER: usize = 64;
const NOTIFICATION_BUFFER: usize = 128;

enum Command {
    Submit(String),
    DropFiles(Vec<FileRecord>),
    ExitMeditation,
    Reset,
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

enum Internal {
    BuildPlan {
        token: RequestToken,
        result: Result<Value, CollaboratorError>,
    },
    Oracle {
        token: RequestToken,
        result: Result<String, CollaboratorError>,
    },
    Pipeline(PipelineEvent),
    MeditationTick { generation: u64 },
}

/// Cloneable front door to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    notifications: broadcast::Sender<Notification>,
}

impl SessionHandle {
    async fn send(&self, command: Command) -> AnitchResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AnitchError::SessionClosed)
    }

    pub async fn submit_command(&self, raw: impl Into<String>) -> AnitchResult<()> {
        self.send(Command::Submit(raw.into())).await
    }

    pub async fn drop_files(&self, files: Vec<FileRecord>) -> AnitchResult<()> {
        self.send(Command::DropFiles(files)).await
    }

    pub async fn exit_meditation(&self) -> AnitchResult<()> {
        self.send(Command::ExitMeditation).await
    }

    pub async fn reset(&self) -> AnitchResult<()> {
        self.send(Command::Reset).await
    }

    /// Current snapshot, taken after every previously sent command was handled
    pub async fn snapshot(&self) -> AnitchResult<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| AnitchError::SessionClosed)
    }

    /// Snapshot stream, updated after every handled message
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Stop the actor and every timer it owns
    pub async fn shutdown(&self) -> AnitchResult<()> {
        self.send(Command::Shutdown).await
    }
}

/// Start a session actor on the current tokio runtime
pub fn spawn_session(config: AnitchConfig, collaborator: Arc<dyn Collaborator>) -> SessionHandle {
    let session = Session::new(&config);
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (internal_tx, internal_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let (notification_tx, _) = broadcast::channel(NOTIFICATION_BUFFER);

    let actor = SessionActor {
        session,
        collaborator,
        internal_tx,
        snapshots: snapshot_tx,
        notifications: notification_tx.clone(),
        pipeline_timer: None,
        meditation_timer: None,
        requests: Vec::new(),
    };
    tokio::spawn(actor.run(command_rx, internal_rx));

    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        notifications: notification_tx,
    }
}

struct SessionActor {
    session: Session,
    collaborator: Arc<dyn Collaborator>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    snapshots: watch::Sender<SessionSnapshot>,
    notifications: broadcast::Sender<Notification>,
    pipeline_timer: Option<JoinHandle<()>>,
    meditation_timer: Option<JoinHandle<()>>,
    requests: Vec<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) {
        info!(provider = self.collaborator.name(), "session started");
        loop {
            let actions = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(message) = internal.recv() => self.handle_internal(message),
            };
            self.perform(actions);
            self.snapshots.send_replace(self.session.snapshot());
        }
        self.stop_all();
        info!("session stopped");
    }

    fn handle_command(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::Submit(raw) => self.session.submit_command(&raw),
            Command::DropFiles(files) => self.session.drop_files(files),
            Command::ExitMeditation => self.session.exit_meditation(),
            Command::Reset => self.session.reset(),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.session.snapshot());
                Vec::new()
            }
            Command::Shutdown => Vec::new(),
        }
    }

    fn handle_internal(&mut self, message: Internal) -> Vec<Action> {
        match message {
            Internal::BuildPlan { token, result } => self.session.on_build_plan(token, result),
            Internal::Oracle { token, result } => self.session.on_oracle_response(token, result),
            Internal::Pipeline(event) => self.session.on_pipeline_event(event),
            Internal::MeditationTick { generation } => self.session.on_meditation_tick(generation),
        }
    }

    fn perform(&mut self, actions: Vec<Action>) {
        self.requests.retain(|task| !task.is_finished());

        for action in actions {
            match action {
                Action::RequestBuildPlan { token, files } => {
                    let collaborator = Arc::clone(&self.collaborator);
                    let tx = self.internal_tx.clone();
                    self.requests.push(tokio::spawn(async move {
                        let result = collaborator.generate_build_plan(&files).await;
                        let _ = tx.send(Internal::BuildPlan { token, result });
                    }));
                }
                Action::RequestOracle { token, query } => {
                    let collaborator = Arc::clone(&self.collaborator);
                    let tx = self.internal_tx.clone();
                    self.requests.push(tokio::spawn(async move {
                        let result = collaborator.consult_oracle(&query).await;
                        let _ = tx.send(Internal::Oracle { token, result });
                    }));
                }
                Action::Schedule(scheduled) => self.schedule(scheduled),
                Action::CancelPipelineTimer => {
                    if let Some(timer) = self.pipeline_timer.take() {
                        debug!("pipeline timer aborted");
                        timer.abort();
                    }
                }
                Action::StartMeditation { period, generation } => {
                    self.start_meditation(period, generation)
                }
                Action::StopMeditation => {
                    if let Some(timer) = self.meditation_timer.take() {
                        debug!("meditation timer aborted");
                        timer.abort();
                    }
                }
                Action::Notify(notification) => {
                    // no subscribers is fine
                    let _ = self.notifications.send(notification);
                }
            }
        }
    }

    fn schedule(&mut self, scheduled: ScheduledEvent) {
        if let Some(previous) = self.pipeline_timer.take() {
            previous.abort();
        }
        let tx = self.internal_tx.clone();
        self.pipeline_timer = Some(tokio::spawn(async move {
            sleep(scheduled.delay).await;
            let _ = tx.send(Internal::Pipeline(scheduled.event));
        }));
    }

    fn start_meditation(&mut self, period: Duration, generation: u64) {
        if let Some(previous) = self.meditation_timer.take() {
            previous.abort();
        }
        let tx = self.internal_tx.clone();
        self.meditation_timer = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(Internal::MeditationTick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_all(&mut self) {
        for timer in [self.pipeline_timer.take(), self.meditation_timer.take()]
            .into_iter()
            .flatten()
        {
            timer.abort();
        }
        for request in self.requests.drain(..) {
            request.abort();
        }
    }
}
