//! Timed replay of classified stages
//!
//! The simulator never sleeps. It hands out [`ScheduledEvent`]s tagged with
//! the current generation and the caller delivers them back after the
//! requested delay. Arming or disarming bumps the generation, so events from
//! an earlier plan come back as [`SimulatorStep::Stale`].

use std::time::Duration;

use tracing::debug;

use crate::config::TimingConfig;
use crate::pipeline::types::{StageCommands, StageStatus, StageView};

/// Timer events understood by [`PipelineSimulator::handle`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Put the cursor on the first stage
    Start { generation: u64 },
    /// Finish the running stage and move on
    Advance { generation: u64 },
}

impl PipelineEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PipelineEvent::Start { generation } | PipelineEvent::Advance { generation } => {
                *generation
            }
        }
    }
}

/// An event to deliver after `delay`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub delay: Duration,
    pub event: PipelineEvent,
}

/// What handling an event produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulatorStep {
    /// Event belongs to an older plan, or arrived after completion
    Stale,
    /// Cursor moved and another event is due
    Scheduled(ScheduledEvent),
    /// The last stage finished. Reported once per armed plan.
    Completed,
}

#[derive(Clone, Debug)]
pub struct PipelineSimulator {
    stages: Vec<StageCommands>,
    /// -1 before start, `stages.len()` when done
    cursor: i32,
    generation: u64,
    completed: bool,
    start_delay: Duration,
    dwell: Duration,
}

impl PipelineSimulator {
    pub fn new(timing: &TimingConfig) -> Self {
        Self::with_intervals(timing.plan_start_delay(), timing.stage_dwell())
    }

    pub fn with_intervals(start_delay: Duration, dwell: Duration) -> Self {
        Self {
            stages: Vec::new(),
            cursor: -1,
            generation: 0,
            completed: false,
            start_delay,
            dwell,
        }
    }

    /// Load a new plan. Returns the start event unless there is nothing to run.
    pub fn arm(&mut self, stages: Vec<StageCommands>) -> Option<ScheduledEvent> {
        self.generation += 1;
        self.cursor = -1;
        self.completed = false;
        self.stages = stages;
        debug!(
            generation = self.generation,
            stages = self.stages.len(),
            "pipeline armed"
        );

        if self.stages.is_empty() {
            return None;
        }
        Some(ScheduledEvent {
            delay: self.start_delay,
            event: PipelineEvent::Start {
                generation: self.generation,
            },
        })
    }

    /// Drop the current plan and invalidate every outstanding event
    pub fn disarm(&mut self) {
        self.generation += 1;
        self.cursor = -1;
        self.completed = false;
        self.stages.clear();
    }

    pub fn handle(&mut self, event: PipelineEvent) -> SimulatorStep {
        if event.generation() != self.generation || self.completed {
            debug!(
                event_generation = event.generation(),
                generation = self.generation,
                "stale pipeline event discarded"
            );
            return SimulatorStep::Stale;
        }

        match event {
            PipelineEvent::Start { .. } if self.cursor == -1 && !self.stages.is_empty() => {
                self.cursor = 0;
            }
            PipelineEvent::Advance { .. } if self.cursor >= 0 => {
                self.cursor += 1;
            }
            _ => return SimulatorStep::Stale,
        }

        if self.cursor as usize >= self.stages.len() {
            self.completed = true;
            debug!(generation = self.generation, "pipeline completed");
            return SimulatorStep::Completed;
        }

        debug!(
            stage = %self.stages[self.cursor as usize].stage,
            "pipeline stage running"
        );
        SimulatorStep::Scheduled(ScheduledEvent {
            delay: self.dwell,
            event: PipelineEvent::Advance {
                generation: self.generation,
            },
        })
    }

    pub fn cursor(&self) -> i32 {
        self.cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn is_armed(&self) -> bool {
        !self.stages.is_empty()
    }

    pub fn stages(&self) -> &[StageCommands] {
        &self.stages
    }

    /// Status per stage, derived from the cursor alone
    pub fn statuses(&self) -> Vec<StageStatus> {
        (0..self.stages.len() as i32)
            .map(|i| {
                if i < self.cursor {
                    StageStatus::Completed
                } else if i == self.cursor {
                    StageStatus::Running
                } else {
                    StageStatus::Pending
                }
            })
            .collect()
    }

    pub fn views(&self) -> Vec<StageView> {
        self.stages
            .iter()
            .zip(self.statuses())
            .map(|(s, status)| StageView {
                stage: s.stage,
                commands: s.commands.clone(),
                status,
            })
            .collect()
    }
}
