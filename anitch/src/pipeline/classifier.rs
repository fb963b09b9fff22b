//! Command → stage classification

use crate::build_plan::BuildPlan;
use crate::pipeline::types::{PipelineStage, StageCommands};

const SETUP_MARKERS: &[&str] = &["venv", "virtualenv", "source"];
const DEPENDENCY_MARKERS: &[&str] = &["install"];
const BUILD_MARKERS: &[&str] = &["build", "make", "py2app", "bdist", "webpack"];

fn mentions(command: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| command.contains(m))
}

/// Assign a command to a stage. Case-insensitive; the first matching marker
/// group in stage order wins and everything else runs in `Run`.
pub fn classify(command: &str) -> PipelineStage {
    let lower = command.to_lowercase();
    if mentions(&lower, SETUP_MARKERS) {
        PipelineStage::Setup
    } else if mentions(&lower, DEPENDENCY_MARKERS) {
        PipelineStage::Dependencies
    } else if mentions(&lower, BUILD_MARKERS) {
        PipelineStage::Build
    } else {
        PipelineStage::Run
    }
}

/// Group a plan's commands into ordered, non-empty stages.
///
/// The run command always goes last into `Run`. Commands keep their relative
/// plan order inside a stage.
pub fn classify_plan(plan: &BuildPlan) -> Vec<StageCommands> {
    let run = Some(plan.run_command.as_str()).filter(|c| !c.trim().is_empty());
    group(plan.build_commands.iter().map(String::as_str), run)
}

pub(crate) fn group<'a>(
    commands: impl IntoIterator<Item = &'a str>,
    run_command: Option<&str>,
) -> Vec<StageCommands> {
    let mut buckets: [Vec<String>; 4] = Default::default();
    for command in commands {
        buckets[classify(command) as usize].push(command.to_string());
    }
    if let Some(run) = run_command {
        buckets[PipelineStage::Run as usize].push(run.to_string());
    }

    PipelineStage::all()
        .iter()
        .zip(buckets)
        .filter(|(_, commands)| !commands.is_empty())
        .map(|(stage, commands)| StageCommands {
            stage: *stage,
            commands,
        })
        .collect()
}
