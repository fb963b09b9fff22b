//! Terminal rendering of snapshots and notifications

use anitch::pipeline::StageView;
use anitch::{Notification, NotificationLevel, SessionSnapshot, StageStatus};
use colored::Colorize;

const WIDTH: usize = 78;

pub fn notification(n: &Notification) -> String {
    let title = match n.level {
        NotificationLevel::Info => n.title.cyan().bold(),
        NotificationLevel::Success => n.title.green().bold(),
        NotificationLevel::Warning => n.title.yellow().bold(),
        NotificationLevel::Error => n.title.red().bold(),
    };
    format!("{} {}", title, n.message.dimmed())
}

fn coherence_bar(value: u8) -> String {
    let filled = (value as usize) / 5;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
    let bar = match value {
        0..=24 => bar.red(),
        25..=59 => bar.yellow(),
        _ => bar.green(),
    };
    format!("{} {:>3}%", bar, value)
}

pub fn stage_line(view: &StageView) -> String {
    let marker = match view.status {
        StageStatus::Pending => "○".dimmed(),
        StageStatus::Running => "◐".cyan().bold(),
        StageStatus::Completed => "●".green(),
    };
    format!(
        "  {} {:<15} {}",
        marker,
        view.stage.title(),
        view.commands.join(" && ").dimmed()
    )
}

pub fn status(snapshot: &SessionSnapshot) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "{} {}   {} {}   {} {}",
        "state".bold(),
        snapshot.state,
        "coherence".bold(),
        coherence_bar(snapshot.coherence),
        "bridge".bold(),
        if snapshot.bridge_connected {
            "connected".green()
        } else {
            "offline".dimmed()
        }
    ));

    if let Some(plan) = &snapshot.plan {
        out.push(format!(
            "{} {} ({}, {})",
            "plan".bold(),
            plan.project_name,
            plan.language,
            plan.build_tool
        ));
        for line in textwrap::wrap(&plan.analysis_summary, WIDTH - 2) {
            out.push(format!("  {}", line));
        }
    }
    if !snapshot.stages.is_empty() {
        out.push("pipeline".bold().to_string());
        out.extend(snapshot.stages.iter().map(stage_line));
    }
    if let Some(text) = &snapshot.oracle_response {
        out.push("oracle".bold().to_string());
        out.push(oracle(text));
    }
    if !snapshot.scene.is_empty() {
        let shapes: Vec<_> = snapshot.scene.iter().map(|o| o.shape.as_str()).collect();
        out.push(format!("{} {}", "scene".bold(), shapes.join(", ")));
    }
    out.join("\n")
}

pub fn oracle(text: &str) -> String {
    let options = textwrap::Options::new(WIDTH).initial_indent("  ").subsequent_indent("  ");
    textwrap::fill(text, options).magenta().to_string()
}
