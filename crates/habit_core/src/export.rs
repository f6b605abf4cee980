use crate::error::AppError;
use crate::model::HabitPlan;
use crate::plan_api;
use crate::progress::Progress;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

const DEFAULT_FILE_NAME: &str = "habit-plan.md";

/// Write the active plan as a markdown document. The renderer computes
/// nothing; it lays out an already-validated plan and its derived metrics.
pub fn export_plan(destination: Option<&Path>) -> Result<PathBuf, AppError> {
    let view = plan_api::session()?;
    let target = destination
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME));

    let document = render_document(&view.plan, &view.progress)?;
    std::fs::write(&target, document).map_err(|err| AppError::io(err.to_string()))?;

    Ok(target)
}

pub fn render_document(plan: &HabitPlan, progress: &Progress) -> Result<String, AppError> {
    let mut out = String::new();

    let _ = writeln!(out, "# Habit Plan");
    let _ = writeln!(out);
    let _ = writeln!(out, "## {}", plan.goal);
    let _ = writeln!(out);
    let _ = writeln!(out, "- Duration: {} days", plan.duration.days());
    let _ = writeln!(out, "- Difficulty: {}", plan.difficulty.label());
    let _ = writeln!(out, "- Preferred time: {}", plan.preferred_time);
    let _ = writeln!(out, "- Created: {}", display_date(&plan.created_at)?);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Why This Habit");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", plan.reason);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Daily Tasks");
    let _ = writeln!(out);
    for task in &plan.daily_tasks {
        let mark = if task.completed { "x" } else { " " };
        let _ = writeln!(out, "### Day {}: {}", task.day, task.title);
        let _ = writeln!(out);
        let _ = writeln!(out, "- [{mark}] {}", task.description);
        if let Some(notes) = task.notes.as_deref() {
            let _ = writeln!(out, "- Notes: {notes}");
        }
        let _ = writeln!(out);
    }

    if !plan.weekly_checkpoints.is_empty() {
        let _ = writeln!(out, "## Weekly Checkpoints");
        let _ = writeln!(out);
        for checkpoint in &plan.weekly_checkpoints {
            let _ = writeln!(out, "### Week {}: {}", checkpoint.week, checkpoint.title);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", checkpoint.description);
            for milestone in &checkpoint.milestones {
                let _ = writeln!(out, "- {milestone}");
            }
            let _ = writeln!(out);
        }
    }

    if !plan.motivational_messages.is_empty() {
        let _ = writeln!(out, "## Motivational Messages");
        let _ = writeln!(out);
        for message in &plan.motivational_messages {
            let _ = writeln!(out, "- Day {}: {}", message.day, message.message);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## Progress");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Current streak: {}", progress.current_streak);
    let _ = writeln!(out, "- Longest streak: {}", progress.longest_streak);
    let _ = writeln!(
        out,
        "- Completed: {} of {} days",
        progress.total_completed,
        plan.duration.days()
    );
    let _ = writeln!(out, "- Consistency: {}%", progress.consistency_percentage);
    let _ = writeln!(
        out,
        "- Habit strength: {}/100",
        progress.habit_strength_score
    );

    Ok(out)
}

fn display_date(rfc3339: &str) -> Result<String, AppError> {
    let parsed = OffsetDateTime::parse(rfc3339, &Rfc3339)
        .map_err(|_| AppError::invalid_data("created_at must be RFC3339"))?;
    parsed
        .format(format_description!("[month repr:short] [day], [year]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
