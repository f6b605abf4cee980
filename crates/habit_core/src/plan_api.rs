use crate::error::AppError;
use crate::generate::{PlanRequest, PlanSource, RawPlanContent};
use crate::model::{DailyTask, HabitPlan};
use crate::progress::Progress;
use crate::storage::json_store::{self, SessionState};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A mutation result: the touched task plus metrics recomputed over the
/// whole task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub task: DailyTask,
    pub progress: Progress,
}

/// Everything the display layer needs in one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub plan: HabitPlan,
    pub progress: Progress,
    pub current_day: u32,
}

pub fn generate_and_adopt(
    request: &PlanRequest,
    source: &dyn PlanSource,
) -> Result<HabitPlan, AppError> {
    let content = source.generate(request)?;
    adopt_content(request, content)
}

/// Validate raw content against the request and make it the active plan.
/// Replaces any existing plan and resets the cursor to day 1.
pub fn adopt_content(
    request: &PlanRequest,
    content: RawPlanContent,
) -> Result<HabitPlan, AppError> {
    let path = json_store::store_path()?;
    adopt_content_with_path(&path, request, content)
}

pub fn complete_task(day: u32) -> Result<CompletionOutcome, AppError> {
    let path = json_store::store_path()?;
    complete_task_with_path(&path, day)
}

pub fn annotate_task(day: u32, notes: &str) -> Result<DailyTask, AppError> {
    let path = json_store::store_path()?;
    annotate_task_with_path(&path, day, notes)
}

pub fn set_current_day(day: u32) -> Result<u32, AppError> {
    let path = json_store::store_path()?;
    set_current_day_with_path(&path, day)
}

/// Recompute metrics from the stored task list. Exposed on its own for
/// callers that changed the plan through some other door (bulk import).
pub fn progress() -> Result<Progress, AppError> {
    let path = json_store::store_path()?;
    progress_with_path(&path)
}

pub fn session() -> Result<SessionView, AppError> {
    let path = json_store::store_path()?;
    session_with_path(&path)
}

pub fn discard_plan() -> Result<(), AppError> {
    let path = json_store::store_path()?;
    discard_plan_with_path(&path)
}

fn adopt_content_with_path(
    path: &Path,
    request: &PlanRequest,
    content: RawPlanContent,
) -> Result<HabitPlan, AppError> {
    let plan = HabitPlan::from_generated(request, content)?;
    let state = SessionState {
        plan: Some(plan.clone()),
        current_day: 1,
    };
    json_store::save_state(path, &state)?;
    Ok(plan)
}

fn complete_task_with_path(path: &Path, day: u32) -> Result<CompletionOutcome, AppError> {
    let mut state = json_store::load_state(path)?;
    let plan = active_plan_mut(&mut state)?;
    let now = timestamp()?;

    let task = plan
        .daily_tasks
        .iter_mut()
        .find(|task| task.day == day)
        .ok_or_else(|| AppError::task_not_found(day))?;

    // Completing twice is a no-op; the original timestamp stays.
    let changed = !task.completed;
    if changed {
        task.completed = true;
        task.completed_at = Some(now.clone());
    }
    let task = task.clone();
    let progress = Progress::compute(&plan.daily_tasks, &now);

    if changed {
        json_store::save_state(path, &state)?;
    }

    Ok(CompletionOutcome { task, progress })
}

fn annotate_task_with_path(path: &Path, day: u32, notes: &str) -> Result<DailyTask, AppError> {
    let mut state = json_store::load_state(path)?;
    let plan = active_plan_mut(&mut state)?;

    let task = plan
        .daily_tasks
        .iter_mut()
        .find(|task| task.day == day)
        .ok_or_else(|| AppError::task_not_found(day))?;

    task.notes = Some(notes.to_string());
    let task = task.clone();
    json_store::save_state(path, &state)?;

    Ok(task)
}

fn set_current_day_with_path(path: &Path, day: u32) -> Result<u32, AppError> {
    let mut state = json_store::load_state(path)?;
    let plan = active_plan_mut(&mut state)?;

    let days = plan.duration.days();
    if day == 0 || day > days {
        return Err(AppError::invalid_day(format!(
            "day {day} is outside 1..={days}"
        )));
    }

    state.current_day = day;
    json_store::save_state(path, &state)?;

    Ok(day)
}

fn progress_with_path(path: &Path) -> Result<Progress, AppError> {
    let state = json_store::load_state(path)?;
    let plan = active_plan(&state)?;
    Ok(Progress::compute(&plan.daily_tasks, &timestamp()?))
}

fn session_with_path(path: &Path) -> Result<SessionView, AppError> {
    let state = json_store::load_state(path)?;
    let plan = active_plan(&state)?.clone();
    let progress = Progress::compute(&plan.daily_tasks, &timestamp()?);

    Ok(SessionView {
        plan,
        progress,
        current_day: state.current_day,
    })
}

fn discard_plan_with_path(path: &Path) -> Result<(), AppError> {
    json_store::save_state(path, &SessionState::empty())
}

fn active_plan(state: &SessionState) -> Result<&HabitPlan, AppError> {
    state
        .plan
        .as_ref()
        .ok_or_else(|| AppError::invalid_input("no active plan; create one first"))
}

fn active_plan_mut(state: &mut SessionState) -> Result<&mut HabitPlan, AppError> {
    state
        .plan
        .as_mut()
        .ok_or_else(|| AppError::invalid_input("no active plan; create one first"))
}

fn timestamp() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
