use crate::model::DailyTask;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub day: u32,
    /// `completed_at` when the task is done, otherwise the recompute time.
    /// Only meaningful when `completed` is true.
    pub date: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completed: u32,
    pub consistency_percentage: u32,
    pub habit_strength_score: u32,
    pub completion_history: Vec<CompletionRecord>,
}

impl Progress {
    pub fn empty() -> Progress {
        Progress {
            current_streak: 0,
            longest_streak: 0,
            total_completed: 0,
            consistency_percentage: 0,
            habit_strength_score: 0,
            completion_history: Vec::new(),
        }
    }

    /// Derive every metric from scratch over the task list. Pure: same tasks
    /// and `now` always produce the same result. Streaks are measured over
    /// task ordinals, not calendar dates; the current streak runs backward
    /// from the highest day and stops at the first incomplete task.
    ///
    /// Percentages round half-up (both metrics use the same rule).
    pub fn compute(tasks: &[DailyTask], now: &str) -> Progress {
        if tasks.is_empty() {
            return Progress::empty();
        }

        let duration = tasks.len() as u32;
        let total_completed = tasks.iter().filter(|task| task.completed).count() as u32;

        let mut ordered: Vec<&DailyTask> = tasks.iter().collect();
        ordered.sort_by_key(|task| task.day);

        let mut current_streak = 0;
        for task in ordered.iter().rev() {
            if !task.completed {
                break;
            }
            current_streak += 1;
        }

        let mut longest_streak = 0;
        let mut run = 0;
        for task in &ordered {
            if task.completed {
                run += 1;
                longest_streak = longest_streak.max(run);
            } else {
                run = 0;
            }
        }

        let consistency_percentage =
            (f64::from(total_completed) * 100.0 / f64::from(duration)).round() as u32;

        let streak_component =
            (f64::from(current_streak) * 50.0 / f64::from(duration)).min(50.0);
        let consistency_component = f64::from(consistency_percentage) * 0.5;
        let habit_strength_score = (streak_component + consistency_component).round() as u32;

        let completion_history = ordered
            .iter()
            .map(|task| CompletionRecord {
                day: task.day,
                date: task
                    .completed_at
                    .clone()
                    .unwrap_or_else(|| now.to_string()),
                completed: task.completed,
            })
            .collect();

        Progress {
            current_streak,
            longest_streak,
            total_completed,
            consistency_percentage,
            habit_strength_score,
            completion_history,
        }
    }
}
