use crate::error::AppError;
use crate::generate::{PlanRequest, RawPlanContent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Days that carry a motivational message when within the plan duration.
pub const MILESTONE_DAYS: [u32; 6] = [1, 3, 7, 14, 21, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(AppError::invalid_input(format!(
                "difficulty must be easy, medium or hard (got '{other}')"
            ))),
        }
    }
}

/// Plan length in days. Only three lengths are supported; serialized as the
/// plain integer so stores and generator payloads stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PlanDuration {
    Week,
    Fortnight,
    Month,
}

impl PlanDuration {
    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Fortnight => 14,
            Self::Month => 30,
        }
    }

    pub fn weeks(self) -> u32 {
        self.days().div_ceil(7)
    }
}

impl TryFrom<u32> for PlanDuration {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, String> {
        match days {
            7 => Ok(Self::Week),
            14 => Ok(Self::Fortnight),
            30 => Ok(Self::Month),
            other => Err(format!("duration must be 7, 14 or 30 days (got {other})")),
        }
    }
}

impl From<PlanDuration> for u32 {
    fn from(duration: PlanDuration) -> u32 {
        duration.days()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTask {
    pub id: String,
    pub day: u32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCheckpoint {
    pub week: u32,
    pub title: String,
    pub description: String,
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotivationalMessage {
    pub day: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPlan {
    pub id: String,
    pub goal: String,
    pub reason: String,
    pub difficulty: Difficulty,
    pub duration: PlanDuration,
    pub preferred_time: String,
    pub daily_tasks: Vec<DailyTask>,
    pub weekly_checkpoints: Vec<WeeklyCheckpoint>,
    pub motivational_messages: Vec<MotivationalMessage>,
    pub created_at: String,
}

impl HabitPlan {
    /// Build a plan from the untrusted generator output. Validates shape
    /// field-by-field before anything is accepted; a plan whose task list
    /// does not match the requested duration never leaves this function.
    pub fn from_generated(
        request: &PlanRequest,
        content: RawPlanContent,
    ) -> Result<HabitPlan, AppError> {
        let days = request.duration.days();

        if content.daily_tasks.len() as u32 != days {
            return Err(AppError::invalid_plan_shape(format!(
                "expected {} daily tasks, generator returned {}",
                days,
                content.daily_tasks.len()
            )));
        }

        let mut seen_days = BTreeSet::new();
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let mut daily_tasks = Vec::with_capacity(content.daily_tasks.len());

        for raw in content.daily_tasks {
            if raw.day == 0 || raw.day > days {
                return Err(AppError::invalid_plan_shape(format!(
                    "task day {} is outside 1..={days}",
                    raw.day
                )));
            }
            if !seen_days.insert(raw.day) {
                return Err(AppError::invalid_plan_shape(format!(
                    "duplicate task for day {}",
                    raw.day
                )));
            }

            let title = raw.title.trim();
            let description = raw.description.trim();
            if title.is_empty() || description.is_empty() {
                return Err(AppError::invalid_plan_shape(format!(
                    "day {} is missing a title or description",
                    raw.day
                )));
            }

            daily_tasks.push(DailyTask {
                id: format!("task-{nanos}-{}", raw.day),
                day: raw.day,
                title: title.to_string(),
                description: description.to_string(),
                completed: false,
                completed_at: None,
                notes: None,
            });
        }
        daily_tasks.sort_by_key(|task| task.day);

        if content.weekly_checkpoints.is_empty() {
            return Err(AppError::invalid_plan_shape(
                "generator returned no weekly checkpoints",
            ));
        }

        let mut seen_weeks = BTreeSet::new();
        let mut weekly_checkpoints = Vec::with_capacity(content.weekly_checkpoints.len());
        for raw in content.weekly_checkpoints {
            if raw.week == 0 || raw.week > request.duration.weeks() {
                return Err(AppError::invalid_plan_shape(format!(
                    "checkpoint week {} is outside 1..={}",
                    raw.week,
                    request.duration.weeks()
                )));
            }
            if !seen_weeks.insert(raw.week) {
                return Err(AppError::invalid_plan_shape(format!(
                    "duplicate checkpoint for week {}",
                    raw.week
                )));
            }

            let title = raw.title.trim();
            let description = raw.description.trim();
            if title.is_empty() || description.is_empty() {
                return Err(AppError::invalid_plan_shape(format!(
                    "week {} checkpoint is missing a title or description",
                    raw.week
                )));
            }

            weekly_checkpoints.push(WeeklyCheckpoint {
                week: raw.week,
                title: title.to_string(),
                description: description.to_string(),
                milestones: raw
                    .milestones
                    .iter()
                    .map(|milestone| milestone.trim().to_string())
                    .filter(|milestone| !milestone.is_empty())
                    .collect(),
            });
        }
        weekly_checkpoints.sort_by_key(|checkpoint| checkpoint.week);

        let mut motivational_messages = Vec::new();
        for raw in content.motivational_messages {
            if raw.day == 0 || raw.day > days {
                return Err(AppError::invalid_plan_shape(format!(
                    "message day {} is outside 1..={days}",
                    raw.day
                )));
            }

            let message = raw.message.trim();
            if message.is_empty() {
                return Err(AppError::invalid_plan_shape(format!(
                    "day {} message is empty",
                    raw.day
                )));
            }

            // The generator sometimes invents extra message days; only the
            // canonical milestone days are kept.
            if MILESTONE_DAYS.contains(&raw.day) {
                motivational_messages.push(MotivationalMessage {
                    day: raw.day,
                    message: message.to_string(),
                });
            }
        }
        motivational_messages.sort_by_key(|message| message.day);
        motivational_messages.dedup_by_key(|message| message.day);

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;

        Ok(HabitPlan {
            id: format!("plan-{nanos}"),
            goal: request.goal.clone(),
            reason: request.reason.clone(),
            difficulty: request.difficulty,
            duration: request.duration,
            preferred_time: request.preferred_time.clone(),
            daily_tasks,
            weekly_checkpoints,
            motivational_messages,
            created_at,
        })
    }

    /// Shape check for plans coming back out of the store. Mirrors the
    /// construction invariants so a hand-edited or corrupt store file can
    /// never surface an inconsistent plan.
    pub fn validate(&self) -> Result<(), AppError> {
        let days = self.duration.days();
        if self.daily_tasks.len() as u32 != days {
            return Err(AppError::invalid_plan_shape(format!(
                "plan has {} tasks for a {days}-day duration",
                self.daily_tasks.len()
            )));
        }

        for (index, task) in self.daily_tasks.iter().enumerate() {
            let expected = index as u32 + 1;
            if task.day != expected {
                return Err(AppError::invalid_plan_shape(format!(
                    "task at position {index} has day {}, expected {expected}",
                    task.day
                )));
            }
            if task.title.trim().is_empty() || task.description.trim().is_empty() {
                return Err(AppError::invalid_plan_shape(format!(
                    "day {} is missing a title or description",
                    task.day
                )));
            }
            if task.completed && task.completed_at.is_none() {
                return Err(AppError::invalid_plan_shape(format!(
                    "day {} is completed without a completion time",
                    task.day
                )));
            }
        }

        Ok(())
    }

    pub fn task(&self, day: u32) -> Option<&DailyTask> {
        self.daily_tasks.iter().find(|task| task.day == day)
    }

    pub fn message_for_day(&self, day: u32) -> Option<&MotivationalMessage> {
        self.motivational_messages
            .iter()
            .find(|message| message.day == day)
    }
}

#[cfg(test)]
mod tests {
    use super::{Difficulty, HabitPlan, PlanDuration};
    use crate::generate::{
        PlanRequest, RawDailyTask, RawMotivationalMessage, RawPlanContent, RawWeeklyCheckpoint,
    };

    fn request() -> PlanRequest {
        PlanRequest::new(
            "Run every morning",
            "Train for a 10k",
            "7am",
            Difficulty::Medium,
            PlanDuration::Week,
            None,
        )
        .unwrap()
    }

    fn content(days: u32) -> RawPlanContent {
        RawPlanContent {
            daily_tasks: (1..=days)
                .map(|day| RawDailyTask {
                    day,
                    title: format!("Day {day} run"),
                    description: format!("Run for {} minutes.", 10 + day),
                })
                .collect(),
            weekly_checkpoints: vec![RawWeeklyCheckpoint {
                week: 1,
                title: "First week".to_string(),
                description: "Reflect on how the runs felt.".to_string(),
                milestones: vec!["Ran every day".to_string()],
            }],
            motivational_messages: vec![
                RawMotivationalMessage {
                    day: 1,
                    message: "Day one, let's go.".to_string(),
                },
                RawMotivationalMessage {
                    day: 7,
                    message: "A full week behind you.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn builds_plan_with_pending_tasks_and_ids() {
        let plan = HabitPlan::from_generated(&request(), content(7)).unwrap();

        assert_eq!(plan.daily_tasks.len(), 7);
        for (index, task) in plan.daily_tasks.iter().enumerate() {
            assert_eq!(task.day, index as u32 + 1);
            assert!(!task.completed);
            assert!(task.completed_at.is_none());
            assert!(task.id.ends_with(&format!("-{}", task.day)));
        }
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn rejects_task_count_mismatch() {
        let mut short = content(7);
        short.daily_tasks.pop();

        let err = HabitPlan::from_generated(&request(), short).unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
    }

    #[test]
    fn rejects_duplicate_days() {
        let mut dup = content(7);
        dup.daily_tasks[6].day = 3;

        let err = HabitPlan::from_generated(&request(), dup).unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
        assert!(err.message().contains("duplicate"));
    }

    #[test]
    fn rejects_day_out_of_range() {
        let mut bad = content(7);
        bad.daily_tasks[6].day = 8;

        let err = HabitPlan::from_generated(&request(), bad).unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
    }

    #[test]
    fn rejects_empty_title() {
        let mut bad = content(7);
        bad.daily_tasks[2].title = "   ".to_string();

        let err = HabitPlan::from_generated(&request(), bad).unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
    }

    #[test]
    fn rejects_missing_checkpoints() {
        let mut bad = content(7);
        bad.weekly_checkpoints.clear();

        let err = HabitPlan::from_generated(&request(), bad).unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
    }

    #[test]
    fn drops_non_milestone_message_days() {
        let mut extra = content(7);
        extra
            .motivational_messages
            .push(crate::generate::RawMotivationalMessage {
                day: 5,
                message: "Invented by the generator.".to_string(),
            });

        let plan = HabitPlan::from_generated(&request(), extra).unwrap();
        let days: Vec<u32> = plan
            .motivational_messages
            .iter()
            .map(|message| message.day)
            .collect();
        assert_eq!(days, vec![1, 7]);
    }

    #[test]
    fn rejects_message_day_out_of_range() {
        let mut bad = content(7);
        bad.motivational_messages[1].day = 14;

        let err = HabitPlan::from_generated(&request(), bad).unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
    }

    #[test]
    fn sorts_tasks_by_day() {
        let mut shuffled = content(7);
        shuffled.daily_tasks.reverse();

        let plan = HabitPlan::from_generated(&request(), shuffled).unwrap();
        let days: Vec<u32> = plan.daily_tasks.iter().map(|task| task.day).collect();
        assert_eq!(days, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn duration_parses_supported_lengths_only() {
        assert_eq!(PlanDuration::try_from(7).unwrap(), PlanDuration::Week);
        assert_eq!(PlanDuration::try_from(14).unwrap(), PlanDuration::Fortnight);
        assert_eq!(PlanDuration::try_from(30).unwrap(), PlanDuration::Month);
        assert!(PlanDuration::try_from(10).is_err());
        assert_eq!(PlanDuration::Month.weeks(), 5);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn validate_flags_completed_without_timestamp() {
        let mut plan = HabitPlan::from_generated(&request(), content(7)).unwrap();
        plan.daily_tasks[0].completed = true;

        let err = plan.validate().unwrap_err();
        assert_eq!(err.code(), "invalid_plan_shape");
    }
}
