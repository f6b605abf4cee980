use crate::error::AppError;
use crate::model::HabitPlan;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "plan.json";

fn default_current_day() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    schema_version: u32,
    #[serde(default)]
    plan: Option<HabitPlan>,
    #[serde(default = "default_current_day")]
    current_day: u32,
}

/// The session's persisted half: the plan and the viewing cursor. Derived
/// progress is never stored; it is recomputed from the task list on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub plan: Option<HabitPlan>,
    pub current_day: u32,
}

impl SessionState {
    pub fn empty() -> SessionState {
        SessionState {
            plan: None,
            current_day: 1,
        }
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var("HABIT_STORE_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("habitcoach")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("habitcoach")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<SessionState, AppError> {
    if !path.exists() {
        return Ok(SessionState::empty());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredSession =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    if let Some(plan) = stored.plan.as_ref() {
        plan.validate()?;
        if stored.current_day == 0 || stored.current_day > plan.duration.days() {
            return Err(AppError::invalid_data("current_day outside plan range"));
        }
    }

    Ok(SessionState {
        plan: stored.plan,
        current_day: stored.current_day,
    })
}

pub fn save_state(path: &Path, state: &SessionState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredSession {
        schema_version: SCHEMA_VERSION,
        plan: state.plan.clone(),
        current_day: state.current_day,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_state, save_state, SessionState, SCHEMA_VERSION};
    use crate::generate::{
        PlanRequest, RawDailyTask, RawMotivationalMessage, RawPlanContent, RawWeeklyCheckpoint,
    };
    use crate::model::{Difficulty, HabitPlan, PlanDuration};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("habitcoach-{nanos}-{file_name}"))
    }

    fn sample_plan() -> HabitPlan {
        let request = PlanRequest::new(
            "Stretch every day",
            "Loosen up",
            "8pm",
            Difficulty::Easy,
            PlanDuration::Week,
            None,
        )
        .unwrap();
        let content = RawPlanContent {
            daily_tasks: (1..=7)
                .map(|day| RawDailyTask {
                    day,
                    title: format!("Day {day}"),
                    description: "Stretch for ten minutes.".to_string(),
                })
                .collect(),
            weekly_checkpoints: vec![RawWeeklyCheckpoint {
                week: 1,
                title: "Week one".to_string(),
                description: "How did it go?".to_string(),
                milestones: vec!["Stretched daily".to_string()],
            }],
            motivational_messages: vec![RawMotivationalMessage {
                day: 1,
                message: "Off you go.".to_string(),
            }],
        };
        HabitPlan::from_generated(&request, content).unwrap()
    }

    #[test]
    fn missing_file_yields_empty_session() {
        let path = temp_path("missing.json");
        let state = load_state(&path).unwrap();
        assert_eq!(state, SessionState::empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("session.json");
        let state = SessionState {
            plan: Some(sample_plan()),
            current_day: 3,
        };

        save_state(&path, &state).unwrap();
        let loaded = load_state(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, state);
    }

    #[test]
    fn schema_version_must_match() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"plan\": null,\n  \"current_day\": 1\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let err = load_state(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn rejects_cursor_outside_plan_range() {
        let path = temp_path("bad-cursor.json");
        let state = SessionState {
            plan: Some(sample_plan()),
            current_day: 3,
        };
        save_state(&path, &state).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        raw["current_day"] = serde_json::json!(9);
        fs::write(&path, serde_json::to_string_pretty(&raw).unwrap()).unwrap();

        let err = load_state(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn rejects_tampered_task_list() {
        let path = temp_path("bad-plan.json");
        let state = SessionState {
            plan: Some(sample_plan()),
            current_day: 1,
        };
        save_state(&path, &state).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        raw["plan"]["daily_tasks"]
            .as_array_mut()
            .unwrap()
            .pop();
        fs::write(&path, serde_json::to_string_pretty(&raw).unwrap()).unwrap();

        let err = load_state(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_plan_shape");
    }
}
