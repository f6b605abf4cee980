use crate::error::AppError;
use crate::model::{Difficulty, PlanDuration};
use serde::Deserialize;

mod groq;

pub use groq::{GroqSource, DEFAULT_MODEL};

/// What the user asked for. Validated once at construction; the generator
/// prompt and the plan constructor both read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub goal: String,
    pub reason: String,
    pub preferred_time: String,
    pub difficulty: Difficulty,
    pub duration: PlanDuration,
    pub extra_context: Option<String>,
}

impl PlanRequest {
    pub fn new(
        goal: &str,
        reason: &str,
        preferred_time: &str,
        difficulty: Difficulty,
        duration: PlanDuration,
        extra_context: Option<&str>,
    ) -> Result<PlanRequest, AppError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(AppError::invalid_input("goal is required"));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::invalid_input("reason is required"));
        }
        let preferred_time = preferred_time.trim();
        if preferred_time.is_empty() {
            return Err(AppError::invalid_input("preferred time is required"));
        }

        Ok(PlanRequest {
            goal: goal.to_string(),
            reason: reason.to_string(),
            preferred_time: preferred_time.to_string(),
            difficulty,
            duration,
            extra_context: extra_context
                .map(str::trim)
                .filter(|context| !context.is_empty())
                .map(str::to_string),
        })
    }
}

// Wire shapes for the generator's JSON document. The generator speaks
// camelCase; the store does not, so these stay separate from the model types.

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawDailyTask {
    pub day: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawWeeklyCheckpoint {
    pub week: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMotivationalMessage {
    pub day: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlanContent {
    pub daily_tasks: Vec<RawDailyTask>,
    pub weekly_checkpoints: Vec<RawWeeklyCheckpoint>,
    #[serde(default)]
    pub motivational_messages: Vec<RawMotivationalMessage>,
}

/// A producer of raw plan content. The real implementation calls the Groq
/// API; tests and offline imports substitute their own.
pub trait PlanSource {
    fn generate(&self, request: &PlanRequest) -> Result<RawPlanContent, AppError>;
}

/// Reads raw plan content from a local JSON file instead of the API. Backs
/// `--from` imports; runs through the exact same validation pipeline.
pub struct FileSource {
    path: std::path::PathBuf,
}

impl FileSource {
    pub fn new(path: std::path::PathBuf) -> FileSource {
        FileSource { path }
    }
}

impl PlanSource for FileSource {
    fn generate(&self, _request: &PlanRequest) -> Result<RawPlanContent, AppError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;
        parse_plan_content(&content)
    }
}

/// Builds the real generator. Model precedence: HABIT_MODEL env, then the
/// config value, then the default.
pub fn source_from_env(fallback_model: Option<&str>) -> Result<Box<dyn PlanSource>, AppError> {
    let api_key = std::env::var("GROQ_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AppError::generation_failed("GROQ_API_KEY is not set"))?;

    let model = std::env::var("HABIT_MODEL")
        .ok()
        .filter(|model| !model.trim().is_empty())
        .or_else(|| fallback_model.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    Ok(Box::new(GroqSource::new(api_key, model)))
}

pub fn build_prompt(request: &PlanRequest) -> String {
    let days = request.duration.days();
    let context = request.extra_context.as_deref().unwrap_or("None");

    format!(
        "You are an expert habit coach. Create a detailed {days}-day habit plan to help someone achieve their goal.\n\
         \n\
         Goal: {goal}\n\
         Reason: {reason}\n\
         Preferred Time: {time}\n\
         Difficulty: {difficulty}\n\
         Duration: {days} days\n\
         Additional Context: {context}\n\
         \n\
         Respond with a single JSON object of this shape:\n\
         {{\n\
           \"dailyTasks\": [{{\"day\": 1, \"title\": \"...\", \"description\": \"...\"}}],\n\
           \"weeklyCheckpoints\": [{{\"week\": 1, \"title\": \"...\", \"description\": \"...\", \"milestones\": [\"...\"]}}],\n\
           \"motivationalMessages\": [{{\"day\": 1, \"message\": \"...\"}}]\n\
         }}\n\
         \n\
         Guidelines:\n\
         - Provide exactly one dailyTasks entry for every day from 1 to {days}.\n\
         - Make tasks specific, actionable, and achievable.\n\
         - Progress should be gradual based on the difficulty level ({difficulty}).\n\
         - Tasks should align with the preferred time: {time}.\n\
         - Include motivational messages only for days 1, 3, 7, 14, 21 and 30 (if applicable).\n\
         - Create one weekly checkpoint per week of the plan.\n\
         - Keep task descriptions clear and concise (2-3 sentences max).\n\
         \n\
         Return ONLY valid JSON with no additional text or markdown formatting.",
        goal = request.goal,
        reason = request.reason,
        time = request.preferred_time,
        difficulty = request.difficulty.label(),
    )
}

/// Models wrap their JSON in markdown fences often enough that the original
/// service scrubbed them; same treatment here.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.split_once('\n') {
        Some((_language, body)) => body,
        None => rest,
    };
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_plan_content(content: &str) -> Result<RawPlanContent, AppError> {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(cleaned).map_err(|err| {
        AppError::generation_failed(format!("generator returned unparseable content: {err}"))
    })
}
