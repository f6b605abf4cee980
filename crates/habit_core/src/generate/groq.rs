use super::{build_prompt, parse_plan_content, PlanRequest, PlanSource, RawPlanContent};
use crate::error::AppError;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const SYSTEM_PROMPT: &str = "You are a habit-building expert. Respond only with valid JSON.";

/// Groq's OpenAI-compatible chat completions API. One request, no retries;
/// the caller decides whether to try again.
pub struct GroqSource {
    api_key: String,
    model: String,
    endpoint: String,
}

impl GroqSource {
    pub fn new(api_key: String, model: String) -> GroqSource {
        GroqSource {
            api_key,
            model,
            endpoint: ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(api_key: String, model: String, endpoint: String) -> GroqSource {
        GroqSource {
            api_key,
            model,
            endpoint,
        }
    }
}

impl PlanSource for GroqSource {
    fn generate(&self, request: &PlanRequest) -> Result<RawPlanContent, AppError> {
        let payload = serde_json::json!({
            "model": self.model,
            "temperature": 0.7,
            "max_tokens": 8000,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(request) },
            ],
        });

        let response = ureq::post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(payload)
            .map_err(|err| AppError::generation_failed(err.to_string()))?;

        let body: serde_json::Value = response
            .into_json()
            .map_err(|err| AppError::generation_failed(err.to_string()))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AppError::generation_failed("completion response carried no content")
            })?;

        parse_plan_content(content)
    }
}
