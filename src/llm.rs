use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Ten narrative category scores, each 0-10. Their sum (max 100) is the raw
/// narrative score before the red-flag penalty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub core_values: u8,
    pub lifestyle_alignment: u8,
    pub relationship_goals: u8,
    pub communication_style: u8,
    pub emotional_compatibility: u8,
    pub family_planning: u8,
    pub social_lifestyle: u8,
    pub conflict_resolution: u8,
    pub intimacy_alignment: u8,
    pub growth_mindset: u8,
}

impl CategoryScores {
    pub fn total(&self) -> u32 {
        [
            self.core_values,
            self.lifestyle_alignment,
            self.relationship_goals,
            self.communication_style,
            self.emotional_compatibility,
            self.family_planning,
            self.social_lifestyle,
            self.conflict_resolution,
            self.intimacy_alignment,
            self.growth_mindset,
        ]
        .iter()
        .map(|value| *value as u32)
        .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeReport {
    pub summary: String,
    pub green_flags: Vec<String>,
    pub yellow_flags: Vec<String>,
    pub red_flags: Vec<String>,
    pub category_scores: CategoryScores,
}

/// External text-generation collaborator. Implementations must classify
/// failures as transient (retried) or fatal (surfaced immediately).
#[async_trait]
pub trait NarrativeModel: Send + Sync {
    async fn generate(&self, comparison: &str) -> Result<NarrativeReport, LlmError>;
}

/// Bounded exponential backoff around a model call. Only transient failures
/// are retried; the delay doubles after each attempt.
pub async fn generate_with_retry(
    model: &dyn NarrativeModel,
    comparison: &str,
    max_retries: u32,
    base_delay: Duration,
) -> Result<NarrativeReport, LlmError> {
    let mut delay = base_delay;
    let mut attempt = 0u32;
    loop {
        match model.generate(comparison).await {
            Ok(report) => return Ok(report),
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                tracing::warn!(attempt, error = %err, "transient model failure, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f64,
}

impl LlmClient {
    /// Returns `None` when no API key is configured; the engine then runs
    /// with the deterministic scorer only.
    pub fn from_env(config: &LlmConfig) -> Option<Self> {
        let api_key = env::var("PAIRMATCH_LLM_API_KEY").ok()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl NarrativeModel for LlmClient {
    async fn generate(&self, comparison: &str) -> Result<NarrativeReport, LlmError> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: comparison.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| LlmError::Transient(format!("model request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body.trim()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| LlmError::Fatal(format!("model response parse failed: {}", err)))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| LlmError::Fatal("model response missing choices".to_string()))?
            .message
            .content
            .trim()
            .to_string();

        let json = extract_json(&content)
            .ok_or_else(|| LlmError::Fatal("model response missing JSON".to_string()))?;
        let raw: RawReport = serde_json::from_str(&json)
            .map_err(|err| LlmError::Fatal(format!("model JSON parse failed: {}", err)))?;

        Ok(raw.sanitize())
    }
}

/// 429 and 5xx are transient; everything else (auth, malformed request) fails
/// fast with no retry.
fn classify_status(status: StatusCode, detail: &str) -> LlmError {
    let message = if detail.is_empty() {
        format!("model API error: {}", status)
    } else {
        format!("model API error: {} {}", status, detail)
    };
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        LlmError::Transient(message)
    } else {
        LlmError::Fatal(message)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Model output before clamping; scores arrive as floats and flag lists may
/// exceed the requested lengths.
#[derive(Deserialize)]
struct RawReport {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    green_flags: Vec<String>,
    #[serde(default)]
    yellow_flags: Vec<String>,
    #[serde(default)]
    red_flags: Vec<String>,
    category_scores: RawCategoryScores,
}

#[derive(Deserialize)]
struct RawCategoryScores {
    #[serde(default)]
    core_values: f64,
    #[serde(default)]
    lifestyle_alignment: f64,
    #[serde(default)]
    relationship_goals: f64,
    #[serde(default)]
    communication_style: f64,
    #[serde(default)]
    emotional_compatibility: f64,
    #[serde(default)]
    family_planning: f64,
    #[serde(default)]
    social_lifestyle: f64,
    #[serde(default)]
    conflict_resolution: f64,
    #[serde(default)]
    intimacy_alignment: f64,
    #[serde(default)]
    growth_mindset: f64,
}

impl RawReport {
    fn sanitize(self) -> NarrativeReport {
        NarrativeReport {
            summary: self.summary.trim().to_string(),
            green_flags: clean_flags(self.green_flags, 6),
            yellow_flags: clean_flags(self.yellow_flags, 4),
            red_flags: clean_flags(self.red_flags, 3),
            category_scores: CategoryScores {
                core_values: clamp10(self.category_scores.core_values),
                lifestyle_alignment: clamp10(self.category_scores.lifestyle_alignment),
                relationship_goals: clamp10(self.category_scores.relationship_goals),
                communication_style: clamp10(self.category_scores.communication_style),
                emotional_compatibility: clamp10(self.category_scores.emotional_compatibility),
                family_planning: clamp10(self.category_scores.family_planning),
                social_lifestyle: clamp10(self.category_scores.social_lifestyle),
                conflict_resolution: clamp10(self.category_scores.conflict_resolution),
                intimacy_alignment: clamp10(self.category_scores.intimacy_alignment),
                growth_mindset: clamp10(self.category_scores.growth_mindset),
            },
        }
    }
}

fn clean_flags(flags: Vec<String>, max: usize) -> Vec<String> {
    flags
        .into_iter()
        .map(|flag| flag.trim().to_string())
        .filter(|flag| !flag.is_empty())
        .take(max)
        .collect()
}

fn clamp10(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 10.0) as u8
}

fn system_prompt() -> String {
    let prompt = r#"You are a strict JSON-only relationship compatibility analyst.
Given two dating profiles, return a single JSON object with these fields:
- summary (3-4 sentences of prose)
- green_flags (array of 3-6 short strings)
- yellow_flags (array of 2-4 short strings)
- red_flags (array of 0-3 short strings; only serious concerns)
- category_scores (object with integer fields 0-10: core_values,
  lifestyle_alignment, relationship_goals, communication_style,
  emotional_compatibility, family_planning, social_lifestyle,
  conflict_resolution, intimacy_alignment, growth_mindset)
Rules:
- Output JSON only, no markdown or commentary.
"#;
    prompt.to_string()
}

fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}
