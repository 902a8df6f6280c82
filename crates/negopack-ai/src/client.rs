use std::time::Duration;

use crate::error::AiError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, GeneratedPack, PackInput, ResponseFormat};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat-completions client for pack generation. Works against any
/// OpenAI-compatible endpoint, selected by `base_url`.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl Client {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Run one completion and parse it into the six pack sections.
    pub async fn generate_pack(&self, input: &PackInput) -> Result<GeneratedPack, AiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "system",
                content: build_prompt(input),
            }],
            response_format: ResponseFormat::json_object(),
        };

        tracing::debug!(model = %self.model, deal_title = %input.title, "requesting pack generation");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| AiError::Malformed("completion has no message content".into()))?;

        let pack: GeneratedPack = serde_json::from_str(content)
            .map_err(|e| AiError::Malformed(format!("completion is not valid pack JSON: {e}")))?;

        if let Some(section) = pack.missing_section() {
            return Err(AiError::Malformed(format!(
                "completion is missing the `{section}` section"
            )));
        }

        Ok(pack)
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

pub(crate) fn build_prompt(input: &PackInput) -> String {
    let deal_value = input
        .deal_value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"You are a professional negotiation strategist. Based on the following deal for the Malaysia market (RM Currency):

Supplier: {supplier}
Title: {title}
Scope: {scope}
Pricing Model: {pricing_model}
Key Issues: {key_issues}
Desired Outcomes: {desired_outcomes}
Deal Value: RM {deal_value}

Generate a comprehensive negotiation pack in JSON format:
{{
  "targets": ["specific measurable goal 1", "goal 2", ...],
  "red_lines": ["non-negotiable condition 1", "condition 2", ...],
  "tradeables": [
    {{"we_give": "item", "we_get": "return value"}},
    ...
  ],
  "batna": "our best alternative if negotiation fails",
  "questions": ["key question 1", "question 2", ...],
  "meeting_agenda": "Provide a structured agenda. IMPORTANT: After each numbered item or sentence, add TWO newlines (\n\n) to ensure a clear space between items in the UI. Format it like: 1. Introduction\n\n2. Discussion..."
}}"#,
        supplier = input.supplier_name,
        title = input.title,
        scope = input.scope,
        pricing_model = input.pricing_model,
        key_issues = input.key_issues,
        desired_outcomes = input.desired_outcomes,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
