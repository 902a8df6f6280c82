use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request wire types (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// `{"type": "json_object"}` — forces the provider to emit a single JSON
/// object as the completion body.
#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

// ---------------------------------------------------------------------------
// Response wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Generation input / output
// ---------------------------------------------------------------------------

/// The deal fields the prompt is built from. Decoupled from the storage
/// layer so this crate stays a pure provider client.
#[derive(Debug, Clone)]
pub struct PackInput {
    pub supplier_name: String,
    pub title: String,
    pub scope: String,
    pub pricing_model: String,
    pub key_issues: String,
    pub desired_outcomes: String,
    pub deal_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradeable {
    pub we_give: String,
    pub we_get: String,
}

/// The six sections a completion must contain. Parsed strictly: a missing
/// or empty section fails the whole generation rather than storing a
/// partial pack.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedPack {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub red_lines: Vec<String>,
    #[serde(default)]
    pub tradeables: Vec<Tradeable>,
    #[serde(default)]
    pub batna: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub meeting_agenda: String,
}

impl GeneratedPack {
    /// Name of the first missing section, if any.
    pub(crate) fn missing_section(&self) -> Option<&'static str> {
        if self.targets.is_empty() {
            Some("targets")
        } else if self.red_lines.is_empty() {
            Some("red_lines")
        } else if self.tradeables.is_empty() {
            Some("tradeables")
        } else if self.batna.trim().is_empty() {
            Some("batna")
        } else if self.questions.is_empty() {
            Some("questions")
        } else if self.meeting_agenda.trim().is_empty() {
            Some("meeting_agenda")
        } else {
            None
        }
    }
}
