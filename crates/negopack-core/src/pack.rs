use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Tradeable
// ---------------------------------------------------------------------------

/// A paired concession: we give X to get Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradeable {
    pub we_give: String,
    pub we_get: String,
}

// ---------------------------------------------------------------------------
// NegotiationPack
// ---------------------------------------------------------------------------

/// The AI-generated strategy artifact, one per deal. Regeneration overwrites
/// the same record, keyed by `deal_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationPack {
    pub deal_id: Uuid,
    pub targets: Vec<String>,
    pub red_lines: Vec<String>,
    pub tradeables: Vec<Tradeable>,
    pub batna: String,
    pub questions: Vec<String>,
    pub meeting_agenda: String,
    pub generated_at: DateTime<Utc>,
}

impl NegotiationPack {
    /// Shape check applied before persisting anything from the generation
    /// collaborator: all six fields must be populated.
    pub fn validate(&self) -> crate::error::Result<()> {
        let empty_list = [
            ("targets", self.targets.is_empty()),
            ("red_lines", self.red_lines.is_empty()),
            ("tradeables", self.tradeables.is_empty()),
            ("questions", self.questions.is_empty()),
        ];
        for (name, is_empty) in empty_list {
            if is_empty {
                return Err(crate::error::NegoError::Validation(format!(
                    "generated pack has no {name}"
                )));
            }
        }
        if self.batna.trim().is_empty() {
            return Err(crate::error::NegoError::Validation(
                "generated pack has no batna".into(),
            ));
        }
        if self.meeting_agenda.trim().is_empty() {
            return Err(crate::error::NegoError::Validation(
                "generated pack has no meeting_agenda".into(),
            ));
        }
        Ok(())
    }
}
