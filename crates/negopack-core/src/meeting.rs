use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Attendee
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// StructuredText
// ---------------------------------------------------------------------------

/// Free text stored as a structured wrapper, matching the `{ content: … }`
/// shape the concession columns use in the source system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredText {
    #[serde(default)]
    pub content: String,
}

impl From<String> for StructuredText {
    fn from(content: String) -> Self {
        Self { content }
    }
}

// ---------------------------------------------------------------------------
// MeetingNotes
// ---------------------------------------------------------------------------

/// One set of meeting notes per deal, upserted by `deal_id`. Editable only
/// while the deal status allows it (see `DealStatus::allows_notes_edit`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingNotes {
    pub deal_id: Uuid,
    pub meeting_date: NaiveDate,
    pub location: String,
    pub attendees: Vec<Attendee>,
    pub discussion_points: String,
    pub decisions_made: String,
    pub concessions_granted: StructuredText,
    pub concessions_received: StructuredText,
    pub next_steps: String,
    pub updated_at: DateTime<Utc>,
}

/// The writable fields of meeting notes, as submitted by the notes form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingNotesInput {
    pub meeting_date: NaiveDate,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub discussion_points: String,
    #[serde(default)]
    pub decisions_made: String,
    #[serde(default)]
    pub concessions_granted: StructuredText,
    #[serde(default)]
    pub concessions_received: StructuredText,
    #[serde(default)]
    pub next_steps: String,
}
