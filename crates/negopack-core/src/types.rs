use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DealStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Draft,
    PackGenerated,
    InReview,
    ChangesRequested,
    Approved,
    MeetingDone,
    Completed,
    Rejected,
}

impl DealStatus {
    pub fn all() -> &'static [DealStatus] {
        &[
            DealStatus::Draft,
            DealStatus::PackGenerated,
            DealStatus::InReview,
            DealStatus::ChangesRequested,
            DealStatus::Approved,
            DealStatus::MeetingDone,
            DealStatus::Completed,
            DealStatus::Rejected,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DealStatus::Draft => "draft",
            DealStatus::PackGenerated => "pack_generated",
            DealStatus::InReview => "in_review",
            DealStatus::ChangesRequested => "changes_requested",
            DealStatus::Approved => "approved",
            DealStatus::MeetingDone => "meeting_done",
            DealStatus::Completed => "completed",
            DealStatus::Rejected => "rejected",
        }
    }

    /// `completed` has no outgoing transitions at all. `rejected` is
    /// terminal for the owner but an admin may still reopen it.
    pub fn is_terminal(self) -> bool {
        self == DealStatus::Completed
    }

    /// Statuses in which the owner may still change intake fields.
    /// Anything reachable only through admin review action is locked.
    pub fn allows_intake_edit(self) -> bool {
        matches!(
            self,
            DealStatus::Draft
                | DealStatus::PackGenerated
                | DealStatus::ChangesRequested
                | DealStatus::Rejected
        )
    }

    /// Statuses in which meeting notes may be created or updated.
    ///
    /// `pack_generated` is a deliberate allowance carried over from the
    /// source system, where the notes screen is reachable before approval.
    pub fn allows_notes_edit(self) -> bool {
        matches!(
            self,
            DealStatus::Approved | DealStatus::MeetingDone | DealStatus::PackGenerated
        )
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DealStatus {
    type Err = crate::error::NegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DealStatus::Draft),
            "pack_generated" => Ok(DealStatus::PackGenerated),
            "in_review" => Ok(DealStatus::InReview),
            "changes_requested" => Ok(DealStatus::ChangesRequested),
            "approved" => Ok(DealStatus::Approved),
            "meeting_done" => Ok(DealStatus::MeetingDone),
            "completed" => Ok(DealStatus::Completed),
            "rejected" => Ok(DealStatus::Rejected),
            _ => Err(crate::error::NegoError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TransitionAction
// ---------------------------------------------------------------------------

/// Explicit status-changing actions a user can request on a deal.
///
/// First pack generation and meeting-note saves also move status, but those
/// transitions are side effects of their own operations rather than actions
/// submitted to the transition endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    SubmitForReview,
    Approve,
    RequestChanges,
    Reject,
    Reopen,
    RequestNoteChanges,
    MarkCompleted,
}

impl TransitionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionAction::SubmitForReview => "submit_for_review",
            TransitionAction::Approve => "approve",
            TransitionAction::RequestChanges => "request_changes",
            TransitionAction::Reject => "reject",
            TransitionAction::Reopen => "reopen",
            TransitionAction::RequestNoteChanges => "request_note_changes",
            TransitionAction::MarkCompleted => "mark_completed",
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransitionAction {
    type Err = crate::error::NegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit_for_review" => Ok(TransitionAction::SubmitForReview),
            "approve" => Ok(TransitionAction::Approve),
            "request_changes" => Ok(TransitionAction::RequestChanges),
            "reject" => Ok(TransitionAction::Reject),
            "reopen" => Ok(TransitionAction::Reopen),
            "request_note_changes" => Ok(TransitionAction::RequestNoteChanges),
            "mark_completed" => Ok(TransitionAction::MarkCompleted),
            _ => Err(crate::error::NegoError::InvalidAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PricingModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    FixedFee,
    TimeAndMaterials,
    UsageBased,
    Subscription,
    Other,
}

impl PricingModel {
    pub fn as_str(self) -> &'static str {
        match self {
            PricingModel::FixedFee => "fixed_fee",
            PricingModel::TimeAndMaterials => "time_and_materials",
            PricingModel::UsageBased => "usage_based",
            PricingModel::Subscription => "subscription",
            PricingModel::Other => "other",
        }
    }

    /// Human-readable label, as shown in the intake form and the AI prompt.
    pub fn label(self) -> &'static str {
        match self {
            PricingModel::FixedFee => "Fixed Fee",
            PricingModel::TimeAndMaterials => "Time & Materials",
            PricingModel::UsageBased => "Usage-based",
            PricingModel::Subscription => "Subscription",
            PricingModel::Other => "Other",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PricingModel {
    type Err = crate::error::NegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed_fee" => Ok(PricingModel::FixedFee),
            "time_and_materials" => Ok(PricingModel::TimeAndMaterials),
            "usage_based" => Ok(PricingModel::UsageBased),
            "subscription" => Ok(PricingModel::Subscription),
            "other" => Ok(PricingModel::Other),
            _ => Err(crate::error::NegoError::InvalidPricingModel(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::NegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            _ => Err(crate::error::NegoError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
