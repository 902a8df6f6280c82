use crate::types::{DealStatus, PricingModel};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Deal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub supplier_id: Uuid,
    pub title: String,
    pub scope: String,
    pub pricing_model: PricingModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub key_issues: String,
    pub desired_outcomes: String,
    pub status: DealStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// Build a fresh deal in `draft` from intake fields.
    pub fn new(owner_id: Uuid, intake: DealIntake) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            supplier_id: intake.supplier_id,
            title: intake.title,
            scope: intake.scope,
            pricing_model: intake.pricing_model,
            deal_value: intake.deal_value,
            deadline: intake.deadline,
            key_issues: intake.key_issues,
            desired_outcomes: intake.desired_outcomes,
            status: DealStatus::Draft,
            admin_feedback: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// DealIntake
// ---------------------------------------------------------------------------

/// The user-entered fields of a deal, as captured on the intake form.
/// Status, ownership, and feedback never pass through this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealIntake {
    pub supplier_id: Uuid,
    pub title: String,
    pub scope: String,
    pub pricing_model: PricingModel,
    #[serde(default)]
    pub deal_value: Option<f64>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub key_issues: String,
    pub desired_outcomes: String,
}

impl DealIntake {
    /// Required-field check, applied before any write.
    pub fn validate(&self) -> crate::error::Result<()> {
        let required = [
            ("title", &self.title),
            ("scope", &self.scope),
            ("key_issues", &self.key_issues),
            ("desired_outcomes", &self.desired_outcomes),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(crate::error::NegoError::Validation(format!(
                    "{name} is required"
                )));
            }
        }
        if let Some(v) = self.deal_value {
            if !v.is_finite() || v < 0.0 {
                return Err(crate::error::NegoError::Validation(
                    "deal_value must be a non-negative number".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> DealIntake {
        DealIntake {
            supplier_id: Uuid::new_v4(),
            title: "Cloud Infrastructure Renewal 2026".into(),
            scope: "3-year term, compute and storage modules".into(),
            pricing_model: PricingModel::Subscription,
            deal_value: Some(500_000.0),
            deadline: None,
            key_issues: "List price increased 18% year on year".into(),
            desired_outcomes: "Cap annual uplift at 5%".into(),
        }
    }

    #[test]
    fn new_deal_starts_in_draft() {
        let owner = Uuid::new_v4();
        let deal = Deal::new(owner, intake());
        assert_eq!(deal.status, DealStatus::Draft);
        assert_eq!(deal.owner_id, owner);
        assert!(deal.admin_feedback.is_none());
        assert_eq!(deal.created_at, deal.updated_at);
    }

    #[test]
    fn intake_requires_core_fields() {
        let mut bad = intake();
        bad.title = "  ".into();
        assert!(bad.validate().is_err());

        let mut bad = intake();
        bad.desired_outcomes = String::new();
        assert!(bad.validate().is_err());

        assert!(intake().validate().is_ok());
    }

    #[test]
    fn intake_rejects_negative_value() {
        let mut bad = intake();
        bad.deal_value = Some(-1.0);
        assert!(bad.validate().is_err());
        bad.deal_value = Some(f64::NAN);
        assert!(bad.validate().is_err());
        bad.deal_value = None;
        assert!(bad.validate().is_ok());
    }
}
