//! Ownership and visibility rules.
//!
//! Admin: organization-wide visibility and review authority, but owner-only
//! actions (intake edits, submission) stay with the owning employee.
//! Employee: sees and mutates only deals they own.

use crate::account::Profile;
use crate::deal::Deal;
use crate::error::{NegoError, Result};
use uuid::Uuid;

/// Owner filter for deal listings: `None` means unfiltered (admin),
/// `Some(id)` restricts to deals owned by `id`.
pub fn list_owner_filter(actor: &Profile) -> Option<Uuid> {
    if actor.role.is_admin() {
        None
    } else {
        Some(actor.id)
    }
}

pub fn can_view(actor: &Profile, deal: &Deal) -> bool {
    actor.role.is_admin() || deal.owner_id == actor.id
}

pub fn ensure_can_view(actor: &Profile, deal: &Deal) -> Result<()> {
    if can_view(actor, deal) {
        Ok(())
    } else {
        Err(NegoError::Forbidden(
            "deal belongs to another account".into(),
        ))
    }
}

/// Intake edits are owner-only and blocked once the deal enters review.
pub fn ensure_intake_editable(actor: &Profile, deal: &Deal) -> Result<()> {
    if deal.owner_id != actor.id {
        return Err(NegoError::Forbidden(
            "only the deal owner may edit intake fields".into(),
        ));
    }
    if !deal.status.allows_intake_edit() {
        return Err(NegoError::EditLocked {
            status: deal.status.as_str().to_string(),
        });
    }
    Ok(())
}

/// Generation follows the intake-edit window but is open to admins too,
/// since the pack view triggers it for whoever opens a draft deal.
pub fn ensure_can_generate(actor: &Profile, deal: &Deal) -> Result<()> {
    ensure_can_view(actor, deal)?;
    if !deal.status.allows_intake_edit() {
        return Err(NegoError::EditLocked {
            status: deal.status.as_str().to_string(),
        });
    }
    Ok(())
}

/// Meeting notes may be written by the owner or an admin, inside the
/// notes-edit status window.
pub fn ensure_notes_editable(actor: &Profile, deal: &Deal) -> Result<()> {
    ensure_can_view(actor, deal)?;
    if !deal.status.allows_notes_edit() {
        return Err(NegoError::EditLocked {
            status: deal.status.as_str().to_string(),
        });
    }
    Ok(())
}

/// Deletion is an explicit owner or admin action, allowed in any status.
pub fn ensure_can_delete(actor: &Profile, deal: &Deal) -> Result<()> {
    ensure_can_view(actor, deal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::DealIntake;
    use crate::types::{DealStatus, PricingModel, Role};

    fn deal_for(owner: &Profile) -> Deal {
        Deal::new(
            owner.id,
            DealIntake {
                supplier_id: Uuid::new_v4(),
                title: "Logistics 3PL contract".into(),
                scope: "National distribution".into(),
                pricing_model: PricingModel::UsageBased,
                deal_value: None,
                deadline: None,
                key_issues: "Fuel surcharge pass-through".into(),
                desired_outcomes: "Fixed surcharge cap".into(),
            },
        )
    }

    #[test]
    fn admin_sees_all_employee_sees_own() {
        let admin = Profile::new("Admin", "a@x.com", Role::Admin);
        let emp = Profile::new("Emp", "e@x.com", Role::Employee);
        assert_eq!(list_owner_filter(&admin), None);
        assert_eq!(list_owner_filter(&emp), Some(emp.id));
    }

    #[test]
    fn non_owner_employee_cannot_view() {
        let owner = Profile::new("Owner", "o@x.com", Role::Employee);
        let other = Profile::new("Other", "p@x.com", Role::Employee);
        let admin = Profile::new("Admin", "a@x.com", Role::Admin);
        let deal = deal_for(&owner);

        assert!(ensure_can_view(&owner, &deal).is_ok());
        assert!(ensure_can_view(&admin, &deal).is_ok());
        assert!(matches!(
            ensure_can_view(&other, &deal),
            Err(NegoError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_cannot_edit_intake_of_others() {
        let owner = Profile::new("Owner", "o@x.com", Role::Employee);
        let admin = Profile::new("Admin", "a@x.com", Role::Admin);
        let deal = deal_for(&owner);
        assert!(ensure_intake_editable(&owner, &deal).is_ok());
        assert!(matches!(
            ensure_intake_editable(&admin, &deal),
            Err(NegoError::Forbidden(_))
        ));
    }

    #[test]
    fn intake_edit_blocked_in_review() {
        let owner = Profile::new("Owner", "o@x.com", Role::Employee);
        let mut deal = deal_for(&owner);
        deal.status = DealStatus::InReview;
        assert!(matches!(
            ensure_intake_editable(&owner, &deal),
            Err(NegoError::EditLocked { .. })
        ));
        deal.status = DealStatus::Approved;
        assert!(matches!(
            ensure_intake_editable(&owner, &deal),
            Err(NegoError::EditLocked { .. })
        ));
    }

    #[test]
    fn generation_allowed_for_admin_in_editable_states() {
        let owner = Profile::new("Owner", "o@x.com", Role::Employee);
        let admin = Profile::new("Admin", "a@x.com", Role::Admin);
        let mut deal = deal_for(&owner);

        assert!(ensure_can_generate(&owner, &deal).is_ok());
        assert!(ensure_can_generate(&admin, &deal).is_ok());

        deal.status = DealStatus::InReview;
        assert!(ensure_can_generate(&owner, &deal).is_err());
        assert!(ensure_can_generate(&admin, &deal).is_err());
    }

    #[test]
    fn notes_window_enforced() {
        let owner = Profile::new("Owner", "o@x.com", Role::Employee);
        let mut deal = deal_for(&owner);
        assert!(ensure_notes_editable(&owner, &deal).is_err());
        deal.status = DealStatus::Approved;
        assert!(ensure_notes_editable(&owner, &deal).is_ok());
        deal.status = DealStatus::Completed;
        assert!(ensure_notes_editable(&owner, &deal).is_err());
    }
}
