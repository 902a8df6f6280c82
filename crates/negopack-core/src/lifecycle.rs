//! The deal status state machine.
//!
//! All guard logic lives here as pure functions over the current status, the
//! requested action, and the acting user, so the full transition table can be
//! exercised without touching storage. The store layer re-applies the result
//! with an expected-status precondition to catch concurrent writers.

use crate::account::Profile;
use crate::error::{NegoError, Result};
use crate::types::{DealStatus, TransitionAction};

// ---------------------------------------------------------------------------
// TransitionCtx
// ---------------------------------------------------------------------------

/// Who is attempting the transition, and with what feedback.
#[derive(Debug)]
pub struct TransitionCtx<'a> {
    pub actor: &'a Profile,
    /// Whether the actor owns the deal being transitioned.
    pub is_owner: bool,
    pub feedback: Option<&'a str>,
}

impl TransitionCtx<'_> {
    fn trimmed_feedback(&self) -> Option<&str> {
        self.feedback.map(str::trim).filter(|f| !f.is_empty())
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Resolve the status a deal moves to when `action` is applied in `current`.
///
/// Returns `InvalidTransition` when the action is not defined for the current
/// status or the actor fails the guard. Never mutates anything.
pub fn apply(current: DealStatus, action: TransitionAction, ctx: &TransitionCtx) -> Result<DealStatus> {
    let fail = |reason: &str| {
        Err(NegoError::InvalidTransition {
            from: current.as_str().to_string(),
            action: action.as_str().to_string(),
            reason: reason.to_string(),
        })
    };

    if current.is_terminal() {
        return fail("deal is completed");
    }

    match action {
        TransitionAction::SubmitForReview => {
            if !matches!(
                current,
                DealStatus::PackGenerated | DealStatus::ChangesRequested
            ) {
                return fail("only a generated or returned pack can be submitted");
            }
            if !ctx.is_owner {
                return fail("only the deal owner may submit for review");
            }
            if ctx.actor.role.is_admin() {
                return fail("submission is an owner action, not an admin action");
            }
            Ok(DealStatus::InReview)
        }
        TransitionAction::Approve => {
            if current != DealStatus::InReview {
                return fail("deal is not in review");
            }
            if !ctx.actor.role.is_admin() {
                return fail("only an admin may approve");
            }
            Ok(DealStatus::Approved)
        }
        TransitionAction::RequestChanges => {
            if current != DealStatus::InReview {
                return fail("deal is not in review");
            }
            if !ctx.actor.role.is_admin() {
                return fail("only an admin may request changes");
            }
            if ctx.trimmed_feedback().is_none() {
                return fail("feedback is required when requesting changes");
            }
            Ok(DealStatus::ChangesRequested)
        }
        TransitionAction::Reject => {
            if current != DealStatus::InReview {
                return fail("deal is not in review");
            }
            if !ctx.actor.role.is_admin() {
                return fail("only an admin may reject");
            }
            if ctx.trimmed_feedback().is_none() {
                return fail("feedback is required when rejecting");
            }
            Ok(DealStatus::Rejected)
        }
        TransitionAction::Reopen => {
            if current != DealStatus::Rejected {
                return fail("only a rejected deal can be reopened");
            }
            if !ctx.actor.role.is_admin() {
                return fail("only an admin may reopen");
            }
            Ok(DealStatus::ChangesRequested)
        }
        TransitionAction::RequestNoteChanges => {
            if current != DealStatus::MeetingDone {
                return fail("meeting notes have not been recorded");
            }
            if !ctx.actor.role.is_admin() {
                return fail("only an admin may request note changes");
            }
            Ok(DealStatus::Approved)
        }
        TransitionAction::MarkCompleted => {
            if current != DealStatus::MeetingDone {
                return fail("meeting notes have not been recorded");
            }
            if !ctx.actor.role.is_admin() {
                return fail("only an admin may mark a deal completed");
            }
            Ok(DealStatus::Completed)
        }
    }
}

/// Whether a transition stores its feedback on the deal (`admin_feedback`).
pub fn carries_feedback(action: TransitionAction) -> bool {
    matches!(
        action,
        TransitionAction::RequestChanges
            | TransitionAction::Reject
            | TransitionAction::RequestNoteChanges
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn employee() -> Profile {
        Profile::new("Aina Rahman", "aina@example.com", Role::Employee)
    }

    fn admin() -> Profile {
        Profile::new("Mei Ling Tan", "mei@example.com", Role::Admin)
    }

    fn ctx<'a>(actor: &'a Profile, is_owner: bool, feedback: Option<&'a str>) -> TransitionCtx<'a> {
        TransitionCtx {
            actor,
            is_owner,
            feedback,
        }
    }

    #[test]
    fn owner_submits_generated_pack() {
        let owner = employee();
        let next = apply(
            DealStatus::PackGenerated,
            TransitionAction::SubmitForReview,
            &ctx(&owner, true, None),
        )
        .unwrap();
        assert_eq!(next, DealStatus::InReview);
    }

    #[test]
    fn owner_resubmits_after_changes_requested() {
        let owner = employee();
        let next = apply(
            DealStatus::ChangesRequested,
            TransitionAction::SubmitForReview,
            &ctx(&owner, true, None),
        )
        .unwrap();
        assert_eq!(next, DealStatus::InReview);
    }

    #[test]
    fn non_owner_cannot_submit() {
        let other = employee();
        let err = apply(
            DealStatus::PackGenerated,
            TransitionAction::SubmitForReview,
            &ctx(&other, false, None),
        )
        .unwrap_err();
        assert!(matches!(err, NegoError::InvalidTransition { .. }));
    }

    #[test]
    fn admin_cannot_submit_on_behalf_of_owner() {
        let reviewer = admin();
        // even an admin that somehow owns the deal: submission is an employee action
        let err = apply(
            DealStatus::PackGenerated,
            TransitionAction::SubmitForReview,
            &ctx(&reviewer, true, None),
        )
        .unwrap_err();
        assert!(matches!(err, NegoError::InvalidTransition { .. }));
    }

    #[test]
    fn draft_cannot_be_submitted() {
        let owner = employee();
        let err = apply(
            DealStatus::Draft,
            TransitionAction::SubmitForReview,
            &ctx(&owner, true, None),
        )
        .unwrap_err();
        assert!(matches!(err, NegoError::InvalidTransition { .. }));
    }

    #[test]
    fn admin_approves_in_review() {
        let reviewer = admin();
        let next = apply(
            DealStatus::InReview,
            TransitionAction::Approve,
            &ctx(&reviewer, false, None),
        )
        .unwrap();
        assert_eq!(next, DealStatus::Approved);
    }

    #[test]
    fn employee_cannot_approve() {
        let owner = employee();
        let err = apply(
            DealStatus::InReview,
            TransitionAction::Approve,
            &ctx(&owner, true, None),
        )
        .unwrap_err();
        assert!(matches!(err, NegoError::InvalidTransition { .. }));
    }

    #[test]
    fn request_changes_requires_feedback() {
        let reviewer = admin();
        for feedback in [None, Some(""), Some("   ")] {
            let err = apply(
                DealStatus::InReview,
                TransitionAction::RequestChanges,
                &ctx(&reviewer, false, feedback),
            )
            .unwrap_err();
            assert!(matches!(err, NegoError::InvalidTransition { .. }));
        }
        let next = apply(
            DealStatus::InReview,
            TransitionAction::RequestChanges,
            &ctx(&reviewer, false, Some("lower the price target")),
        )
        .unwrap();
        assert_eq!(next, DealStatus::ChangesRequested);
    }

    #[test]
    fn reject_requires_feedback() {
        let reviewer = admin();
        let err = apply(
            DealStatus::InReview,
            TransitionAction::Reject,
            &ctx(&reviewer, false, Some("")),
        )
        .unwrap_err();
        assert!(matches!(err, NegoError::InvalidTransition { .. }));

        let next = apply(
            DealStatus::InReview,
            TransitionAction::Reject,
            &ctx(&reviewer, false, Some("supplier failed due diligence")),
        )
        .unwrap();
        assert_eq!(next, DealStatus::Rejected);
    }

    #[test]
    fn rejected_reopens_to_changes_requested() {
        let reviewer = admin();
        let next = apply(
            DealStatus::Rejected,
            TransitionAction::Reopen,
            &ctx(&reviewer, false, None),
        )
        .unwrap();
        assert_eq!(next, DealStatus::ChangesRequested);

        let owner = employee();
        assert!(apply(
            DealStatus::Rejected,
            TransitionAction::Reopen,
            &ctx(&owner, true, None),
        )
        .is_err());
    }

    #[test]
    fn meeting_done_review_cycle() {
        let reviewer = admin();
        let back = apply(
            DealStatus::MeetingDone,
            TransitionAction::RequestNoteChanges,
            &ctx(&reviewer, false, Some("add the discount concession")),
        )
        .unwrap();
        assert_eq!(back, DealStatus::Approved);

        let done = apply(
            DealStatus::MeetingDone,
            TransitionAction::MarkCompleted,
            &ctx(&reviewer, false, None),
        )
        .unwrap();
        assert_eq!(done, DealStatus::Completed);
    }

    #[test]
    fn completed_is_terminal_for_every_action() {
        let reviewer = admin();
        let owner = employee();
        let actions = [
            TransitionAction::SubmitForReview,
            TransitionAction::Approve,
            TransitionAction::RequestChanges,
            TransitionAction::Reject,
            TransitionAction::Reopen,
            TransitionAction::RequestNoteChanges,
            TransitionAction::MarkCompleted,
        ];
        for action in actions {
            assert!(apply(
                DealStatus::Completed,
                action,
                &ctx(&reviewer, false, Some("feedback")),
            )
            .is_err());
            assert!(apply(
                DealStatus::Completed,
                action,
                &ctx(&owner, true, Some("feedback")),
            )
            .is_err());
        }
    }

    #[test]
    fn undefined_pairs_are_rejected() {
        let reviewer = admin();
        // approve outside review
        for status in [
            DealStatus::Draft,
            DealStatus::PackGenerated,
            DealStatus::ChangesRequested,
            DealStatus::Approved,
            DealStatus::MeetingDone,
            DealStatus::Rejected,
        ] {
            assert!(apply(
                status,
                TransitionAction::Approve,
                &ctx(&reviewer, false, None),
            )
            .is_err());
        }
        // complete outside meeting_done
        for status in [
            DealStatus::Draft,
            DealStatus::InReview,
            DealStatus::Approved,
            DealStatus::Rejected,
        ] {
            assert!(apply(
                status,
                TransitionAction::MarkCompleted,
                &ctx(&reviewer, false, None),
            )
            .is_err());
        }
    }

    #[test]
    fn feedback_carrying_actions() {
        assert!(carries_feedback(TransitionAction::RequestChanges));
        assert!(carries_feedback(TransitionAction::Reject));
        assert!(carries_feedback(TransitionAction::RequestNoteChanges));
        assert!(!carries_feedback(TransitionAction::Approve));
        assert!(!carries_feedback(TransitionAction::SubmitForReview));
        assert!(!carries_feedback(TransitionAction::MarkCompleted));
        assert!(!carries_feedback(TransitionAction::Reopen));
    }
}
