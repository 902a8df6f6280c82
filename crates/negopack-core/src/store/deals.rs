//! Deal CRUD and the persisted side of the status state machine.
//!
//! Every status write runs as `UPDATE … WHERE id = ? AND status = <expected>`
//! so a transition raced by another user fails with `Conflict` instead of
//! clobbering their write.

use super::{parsed_col, uuid_col, Store};
use crate::account::Profile;
use crate::deal::{Deal, DealIntake};
use crate::error::{NegoError, Result};
use crate::types::TransitionAction;
use crate::{lifecycle, policy};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

const DEAL_COLS: &str = "id, owner_id, supplier_id, title, scope, pricing_model, deal_value, \
                         deadline, key_issues, desired_outcomes, status, admin_feedback, \
                         created_at, updated_at";

pub(super) fn read_deal(row: &rusqlite::Row<'_>) -> rusqlite::Result<Deal> {
    Ok(Deal {
        id: uuid_col(row, 0)?,
        owner_id: uuid_col(row, 1)?,
        supplier_id: uuid_col(row, 2)?,
        title: row.get(3)?,
        scope: row.get(4)?,
        pricing_model: parsed_col(row, 5)?,
        deal_value: row.get(6)?,
        deadline: row.get(7)?,
        key_issues: row.get(8)?,
        desired_outcomes: row.get(9)?,
        status: parsed_col(row, 10)?,
        admin_feedback: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

impl Store {
    pub fn create_deal(&self, actor: &Profile, intake: DealIntake) -> Result<Deal> {
        intake.validate()?;
        // fail with a supplier error rather than a bare FK violation
        self.get_supplier(intake.supplier_id)?;

        let deal = Deal::new(actor.id, intake);
        let conn = self.conn();
        conn.execute(
            &format!("INSERT INTO deals ({DEAL_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"),
            params![
                deal.id.to_string(),
                deal.owner_id.to_string(),
                deal.supplier_id.to_string(),
                deal.title,
                deal.scope,
                deal.pricing_model.as_str(),
                deal.deal_value,
                deal.deadline,
                deal.key_issues,
                deal.desired_outcomes,
                deal.status.as_str(),
                deal.admin_feedback,
                deal.created_at,
                deal.updated_at,
            ],
        )?;
        tracing::info!(deal = %deal.id, owner = %deal.owner_id, "deal created");
        Ok(deal)
    }

    /// Fetch by id without a visibility check. Store-internal only.
    pub(super) fn fetch_deal(&self, id: Uuid) -> Result<Deal> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {DEAL_COLS} FROM deals WHERE id = ?1"),
            [id.to_string()],
            read_deal,
        )
        .optional()?
        .ok_or_else(|| NegoError::DealNotFound(id.to_string()))
    }

    pub fn get_deal(&self, actor: &Profile, id: Uuid) -> Result<Deal> {
        let deal = self.fetch_deal(id)?;
        policy::ensure_can_view(actor, &deal)?;
        Ok(deal)
    }

    /// Deals the actor may see, newest first. Admins get the whole
    /// organization; employees get only their own.
    pub fn list_deals(&self, actor: &Profile) -> Result<Vec<Deal>> {
        let conn = self.conn();
        match policy::list_owner_filter(actor) {
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {DEAL_COLS} FROM deals ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map([], read_deal)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
            Some(owner) => {
                let mut stmt = stmt_owned(&conn)?;
                let rows = stmt.query_map([owner.to_string()], read_deal)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
        }
    }

    /// Update intake fields. Owner-only, and only while the status still
    /// allows editing; carries an expected-status precondition like any
    /// other status-sensitive write.
    pub fn update_intake(&self, actor: &Profile, id: Uuid, intake: DealIntake) -> Result<Deal> {
        intake.validate()?;
        let deal = self.fetch_deal(id)?;
        policy::ensure_can_view(actor, &deal)?;
        policy::ensure_intake_editable(actor, &deal)?;
        self.get_supplier(intake.supplier_id)?;

        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE deals SET supplier_id = ?1, title = ?2, scope = ?3, pricing_model = ?4, \
                 deal_value = ?5, deadline = ?6, key_issues = ?7, desired_outcomes = ?8, \
                 updated_at = ?9 WHERE id = ?10 AND status = ?11",
                params![
                    intake.supplier_id.to_string(),
                    intake.title,
                    intake.scope,
                    intake.pricing_model.as_str(),
                    intake.deal_value,
                    intake.deadline,
                    intake.key_issues,
                    intake.desired_outcomes,
                    Utc::now(),
                    id.to_string(),
                    deal.status.as_str(),
                ],
            )?
        };
        if changed == 0 {
            let current = self.fetch_deal(id)?;
            return Err(NegoError::Conflict {
                expected: deal.status.as_str().to_string(),
                actual: current.status.as_str().to_string(),
            });
        }
        self.fetch_deal(id)
    }

    /// Remove a deal and, through cascade, its pack, notes, and comments.
    pub fn delete_deal(&self, actor: &Profile, id: Uuid) -> Result<()> {
        let deal = self.fetch_deal(id)?;
        policy::ensure_can_delete(actor, &deal)?;
        let conn = self.conn();
        conn.execute("DELETE FROM deals WHERE id = ?1", [id.to_string()])?;
        tracing::info!(deal = %id, actor = %actor.id, "deal deleted");
        Ok(())
    }

    /// Apply an explicit status transition.
    ///
    /// `expected` is the status the caller last observed; when supplied and
    /// the deal has since moved on, the attempt fails with `Conflict` before
    /// the state machine runs. Guards are then checked by the machine and the
    /// write itself re-asserts the current status, so even an interleaved
    /// writer between read and update cannot cause a lost transition.
    pub fn transition(
        &self,
        actor: &Profile,
        id: Uuid,
        action: TransitionAction,
        feedback: Option<&str>,
        expected: Option<crate::types::DealStatus>,
    ) -> Result<Deal> {
        let deal = self.get_deal(actor, id)?;
        if let Some(expected) = expected {
            if expected != deal.status {
                return Err(NegoError::Conflict {
                    expected: expected.as_str().to_string(),
                    actual: deal.status.as_str().to_string(),
                });
            }
        }
        let ctx = lifecycle::TransitionCtx {
            actor,
            is_owner: deal.owner_id == actor.id,
            feedback,
        };
        let next = lifecycle::apply(deal.status, action, &ctx)?;

        let feedback_update = if lifecycle::carries_feedback(action) {
            feedback.map(str::trim).filter(|f| !f.is_empty())
        } else {
            None
        };

        let changed = {
            let conn = self.conn();
            match feedback_update {
                Some(fb) => conn.execute(
                    "UPDATE deals SET status = ?1, admin_feedback = ?2, updated_at = ?3 \
                     WHERE id = ?4 AND status = ?5",
                    params![
                        next.as_str(),
                        fb,
                        Utc::now(),
                        id.to_string(),
                        deal.status.as_str(),
                    ],
                )?,
                None => conn.execute(
                    "UPDATE deals SET status = ?1, updated_at = ?2 \
                     WHERE id = ?3 AND status = ?4",
                    params![next.as_str(), Utc::now(), id.to_string(), deal.status.as_str()],
                )?,
            }
        };
        if changed == 0 {
            let current = self.fetch_deal(id)?;
            return Err(NegoError::Conflict {
                expected: deal.status.as_str().to_string(),
                actual: current.status.as_str().to_string(),
            });
        }

        tracing::info!(deal = %id, from = %deal.status, to = %next, %action, "deal transitioned");
        self.fetch_deal(id)
    }
}

fn stmt_owned(conn: &rusqlite::Connection) -> rusqlite::Result<rusqlite::Statement<'_>> {
    conn.prepare(&format!(
        "SELECT {DEAL_COLS} FROM deals WHERE owner_id = ?1 ORDER BY created_at DESC"
    ))
}
