//! Negotiation pack persistence. One row per deal, upserted on every
//! successful generation; the first generation on a draft deal also advances
//! the status, atomically with the pack write.

use super::{json_col, uuid_col, Store};
use crate::account::Profile;
use crate::error::{NegoError, Result};
use crate::pack::NegotiationPack;
use crate::types::DealStatus;
use crate::policy;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

fn read_pack(row: &rusqlite::Row<'_>) -> rusqlite::Result<NegotiationPack> {
    Ok(NegotiationPack {
        deal_id: uuid_col(row, 0)?,
        targets: json_col(row, 1)?,
        red_lines: json_col(row, 2)?,
        tradeables: json_col(row, 3)?,
        batna: row.get(4)?,
        questions: json_col(row, 5)?,
        meeting_agenda: row.get(6)?,
        generated_at: row.get(7)?,
    })
}

const PACK_COLS: &str =
    "deal_id, targets, red_lines, tradeables, batna, questions, meeting_agenda, generated_at";

impl Store {
    pub fn get_pack(&self, actor: &Profile, deal_id: Uuid) -> Result<NegotiationPack> {
        // visibility rides on the owning deal
        self.get_deal(actor, deal_id)?;
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PACK_COLS} FROM negotiation_packs WHERE deal_id = ?1"),
            [deal_id.to_string()],
            read_pack,
        )
        .optional()?
        .ok_or_else(|| NegoError::PackNotFound(deal_id.to_string()))
    }

    /// Persist a successfully generated pack.
    ///
    /// Upserts the deal's single pack row. If this is the first pack for a
    /// deal still in `draft`, the status moves to `pack_generated` in the
    /// same transaction; regeneration never changes status. Returns the
    /// stored pack and the deal's (possibly advanced) status.
    pub fn record_generated_pack(
        &self,
        actor: &Profile,
        deal_id: Uuid,
        mut pack: NegotiationPack,
    ) -> Result<(NegotiationPack, DealStatus)> {
        let deal = self.get_deal(actor, deal_id)?;
        policy::ensure_can_generate(actor, &deal)?;
        pack.deal_id = deal_id;
        pack.generated_at = Utc::now();
        pack.validate()?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let had_pack: bool = tx
            .query_row(
                "SELECT COUNT(*) FROM negotiation_packs WHERE deal_id = ?1",
                [deal_id.to_string()],
                |r| r.get::<_, i64>(0),
            )?
            > 0;

        tx.execute(
            &format!(
                "INSERT INTO negotiation_packs ({PACK_COLS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT(deal_id) DO UPDATE SET \
                 targets = excluded.targets, red_lines = excluded.red_lines, \
                 tradeables = excluded.tradeables, batna = excluded.batna, \
                 questions = excluded.questions, meeting_agenda = excluded.meeting_agenda, \
                 generated_at = excluded.generated_at"
            ),
            params![
                pack.deal_id.to_string(),
                serde_json::to_string(&pack.targets)?,
                serde_json::to_string(&pack.red_lines)?,
                serde_json::to_string(&pack.tradeables)?,
                pack.batna,
                serde_json::to_string(&pack.questions)?,
                pack.meeting_agenda,
                pack.generated_at,
            ],
        )?;

        let mut status = deal.status;
        if !had_pack && deal.status == DealStatus::Draft {
            let changed = tx.execute(
                "UPDATE deals SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![
                    DealStatus::PackGenerated.as_str(),
                    Utc::now(),
                    deal_id.to_string(),
                    DealStatus::Draft.as_str(),
                ],
            )?;
            if changed == 0 {
                let actual: String = tx.query_row(
                    "SELECT status FROM deals WHERE id = ?1",
                    [deal_id.to_string()],
                    |r| r.get(0),
                )?;
                // tx drops here and rolls the pack write back with it
                return Err(NegoError::Conflict {
                    expected: DealStatus::Draft.as_str().to_string(),
                    actual,
                });
            }
            status = DealStatus::PackGenerated;
            tracing::info!(deal = %deal_id, "first pack generated, deal advanced");
        }

        tx.commit()?;
        Ok((pack, status))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;

    #[test]
    fn first_generation_advances_draft() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);

        let (pack, status) = store
            .record_generated_pack(&owner, deal.id, testutil::sample_pack(deal.id))
            .unwrap();
        assert_eq!(status, DealStatus::PackGenerated);
        assert_eq!(pack.targets.len(), 2);
        assert_eq!(
            store.get_deal(&owner, deal.id).unwrap().status,
            DealStatus::PackGenerated
        );

        let loaded = store.get_pack(&owner, deal.id).unwrap();
        assert_eq!(loaded.batna, pack.batna);
        assert_eq!(loaded.tradeables, pack.tradeables);
    }

    #[test]
    fn regeneration_overwrites_without_status_change() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);
        store
            .record_generated_pack(&owner, deal.id, testutil::sample_pack(deal.id))
            .unwrap();

        let mut second = testutil::sample_pack(deal.id);
        second.batna = "Bring the workload in-house".into();
        let (_, status) = store
            .record_generated_pack(&owner, deal.id, second)
            .unwrap();
        assert_eq!(status, DealStatus::PackGenerated);

        // still exactly one row, with the new content
        let conn = store.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM negotiation_packs WHERE deal_id = ?1",
                [deal.id.to_string()],
                |r| r.get(0),
            )
            .unwrap();
        drop(conn);
        assert_eq!(count, 1);
        assert_eq!(
            store.get_pack(&owner, deal.id).unwrap().batna,
            "Bring the workload in-house"
        );
    }

    #[test]
    fn generation_blocked_outside_editable_states() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let admin = testutil::admin(&store, "admin@example.com");
        let deal = testutil::deal_in_review(&store, &owner, &admin);

        let err = store
            .record_generated_pack(&owner, deal.id, testutil::sample_pack(deal.id))
            .unwrap_err();
        assert!(matches!(err, NegoError::EditLocked { .. }));
    }

    #[test]
    fn invalid_pack_is_never_persisted() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);

        let mut bad = testutil::sample_pack(deal.id);
        bad.targets.clear();
        assert!(store.record_generated_pack(&owner, deal.id, bad).is_err());

        // nothing written, status untouched
        assert!(matches!(
            store.get_pack(&owner, deal.id),
            Err(NegoError::PackNotFound(_))
        ));
        assert_eq!(
            store.get_deal(&owner, deal.id).unwrap().status,
            DealStatus::Draft
        );
    }

    #[test]
    fn pack_visibility_follows_deal() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let other = testutil::employee(&store, "other@example.com");
        let deal = testutil::generated_deal(&store, &owner);

        assert!(matches!(
            store.get_pack(&other, deal.id),
            Err(NegoError::Forbidden(_))
        ));
    }
}
