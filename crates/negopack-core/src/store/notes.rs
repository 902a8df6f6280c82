//! Meeting-notes persistence. One row per deal, upserted; saving notes on an
//! `approved` deal advances it to `meeting_done` within the same transaction.

use super::{json_col, uuid_col, Store};
use crate::account::Profile;
use crate::error::{NegoError, Result};
use crate::meeting::{MeetingNotes, MeetingNotesInput};
use crate::policy;
use crate::types::DealStatus;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

const NOTES_COLS: &str = "deal_id, meeting_date, location, attendees, discussion_points, \
                          decisions_made, concessions_granted, concessions_received, \
                          next_steps, updated_at";

fn read_notes(row: &rusqlite::Row<'_>) -> rusqlite::Result<MeetingNotes> {
    Ok(MeetingNotes {
        deal_id: uuid_col(row, 0)?,
        meeting_date: row.get(1)?,
        location: row.get(2)?,
        attendees: json_col(row, 3)?,
        discussion_points: row.get(4)?,
        decisions_made: row.get(5)?,
        concessions_granted: json_col(row, 6)?,
        concessions_received: json_col(row, 7)?,
        next_steps: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Store {
    pub fn get_meeting_notes(&self, actor: &Profile, deal_id: Uuid) -> Result<MeetingNotes> {
        self.get_deal(actor, deal_id)?;
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {NOTES_COLS} FROM meeting_notes WHERE deal_id = ?1"),
            [deal_id.to_string()],
            read_notes,
        )
        .optional()?
        .ok_or_else(|| NegoError::NotesNotFound(deal_id.to_string()))
    }

    /// Create or update the deal's meeting notes.
    ///
    /// Permitted to the owner or an admin while the status window allows it.
    /// Returns the stored notes and the deal status, which moves from
    /// `approved` to `meeting_done` as a side effect of the first save after
    /// approval.
    pub fn upsert_meeting_notes(
        &self,
        actor: &Profile,
        deal_id: Uuid,
        input: MeetingNotesInput,
    ) -> Result<(MeetingNotes, DealStatus)> {
        let deal = self.get_deal(actor, deal_id)?;
        policy::ensure_notes_editable(actor, &deal)?;

        let now = Utc::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO meeting_notes ({NOTES_COLS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
                 ON CONFLICT(deal_id) DO UPDATE SET \
                 meeting_date = excluded.meeting_date, location = excluded.location, \
                 attendees = excluded.attendees, \
                 discussion_points = excluded.discussion_points, \
                 decisions_made = excluded.decisions_made, \
                 concessions_granted = excluded.concessions_granted, \
                 concessions_received = excluded.concessions_received, \
                 next_steps = excluded.next_steps, updated_at = excluded.updated_at"
            ),
            params![
                deal_id.to_string(),
                input.meeting_date,
                input.location,
                serde_json::to_string(&input.attendees)?,
                input.discussion_points,
                input.decisions_made,
                serde_json::to_string(&input.concessions_granted)?,
                serde_json::to_string(&input.concessions_received)?,
                input.next_steps,
                now,
            ],
        )?;

        let mut status = deal.status;
        if deal.status == DealStatus::Approved {
            let changed = tx.execute(
                "UPDATE deals SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![
                    DealStatus::MeetingDone.as_str(),
                    now,
                    deal_id.to_string(),
                    DealStatus::Approved.as_str(),
                ],
            )?;
            if changed == 0 {
                let actual: String = tx.query_row(
                    "SELECT status FROM deals WHERE id = ?1",
                    [deal_id.to_string()],
                    |r| r.get(0),
                )?;
                return Err(NegoError::Conflict {
                    expected: DealStatus::Approved.as_str().to_string(),
                    actual,
                });
            }
            status = DealStatus::MeetingDone;
        }

        tx.commit()?;
        drop(conn);
        self.get_meeting_notes(actor, deal_id).map(|n| (n, status))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;
    use crate::types::TransitionAction;

    #[test]
    fn saving_notes_on_approved_advances_to_meeting_done() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let admin = testutil::admin(&store, "admin@example.com");
        let deal = testutil::approved_deal(&store, &owner, &admin);

        let (notes, status) = store
            .upsert_meeting_notes(&owner, deal.id, testutil::notes_input())
            .unwrap();
        assert_eq!(status, DealStatus::MeetingDone);
        assert_eq!(notes.location, "Penang office, room 3");
        assert_eq!(
            store.get_deal(&owner, deal.id).unwrap().status,
            DealStatus::MeetingDone
        );
    }

    #[test]
    fn resaving_notes_keeps_meeting_done() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let admin = testutil::admin(&store, "admin@example.com");
        let deal = testutil::approved_deal(&store, &owner, &admin);
        store
            .upsert_meeting_notes(&owner, deal.id, testutil::notes_input())
            .unwrap();

        let mut input = testutil::notes_input();
        input.next_steps = "Circulate revised contract by Friday".into();
        let (notes, status) = store
            .upsert_meeting_notes(&owner, deal.id, input)
            .unwrap();
        assert_eq!(status, DealStatus::MeetingDone);
        assert_eq!(notes.next_steps, "Circulate revised contract by Friday");

        // one row only
        let conn = store.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM meeting_notes WHERE deal_id = ?1",
                [deal.id.to_string()],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn notes_blocked_outside_window() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let admin = testutil::admin(&store, "admin@example.com");

        // draft: blocked
        let draft = testutil::draft_deal(&store, &owner);
        assert!(matches!(
            store.upsert_meeting_notes(&owner, draft.id, testutil::notes_input()),
            Err(NegoError::EditLocked { .. })
        ));

        // completed: blocked
        let deal = testutil::approved_deal(&store, &owner, &admin);
        store
            .upsert_meeting_notes(&owner, deal.id, testutil::notes_input())
            .unwrap();
        store
            .transition(&admin, deal.id, TransitionAction::MarkCompleted, None, None)
            .unwrap();
        assert!(matches!(
            store.upsert_meeting_notes(&owner, deal.id, testutil::notes_input()),
            Err(NegoError::EditLocked { .. })
        ));
    }

    #[test]
    fn pack_generated_allows_notes_without_status_change() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::generated_deal(&store, &owner);

        let (_, status) = store
            .upsert_meeting_notes(&owner, deal.id, testutil::notes_input())
            .unwrap();
        assert_eq!(status, DealStatus::PackGenerated);
    }

    #[test]
    fn admin_may_save_notes_on_any_deal() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let admin = testutil::admin(&store, "admin@example.com");
        let deal = testutil::approved_deal(&store, &owner, &admin);

        let (_, status) = store
            .upsert_meeting_notes(&admin, deal.id, testutil::notes_input())
            .unwrap();
        assert_eq!(status, DealStatus::MeetingDone);
    }

    #[test]
    fn notes_roundtrip_structured_fields() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::generated_deal(&store, &owner);

        let input = testutil::notes_input();
        store.upsert_meeting_notes(&owner, deal.id, input.clone()).unwrap();
        let notes = store.get_meeting_notes(&owner, deal.id).unwrap();
        assert_eq!(notes.attendees, input.attendees);
        assert_eq!(notes.concessions_granted, input.concessions_granted);
        assert_eq!(notes.meeting_date, input.meeting_date);
    }
}
