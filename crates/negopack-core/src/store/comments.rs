//! Append-only stakeholder comments, listed newest first.

use super::{uuid_col, Store};
use crate::account::Profile;
use crate::comment::StakeholderComment;
use crate::error::{NegoError, Result};
use rusqlite::params;
use uuid::Uuid;

const COMMENT_COLS: &str = "id, deal_id, author_id, author_name, comment, section, created_at";

fn read_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<StakeholderComment> {
    Ok(StakeholderComment {
        id: uuid_col(row, 0)?,
        deal_id: uuid_col(row, 1)?,
        author_id: uuid_col(row, 2)?,
        author_name: row.get(3)?,
        comment: row.get(4)?,
        section: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Store {
    pub fn add_comment(
        &self,
        actor: &Profile,
        deal_id: Uuid,
        comment: &str,
        section: &str,
    ) -> Result<StakeholderComment> {
        if comment.trim().is_empty() {
            return Err(NegoError::Validation("comment is required".into()));
        }
        // anyone who can see the deal may comment
        self.get_deal(actor, deal_id)?;

        let section = if section.trim().is_empty() {
            "general"
        } else {
            section.trim()
        };
        let record = StakeholderComment::new(
            deal_id,
            actor.id,
            actor.full_name.clone(),
            comment.trim(),
            section,
        );
        let conn = self.conn();
        conn.execute(
            &format!("INSERT INTO stakeholder_comments ({COMMENT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                record.id.to_string(),
                record.deal_id.to_string(),
                record.author_id.to_string(),
                record.author_name,
                record.comment,
                record.section,
                record.created_at,
            ],
        )?;
        Ok(record)
    }

    pub fn list_comments(&self, actor: &Profile, deal_id: Uuid) -> Result<Vec<StakeholderComment>> {
        self.get_deal(actor, deal_id)?;
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMMENT_COLS} FROM stakeholder_comments \
             WHERE deal_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([deal_id.to_string()], read_comment)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;

    #[test]
    fn comments_list_newest_first() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);

        let first = store
            .add_comment(&owner, deal.id, "First pass looks fine", "general")
            .unwrap();
        let second = store
            .add_comment(&owner, deal.id, "Red line 2 needs legal", "red_lines")
            .unwrap();

        let listed = store.list_comments(&owner, deal.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert!(listed.iter().any(|c| c.id == first.id));
        assert!(listed.iter().any(|c| c.id == second.id));
    }

    #[test]
    fn empty_comment_rejected() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);
        assert!(matches!(
            store.add_comment(&owner, deal.id, "   ", "general"),
            Err(NegoError::Validation(_))
        ));
    }

    #[test]
    fn blank_section_defaults_to_general() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);
        let c = store.add_comment(&owner, deal.id, "ok", "").unwrap();
        assert_eq!(c.section, "general");
    }

    #[test]
    fn commenting_requires_visibility() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let other = testutil::employee(&store, "other@example.com");
        let admin = testutil::admin(&store, "admin@example.com");
        let deal = testutil::draft_deal(&store, &owner);

        assert!(matches!(
            store.add_comment(&other, deal.id, "hello", "general"),
            Err(NegoError::Forbidden(_))
        ));
        assert!(store.add_comment(&admin, deal.id, "hello", "general").is_ok());
        assert!(matches!(
            store.list_comments(&other, deal.id),
            Err(NegoError::Forbidden(_))
        ));
    }

    #[test]
    fn author_name_is_denormalized() {
        let store = testutil::store();
        let owner = testutil::employee(&store, "owner@example.com");
        let deal = testutil::draft_deal(&store, &owner);
        let c = store.add_comment(&owner, deal.id, "note", "general").unwrap();
        assert_eq!(c.author_name, owner.full_name);
    }
}
