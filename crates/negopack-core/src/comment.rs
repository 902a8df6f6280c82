use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// StakeholderComment
// ---------------------------------------------------------------------------

/// Append-only alignment comment on a deal. No update or delete; ordering is
/// by creation time, newest first for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeholderComment {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub author_id: Uuid,
    /// Denormalized for display so the live feed needs no profile join.
    pub author_name: String,
    pub comment: String,
    pub section: String,
    pub created_at: DateTime<Utc>,
}

impl StakeholderComment {
    pub fn new(
        deal_id: Uuid,
        author_id: Uuid,
        author_name: impl Into<String>,
        comment: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deal_id,
            author_id,
            author_name: author_name.into(),
            comment: comment.into(),
            section: section.into(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// merge_live
// ---------------------------------------------------------------------------

/// Fold a live-delivered comment into an already fetched list.
///
/// Live delivery is at-least-once and not ordered, so duplicates are dropped
/// by id and the incoming comment is placed by `created_at`, newest first.
pub fn merge_live(comments: &mut Vec<StakeholderComment>, incoming: StakeholderComment) {
    if comments.iter().any(|c| c.id == incoming.id) {
        return;
    }
    let pos = comments
        .iter()
        .position(|c| c.created_at <= incoming.created_at)
        .unwrap_or(comments.len());
    comments.insert(pos, incoming);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn comment_at(offset_secs: i64) -> StakeholderComment {
        let mut c = StakeholderComment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Farid",
            "Red line two needs legal review",
            "general",
        );
        c.created_at = Utc::now() + Duration::seconds(offset_secs);
        c
    }

    #[test]
    fn duplicate_delivery_is_dropped() {
        let c = comment_at(0);
        let mut list = vec![c.clone()];
        merge_live(&mut list, c);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn out_of_order_delivery_sorts_newest_first() {
        let older = comment_at(-60);
        let newer = comment_at(0);
        let mut list = vec![newer.clone()];
        merge_live(&mut list, older.clone());
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, newer.id);
        assert_eq!(list[1].id, older.id);

        // and the reverse arrival order lands in the same layout
        let mut list = vec![older.clone()];
        merge_live(&mut list, newer.clone());
        assert_eq!(list[0].id, newer.id);
        assert_eq!(list[1].id, older.id);
    }

    #[test]
    fn merge_into_empty_list() {
        let mut list = Vec::new();
        merge_live(&mut list, comment_at(0));
        assert_eq!(list.len(), 1);
    }
}
