use crate::error::Result;
use fictag_core::domain::{StoryId, StoryTagAction, StoryTagLog, Tag, TagId, UserId};
use rusqlite::{params, Connection};

/// Append-only; entries are never updated or removed.
pub struct StoryTagLogsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> StoryTagLogsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn append(
        &self,
        now_utc: i64,
        story_id: StoryId,
        tag: &Tag,
        action: StoryTagAction,
        by_user: Option<UserId>,
    ) -> Result<StoryTagLog> {
        self.conn.execute(
            "INSERT INTO story_tag_logs (story_id, tag_id, tag_name, action, by_user, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                story_id.get(),
                tag.id.get(),
                tag.name,
                action.as_str(),
                by_user.map(|id| id.get()),
                now_utc,
            ],
        )?;
        Ok(StoryTagLog {
            id: self.conn.last_insert_rowid(),
            story_id,
            tag_id: tag.id,
            tag_name: tag.name.clone(),
            action,
            by_user,
            created_at: now_utc,
        })
    }

    /// Newest first.
    pub fn list_for_story(&self, story_id: StoryId) -> Result<Vec<StoryTagLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, story_id, tag_id, tag_name, action, by_user, created_at
             FROM story_tag_logs WHERE story_id = ?1
             ORDER BY created_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([story_id.get()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let action: String = row.get(4)?;
            items.push(StoryTagLog {
                id: row.get(0)?,
                story_id: StoryId(row.get(1)?),
                tag_id: TagId(row.get(2)?),
                tag_name: row.get(3)?,
                action: StoryTagAction::parse(&action)?,
                by_user: row.get::<_, Option<i64>>(5)?.map(UserId),
                created_at: row.get(6)?,
            });
        }
        Ok(items)
    }
}
