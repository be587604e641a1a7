use crate::error::Result;
use fictag_core::domain::{StoryId, StoryTag, StoryTagId, TagId};
use rusqlite::{params, Connection};

pub struct StoryTagsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> StoryTagsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, story_id: StoryId, tag_id: TagId) -> Result<Option<StoryTag>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, story_id, tag_id, created_at FROM story_tags
             WHERE story_id = ?1 AND tag_id = ?2;",
        )?;
        let mut rows = stmt.query(params![story_id.get(), tag_id.get()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(story_tag_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_for_story(&self, story_id: StoryId) -> Result<Vec<StoryTag>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, story_id, tag_id, created_at FROM story_tags
             WHERE story_id = ?1 ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([story_id.get()])?;
        collect(&mut rows)
    }

    pub fn list_for_tag(&self, tag_id: TagId) -> Result<Vec<StoryTag>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, story_id, tag_id, created_at FROM story_tags
             WHERE tag_id = ?1 ORDER BY story_id ASC;",
        )?;
        let mut rows = stmt.query([tag_id.get()])?;
        collect(&mut rows)
    }

    pub fn insert(&self, now_utc: i64, story_id: StoryId, tag_id: TagId) -> Result<StoryTag> {
        self.conn.execute(
            "INSERT INTO story_tags (story_id, tag_id, created_at) VALUES (?1, ?2, ?3);",
            params![story_id.get(), tag_id.get(), now_utc],
        )?;
        Ok(StoryTag {
            id: StoryTagId(self.conn.last_insert_rowid()),
            story_id,
            tag_id,
            created_at: now_utc,
        })
    }

    pub fn repoint(&self, id: StoryTagId, tag_id: TagId) -> Result<()> {
        self.conn.execute(
            "UPDATE story_tags SET tag_id = ?2 WHERE id = ?1;",
            params![id.get(), tag_id.get()],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: StoryTagId) -> Result<()> {
        self.conn
            .execute("DELETE FROM story_tags WHERE id = ?1;", [id.get()])?;
        Ok(())
    }
}

fn collect(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<StoryTag>> {
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(story_tag_from_row(row)?);
    }
    Ok(items)
}

fn story_tag_from_row(row: &rusqlite::Row<'_>) -> Result<StoryTag> {
    Ok(StoryTag {
        id: StoryTagId(row.get(0)?),
        story_id: StoryId(row.get(1)?),
        tag_id: TagId(row.get(2)?),
        created_at: row.get(3)?,
    })
}
