use crate::error::{invalid, Result, StoreError};
use fictag_core::domain::{Story, StoryId};
use rusqlite::{params, Connection};

pub struct StoriesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> StoriesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, title: &str, published: bool) -> Result<Story> {
        let title = title.trim();
        if title.is_empty() {
            return Err(invalid("title", "Title is required"));
        }
        self.conn.execute(
            "INSERT INTO stories (title, published, created_at, updated_at) VALUES (?1, ?2, ?3, ?3);",
            params![title, published, now_utc],
        )?;
        self.require(StoryId(self.conn.last_insert_rowid()))
    }

    pub fn get(&self, id: StoryId) -> Result<Option<Story>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, published, created_at, updated_at FROM stories WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(story_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn require(&self, id: StoryId) -> Result<Story> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("story {id}")))
    }

    pub fn list(&self) -> Result<Vec<Story>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, published, created_at, updated_at FROM stories ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut stories = Vec::new();
        while let Some(row) = rows.next()? {
            stories.push(story_from_row(row)?);
        }
        Ok(stories)
    }

    /// Flips the published flag and moves `published_stories_count` of every
    /// attached tag along with it.
    pub fn set_published(&self, now_utc: i64, id: StoryId, published: bool) -> Result<Story> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let story = set_published_inner(&tx, now_utc, id, published)?;
            tx.commit()?;
            Ok(story)
        } else {
            set_published_inner(self.conn, now_utc, id, published)
        }
    }
}

fn set_published_inner(
    conn: &Connection,
    now_utc: i64,
    id: StoryId,
    published: bool,
) -> Result<Story> {
    let repo = StoriesRepo::new(conn);
    let story = repo.require(id)?;
    if story.published == published {
        return Ok(story);
    }

    let delta: i64 = if published { 1 } else { -1 };
    conn.execute(
        "UPDATE tags SET published_stories_count = MAX(published_stories_count + ?1, 0)
         WHERE id IN (SELECT tag_id FROM story_tags WHERE story_id = ?2);",
        params![delta, id.get()],
    )?;
    conn.execute(
        "UPDATE stories SET published = ?1, updated_at = ?2 WHERE id = ?3;",
        params![published, now_utc, id.get()],
    )?;
    repo.require(id)
}

fn story_from_row(row: &rusqlite::Row<'_>) -> Result<Story> {
    Ok(Story {
        id: StoryId(row.get(0)?),
        title: row.get(1)?,
        published: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
