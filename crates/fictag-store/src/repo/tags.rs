use crate::error::{Result, StoreError};
use fictag_core::domain::{StoryId, Tag, TagCategoryId, TagId, TagSort, UserId};
use rusqlite::{params, params_from_iter, Connection};

pub(crate) const TAG_COLUMNS: &str = "tags.id, tags.name, tags.iname, tags.category_id, tags.description, \
     tags.is_spoiler, tags.is_extreme_tag, tags.is_alias_for, tags.is_hidden_alias, \
     tags.reason_to_blacklist, tags.stories_count, tags.published_stories_count, \
     tags.created_at, tags.updated_at, tags.created_by";

const CANONICAL: &str = "tags.is_alias_for IS NULL AND tags.reason_to_blacklist = ''";

#[derive(Debug, Clone)]
pub struct TagNewRow {
    pub name: String,
    pub iname: String,
    pub category_id: Option<TagCategoryId>,
    pub description: String,
    pub is_spoiler: bool,
    pub is_extreme_tag: bool,
    pub created_by: Option<UserId>,
}

pub struct TagsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TagsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, now_utc: i64, input: TagNewRow) -> Result<Tag> {
        self.conn.execute(
            "INSERT INTO tags (name, iname, category_id, description, is_spoiler, is_extreme_tag, created_at, updated_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8);",
            params![
                input.name,
                input.iname,
                input.category_id.map(|id| id.get()),
                input.description,
                input.is_spoiler,
                input.is_extreme_tag,
                now_utc,
                input.created_by.map(|id| id.get()),
            ],
        )?;
        let id = TagId(self.conn.last_insert_rowid());
        self.require(id)
    }

    pub fn get(&self, id: TagId) -> Result<Option<Tag>> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE tags.id = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(tag_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn require(&self, id: TagId) -> Result<Tag> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("tag {id}")))
    }

    pub fn get_by_iname(&self, iname: &str) -> Result<Option<Tag>> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE tags.iname = ?1;");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query([iname])?;
        if let Some(row) = rows.next()? {
            Ok(Some(tag_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Multi-key lookup; relies on the binary collation of `tags.iname`.
    pub fn list_by_inames(&self, inames: &[&str]) -> Result<Vec<Tag>> {
        if inames.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; inames.len()].join(", ");
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE tags.iname IN ({placeholders});");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(inames.iter()))?;
        collect_tags(&mut rows)
    }

    /// Writes every mutable column except the story counters, which only move
    /// through [`TagsRepo::adjust_counts`].
    pub fn save(&self, tag: &Tag) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE tags SET name = ?2, iname = ?3, category_id = ?4, description = ?5,
                 is_spoiler = ?6, is_extreme_tag = ?7, is_alias_for = ?8, is_hidden_alias = ?9,
                 reason_to_blacklist = ?10, updated_at = ?11
             WHERE id = ?1;",
            params![
                tag.id.get(),
                tag.name,
                tag.iname,
                tag.category_id.map(|id| id.get()),
                tag.description,
                tag.is_spoiler,
                tag.is_extreme_tag,
                tag.is_alias_for.map(|id| id.get()),
                tag.is_hidden_alias,
                tag.reason_to_blacklist,
                tag.updated_at,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("tag {}", tag.id)));
        }
        Ok(())
    }

    pub fn adjust_counts(&self, id: TagId, stories: i64, published: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE tags SET stories_count = MAX(stories_count + ?2, 0),
                 published_stories_count = MAX(published_stories_count + ?3, 0)
             WHERE id = ?1;",
            params![id.get(), stories, published],
        )?;
        Ok(())
    }

    /// Recomputes both counters from story associations. Returns the number
    /// of rows whose counters changed.
    pub fn recount(&self, id: Option<TagId>) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE tags SET
                 stories_count = (SELECT COUNT(*) FROM story_tags st WHERE st.tag_id = tags.id),
                 published_stories_count = (
                     SELECT COUNT(*) FROM story_tags st
                     INNER JOIN stories s ON s.id = st.story_id
                     WHERE st.tag_id = tags.id AND s.published = 1
                 )
             WHERE (?1 IS NULL OR tags.id = ?1)
               AND (stories_count <> (SELECT COUNT(*) FROM story_tags st WHERE st.tag_id = tags.id)
                 OR published_stories_count <> (
                     SELECT COUNT(*) FROM story_tags st
                     INNER JOIN stories s ON s.id = st.story_id
                     WHERE st.tag_id = tags.id AND s.published = 1
                 ));",
            [id.map(|id| id.get())],
        )?;
        Ok(changed)
    }

    pub fn delete(&self, id: TagId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1;", [id.get()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("tag {id}")));
        }
        Ok(())
    }

    pub fn list_all(&self, sort: TagSort) -> Result<Vec<Tag>> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY {};", order_by(sort));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        collect_tags(&mut rows)
    }

    pub fn list_canonical(&self, sort: TagSort) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE {CANONICAL} ORDER BY {};",
            order_by(sort)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        collect_tags(&mut rows)
    }

    pub fn list_blacklisted(&self) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE tags.reason_to_blacklist <> '' ORDER BY tags.iname ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        collect_tags(&mut rows)
    }

    /// Aliases pointing at any of `targets`, ordered by key.
    pub fn aliases_of(&self, targets: &[TagId], include_hidden: bool) -> Result<Vec<Tag>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; targets.len()].join(", ");
        let hidden_filter = if include_hidden {
            ""
        } else {
            " AND tags.is_hidden_alias = 0"
        };
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             WHERE tags.is_alias_for IN ({placeholders}){hidden_filter}
             ORDER BY tags.iname ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(targets.iter().map(|id| id.get())))?;
        collect_tags(&mut rows)
    }

    /// Canonical tags whose key starts with `prefix`, most used first.
    pub fn canonical_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             WHERE substr(tags.iname, 1, ?2) = ?1 AND {CANONICAL}
             ORDER BY tags.published_stories_count DESC, tags.iname ASC
             LIMIT ?3;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![
            prefix,
            prefix.chars().count() as i64,
            limit as i64
        ])?;
        collect_tags(&mut rows)
    }

    pub fn aliases_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             WHERE substr(tags.iname, 1, ?2) = ?1 AND tags.is_alias_for IS NOT NULL
             ORDER BY tags.iname ASC
             LIMIT ?3;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![
            prefix,
            prefix.chars().count() as i64,
            limit as i64
        ])?;
        collect_tags(&mut rows)
    }

    pub fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             INNER JOIN story_tags ON story_tags.tag_id = tags.id
             WHERE story_tags.story_id = ?1
             ORDER BY tags.iname ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([story_id.get()])?;
        collect_tags(&mut rows)
    }
}

fn order_by(sort: TagSort) -> &'static str {
    match sort {
        TagSort::Name => "tags.iname ASC",
        TagSort::Date => "tags.created_at DESC, tags.id DESC",
        TagSort::Stories => "tags.published_stories_count DESC, tags.iname ASC",
    }
}

fn collect_tags(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(tag_from_row(row)?);
    }
    Ok(tags)
}

pub(crate) fn tag_from_row(row: &rusqlite::Row<'_>) -> Result<Tag> {
    Ok(Tag {
        id: TagId(row.get(0)?),
        name: row.get(1)?,
        iname: row.get(2)?,
        category_id: row.get::<_, Option<i64>>(3)?.map(TagCategoryId),
        description: row.get(4)?,
        is_spoiler: row.get(5)?,
        is_extreme_tag: row.get(6)?,
        is_alias_for: row.get::<_, Option<i64>>(7)?.map(TagId),
        is_hidden_alias: row.get(8)?,
        reason_to_blacklist: row.get(9)?,
        stories_count: row.get(10)?,
        published_stories_count: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
        created_by: row.get::<_, Option<i64>>(14)?.map(UserId),
    })
}
