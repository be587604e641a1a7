use crate::error::{invalid, Result, StoreError};
use fictag_core::domain::{TagCategory, TagCategoryId};
use fictag_core::normalize_display_name;
use rusqlite::{params, Connection};

pub struct CategoriesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CategoriesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, name: &str, description: &str) -> Result<TagCategory> {
        let name = normalize_display_name(name);
        if name.is_empty() {
            return Err(invalid("name", "Category name is required"));
        }
        if self.get_by_name(&name)?.is_some() {
            return Err(invalid("name", "Category with this name already exists"));
        }
        self.conn.execute(
            "INSERT INTO tag_categories (name, description, created_at) VALUES (?1, ?2, ?3);",
            params![name, description.trim(), now_utc],
        )?;
        self.require(TagCategoryId(self.conn.last_insert_rowid()))
    }

    pub fn get(&self, id: TagCategoryId) -> Result<Option<TagCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM tag_categories WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(category_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn require(&self, id: TagCategoryId) -> Result<TagCategory> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("category {id}")))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<TagCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM tag_categories
             WHERE name = ?1 COLLATE NOCASE;",
        )?;
        let mut rows = stmt.query([name.trim()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(category_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Categories in display order.
    pub fn list(&self) -> Result<Vec<TagCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at FROM tag_categories ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(category_from_row(row)?);
        }
        Ok(categories)
    }
}

fn category_from_row(row: &rusqlite::Row<'_>) -> Result<TagCategory> {
    Ok(TagCategory {
        id: TagCategoryId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}
