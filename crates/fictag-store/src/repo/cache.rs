use crate::error::Result;
use crate::uow::SuggestionCache;
use rusqlite::{params, Connection, OptionalExtension};

pub struct CacheRepo<'a> {
    conn: &'a Connection,
    now_utc: i64,
}

impl<'a> CacheRepo<'a> {
    pub fn new(conn: &'a Connection, now_utc: i64) -> Self {
        Self { conn, now_utc }
    }
}

impl SuggestionCache for CacheRepo<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO cache_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at;",
            params![key, value, self.now_utc],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM cache_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
