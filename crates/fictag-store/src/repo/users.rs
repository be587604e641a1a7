use crate::error::{invalid, Result, StoreError};
use fictag_core::domain::{User, UserId};
use rusqlite::{params, Connection};

pub struct UsersRepo<'a> {
    conn: &'a Connection,
}

impl<'a> UsersRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, username: &str, is_staff: bool) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(invalid("username", "Username is required"));
        }
        if self.get_by_username(username)?.is_some() {
            return Err(invalid("username", "Username is taken"));
        }
        self.conn.execute(
            "INSERT INTO users (username, is_staff, created_at) VALUES (?1, ?2, ?3);",
            params![username, is_staff, now_utc],
        )?;
        self.require(UserId(self.conn.last_insert_rowid()))
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, is_staff, created_at FROM users WHERE id = ?1;")?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(user_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn require(&self, id: UserId) -> Result<User> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, is_staff, created_at FROM users WHERE username = ?1;",
        )?;
        let mut rows = stmt.query([username.trim()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(user_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, is_staff, created_at FROM users ORDER BY username ASC;")?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(user_from_row(row)?);
        }
        Ok(users)
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        is_staff: row.get(2)?,
        created_at: row.get(3)?,
    })
}
