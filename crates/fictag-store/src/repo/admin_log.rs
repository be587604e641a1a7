use crate::audit::{AuditObject, AuditSink};
use crate::error::{Result, StoreError};
use fictag_core::domain::{User, UserId};
use rusqlite::{params, Connection};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Addition,
    Change,
    Deletion,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Addition => "addition",
            AdminAction::Change => "change",
            AdminAction::Deletion => "deletion",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "addition" => Ok(AdminAction::Addition),
            "change" => Ok(AdminAction::Change),
            "deletion" => Ok(AdminAction::Deletion),
            other => Err(StoreError::Migration(format!(
                "unknown admin log action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminLogEntry {
    pub id: i64,
    pub actor_id: Option<UserId>,
    pub object_type: String,
    pub object_id: i64,
    pub object_repr: String,
    pub action: AdminAction,
    pub message: String,
    pub created_at: i64,
}

/// SQLite-backed audit sink. Entries land in the caller's transaction, so a
/// rolled back operation leaves no log behind.
pub struct AdminLogRepo<'a> {
    conn: &'a Connection,
    now_utc: i64,
}

impl<'a> AdminLogRepo<'a> {
    pub fn new(conn: &'a Connection, now_utc: i64) -> Self {
        Self { conn, now_utc }
    }

    pub fn list_for(&self, object_type: &str, object_id: i64) -> Result<Vec<AdminLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, actor_id, object_type, object_id, object_repr, action, message, created_at
             FROM admin_log WHERE object_type = ?1 AND object_id = ?2
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query(params![object_type, object_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let action: String = row.get(5)?;
            entries.push(AdminLogEntry {
                id: row.get(0)?,
                actor_id: row.get::<_, Option<i64>>(1)?.map(UserId),
                object_type: row.get(2)?,
                object_id: row.get(3)?,
                object_repr: row.get(4)?,
                action: AdminAction::parse(&action)?,
                message: row.get(6)?,
                created_at: row.get(7)?,
            });
        }
        Ok(entries)
    }

    fn write(&self, by: &User, what: &AuditObject, action: AdminAction, message: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO admin_log (actor_id, object_type, object_id, object_repr, action, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                by.id.get(),
                what.object_type,
                what.object_id,
                what.repr,
                action.as_str(),
                message,
                self.now_utc,
            ],
        )?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ChangedFields<'a> {
    changed: FieldList<'a>,
}

#[derive(Serialize)]
struct FieldList<'a> {
    fields: &'a [&'a str],
}

impl AuditSink for AdminLogRepo<'_> {
    fn log_addition(&self, by: &User, what: &AuditObject) -> Result<()> {
        self.write(by, what, AdminAction::Addition, "")
    }

    fn log_changed_fields(&self, by: &User, what: &AuditObject, fields: &[&str]) -> Result<()> {
        let message = serde_json::to_string(&ChangedFields {
            changed: FieldList { fields },
        })?;
        self.write(by, what, AdminAction::Change, &message)
    }

    fn log_changed_generic(&self, by: &User, what: &AuditObject, message: &str) -> Result<()> {
        self.write(by, what, AdminAction::Change, message)
    }

    fn log_deletion(&self, by: &User, what: &AuditObject) -> Result<()> {
        self.write(by, what, AdminAction::Deletion, "")
    }
}
