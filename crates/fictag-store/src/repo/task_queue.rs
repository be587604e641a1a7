use crate::error::Result;
use crate::uow::{TaskCall, TaskScheduler};
use rusqlite::{params, Connection};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedTask {
    pub id: i64,
    pub task: TaskCall,
    pub created_at: i64,
}

/// Persistent queue that background workers drain.
pub struct TaskQueueRepo<'a> {
    conn: &'a Connection,
    now_utc: i64,
}

impl<'a> TaskQueueRepo<'a> {
    pub fn new(conn: &'a Connection, now_utc: i64) -> Self {
        Self { conn, now_utc }
    }

    pub fn list(&self) -> Result<Vec<QueuedTask>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, args, created_at FROM task_queue ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let args: String = row.get(2)?;
            items.push(QueuedTask {
                id: row.get(0)?,
                task: TaskCall {
                    name: row.get(1)?,
                    args: serde_json::from_str(&args)?,
                },
                created_at: row.get(3)?,
            });
        }
        Ok(items)
    }

    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM task_queue;", [])?;
        Ok(removed)
    }
}

impl TaskScheduler for TaskQueueRepo<'_> {
    fn schedule_task(&self, task: &TaskCall) -> Result<()> {
        let args = serde_json::to_string(&task.args)?;
        self.conn.execute(
            "INSERT INTO task_queue (name, args, created_at) VALUES (?1, ?2, ?3);",
            params![task.name, args, self.now_utc],
        )?;
        Ok(())
    }
}
