use crate::error::Result;
use fictag_core::domain::StoryId;
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::ops::Deref;
use tracing::debug;

/// Search index refresh for one story.
pub const SEARCH_UPDATE_TASK: &str = "sphinx_update_story";
/// Cached default suggestions for tag autocompletion.
pub const AUTOCOMPLETE_CACHE_KEY: &str = "tags_autocomplete_default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCall {
    pub name: String,
    pub args: Vec<Value>,
}

impl TaskCall {
    pub fn new(name: &str, args: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }

    pub fn reindex_story(story_id: StoryId, changed_field: &str) -> Self {
        Self::new(
            SEARCH_UPDATE_TASK,
            vec![json!(story_id.get()), json!([changed_field])],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    Task(TaskCall),
    InvalidateCache(String),
}

/// Effects that must only happen once the surrounding transaction commits.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: RefCell<Vec<Deferred>>,
}

impl Outbox {
    pub fn schedule_task(&self, task: TaskCall) {
        self.push(Deferred::Task(task));
    }

    pub fn invalidate_cache(&self, key: &str) {
        self.push(Deferred::InvalidateCache(key.to_string()));
    }

    pub fn pending(&self) -> Vec<Deferred> {
        self.pending.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    fn push(&self, item: Deferred) {
        let mut pending = self.pending.borrow_mut();
        if !pending.contains(&item) {
            pending.push(item);
        }
    }

    fn take(&self) -> Vec<Deferred> {
        self.pending.take()
    }
}

pub trait TaskScheduler {
    fn schedule_task(&self, task: &TaskCall) -> Result<()>;
}

pub trait SuggestionCache {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Where committed outbox entries go.
pub struct Dispatch<'a> {
    pub scheduler: &'a dyn TaskScheduler,
    pub cache: &'a dyn SuggestionCache,
}

/// One request's transaction plus the effects it has queued.
///
/// Dropping a unit of work without committing rolls the transaction back and
/// discards the outbox.
pub struct UnitOfWork<'a> {
    tx: Transaction<'a>,
    outbox: Outbox,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn begin(conn: &'a Connection) -> Result<Self> {
        let tx = conn.unchecked_transaction()?;
        Ok(Self {
            tx,
            outbox: Outbox::default(),
        })
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Commits, then hands every queued effect to `dispatch`. Returns how
    /// many effects ran.
    pub fn commit(self, dispatch: &Dispatch<'_>) -> Result<usize> {
        let UnitOfWork { tx, outbox } = self;
        tx.commit()?;

        let pending = outbox.take();
        let count = pending.len();
        for item in pending {
            match item {
                Deferred::Task(task) => dispatch.scheduler.schedule_task(&task)?,
                Deferred::InvalidateCache(key) => dispatch.cache.delete(&key)?,
            }
        }
        debug!(effects = count, "unit of work committed");
        Ok(count)
    }

    pub fn rollback(self) -> Result<()> {
        let discarded = self.outbox.len();
        self.tx.rollback()?;
        debug!(discarded, "unit of work rolled back");
        Ok(())
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}
