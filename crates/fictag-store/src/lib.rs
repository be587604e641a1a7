pub mod audit;
pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;
pub mod tags;
pub mod uow;

use crate::error::Result;
use crate::uow::{Dispatch, UnitOfWork};
use rusqlite::Connection;
use std::path::Path;

pub use tags::{TagNew, TagQueries, TagService, TagUpdate};

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Opens a transaction with an empty outbox.
    pub fn begin(&self) -> Result<UnitOfWork<'_>> {
        UnitOfWork::begin(&self.conn)
    }

    /// Commits `uow` and routes its outbox into the task queue and the
    /// suggestion cache.
    pub fn commit(&self, uow: UnitOfWork<'_>, now_utc: i64) -> Result<usize> {
        let queue = repo::TaskQueueRepo::new(&self.conn, now_utc);
        let cache = repo::CacheRepo::new(&self.conn, now_utc);
        uow.commit(&Dispatch {
            scheduler: &queue,
            cache: &cache,
        })
    }

    pub fn users(&self) -> repo::UsersRepo<'_> {
        repo::UsersRepo::new(&self.conn)
    }

    pub fn categories(&self) -> repo::CategoriesRepo<'_> {
        repo::CategoriesRepo::new(&self.conn)
    }

    pub fn stories(&self) -> repo::StoriesRepo<'_> {
        repo::StoriesRepo::new(&self.conn)
    }

    pub fn tags(&self) -> repo::TagsRepo<'_> {
        repo::TagsRepo::new(&self.conn)
    }

    pub fn story_tags(&self) -> repo::StoryTagsRepo<'_> {
        repo::StoryTagsRepo::new(&self.conn)
    }

    pub fn story_tag_logs(&self) -> repo::StoryTagLogsRepo<'_> {
        repo::StoryTagLogsRepo::new(&self.conn)
    }

    pub fn admin_log(&self, now_utc: i64) -> repo::AdminLogRepo<'_> {
        repo::AdminLogRepo::new(&self.conn, now_utc)
    }

    pub fn task_queue(&self, now_utc: i64) -> repo::TaskQueueRepo<'_> {
        repo::TaskQueueRepo::new(&self.conn, now_utc)
    }

    pub fn cache(&self, now_utc: i64) -> repo::CacheRepo<'_> {
        repo::CacheRepo::new(&self.conn, now_utc)
    }
}
