use crate::error::permission_denied;
use crate::util::now_utc;
use anyhow::Result;
use fictag_config::AppConfig;
use fictag_core::domain::{Tag, User};
use fictag_store::repo::AdminLogRepo;
use fictag_store::{Store, TagQueries, TagService};
use serde::Serialize;
use std::io::{self, Write};

pub mod categories;
pub mod stories;
pub mod tags;
pub mod tasks;
pub mod users;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    pub actor: Option<&'a User>,
}

impl Context<'_> {
    pub fn actor(&self) -> Result<&User> {
        self.actor
            .ok_or_else(|| permission_denied("this command needs --as <username>"))
    }

    pub fn queries(&self) -> TagQueries<'_> {
        TagQueries::new(self.store.connection(), &self.config.tags)
    }

    pub fn find_tag(&self, raw: &str) -> Result<Tag> {
        crate::util::find_tag(self.store, |name| self.config.tags.rules.normalize(name), raw)
    }

    /// Runs `f` against a tag service in one unit of work, committing on
    /// success.
    pub fn with_tags<T>(
        &self,
        f: impl FnOnce(&TagService<'_>) -> fictag_store::error::Result<T>,
    ) -> Result<T> {
        let now = now_utc();
        let uow = self.store.begin()?;
        let value = {
            let audit = AdminLogRepo::new(&uow, now);
            let service = TagService::new(&uow, &self.config.tags, &audit, now);
            f(&service)?
        };
        self.store.commit(uow, now)?;
        Ok(value)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
