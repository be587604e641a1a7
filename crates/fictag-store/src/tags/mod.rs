//! Tag services: bulk resolution, alias and blacklist transitions, the
//! create/update/delete façade and read-side queries.
//!
//! Mutating services run inside a [`UnitOfWork`]; their follow-up effects go
//! to its outbox and only fire after commit.

mod assign;
mod facade;
mod mutate;
mod query;
mod resolve;

pub use facade::{TagNew, TagUpdate};
pub use query::TagQueries;

use crate::audit::AuditSink;
use crate::error::{Result, StoreError};
use crate::repo::{StoriesRepo, StoryTagLogsRepo, StoryTagsRepo, TagsRepo};
use crate::uow::{Outbox, TaskCall, UnitOfWork};
use fictag_core::domain::{StoryId, StoryTagAction, Tag, User};
use fictag_core::rules::TagPolicy;
use rusqlite::Connection;
use tracing::debug;

pub struct TagService<'a> {
    conn: &'a Connection,
    outbox: &'a Outbox,
    policy: &'a TagPolicy,
    audit: &'a dyn AuditSink,
    now_utc: i64,
}

impl<'a> TagService<'a> {
    pub fn new(
        uow: &'a UnitOfWork<'_>,
        policy: &'a TagPolicy,
        audit: &'a dyn AuditSink,
        now_utc: i64,
    ) -> Self {
        Self {
            conn: uow,
            outbox: uow.outbox(),
            policy,
            audit,
            now_utc,
        }
    }

    pub fn normalize(&self, raw: &str) -> Option<String> {
        self.policy.rules.normalize(raw)
    }

    pub fn validate_tag_name(&self, raw: &str) -> Option<String> {
        self.policy.rules.validate_tag_name(raw)
    }

    pub fn queries(&self) -> TagQueries<'a> {
        TagQueries::new(self.conn, self.policy)
    }

    fn tags(&self) -> TagsRepo<'a> {
        TagsRepo::new(self.conn)
    }

    fn story_tags(&self) -> StoryTagsRepo<'a> {
        StoryTagsRepo::new(self.conn)
    }

    fn logs(&self) -> StoryTagLogsRepo<'a> {
        StoryTagLogsRepo::new(self.conn)
    }

    fn stories(&self) -> StoriesRepo<'a> {
        StoriesRepo::new(self.conn)
    }

    fn reindex_story(&self, story_id: StoryId) {
        self.outbox
            .schedule_task(TaskCall::reindex_story(story_id, "tag"));
    }

    /// Moves every story association of `tag` to `target`, or drops them all
    /// when there is no target. A story already holding `target` just loses
    /// its row for `tag`. Returns `(moved, dropped)`.
    fn migrate_story_tags(
        &self,
        tag: &Tag,
        target: Option<&Tag>,
        user: &User,
    ) -> Result<(usize, usize)> {
        let story_tags = self.story_tags();
        let tags = self.tags();
        let logs = self.logs();
        let stories = self.stories();

        let mut moved = 0;
        let mut dropped = 0;
        for story_tag in story_tags.list_for_tag(tag.id)? {
            let story = stories.require(story_tag.story_id)?;
            let published = i64::from(story.published);
            logs.append(
                self.now_utc,
                story.id,
                tag,
                StoryTagAction::Deletion,
                Some(user.id),
            )?;

            match target {
                Some(target) if story_tags.get(story.id, target.id)?.is_none() => {
                    logs.append(
                        self.now_utc,
                        story.id,
                        target,
                        StoryTagAction::Addition,
                        Some(user.id),
                    )?;
                    story_tags.repoint(story_tag.id, target.id)?;
                    tags.adjust_counts(target.id, 1, published)?;
                    moved += 1;
                }
                _ => {
                    story_tags.delete(story_tag.id)?;
                    dropped += 1;
                }
            }

            tags.adjust_counts(tag.id, -1, -published)?;
            self.reindex_story(story.id);
        }

        debug!(tag_id = %tag.id, moved, dropped, "story tags migrated");
        Ok((moved, dropped))
    }
}

/// Follows one alias hop. A target that is itself an alias means the stored
/// graph is corrupt.
pub(crate) fn follow_alias(tags: &TagsRepo<'_>, tag: &Tag) -> Result<Tag> {
    let Some(target_id) = tag.is_alias_for else {
        return Ok(tag.clone());
    };
    let target = tags.get(target_id)?.ok_or_else(|| {
        StoreError::Consistency(format!(
            "tag {} is an alias for missing tag {}",
            tag.id, target_id
        ))
    })?;
    if target.is_alias() {
        return Err(StoreError::Consistency(format!(
            "alias chain longer than one hop: {} -> {} -> {}",
            tag.iname,
            target.iname,
            target.is_alias_for.map(|id| id.to_string()).unwrap_or_default()
        )));
    }
    Ok(target)
}

pub(crate) fn require_staff(user: &User, action: &str) -> Result<()> {
    if user.is_staff {
        Ok(())
    } else {
        Err(StoreError::PermissionDenied(format!(
            "{} may not {action}",
            user.username
        )))
    }
}
