use super::follow_alias;
use crate::error::Result;
use crate::repo::{CategoriesRepo, TagsRepo};
use crate::uow::{SuggestionCache, AUTOCOMPLETE_CACHE_KEY};
use fictag_core::domain::{StoryId, Tag, TagCategoryId, TagId, TagSort};
use fictag_core::rules::{prepare_story_tags, PreparedTags, TagPolicy};
use fictag_core::CategoryTags;
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Read-only tag lookups. Safe to use outside a unit of work.
pub struct TagQueries<'a> {
    conn: &'a Connection,
    policy: &'a TagPolicy,
}

impl<'a> TagQueries<'a> {
    pub fn new(conn: &'a Connection, policy: &'a TagPolicy) -> Self {
        Self { conn, policy }
    }

    fn tags(&self) -> TagsRepo<'a> {
        TagsRepo::new(self.conn)
    }

    /// Canonical, non-blacklisted tags.
    pub fn get_all_tags(&self, sort: TagSort) -> Result<Vec<Tag>> {
        self.tags().list_canonical(sort)
    }

    /// Canonical tags grouped by category in id order; uncategorized tags
    /// come last. Empty groups are omitted.
    pub fn get_tags_with_categories(&self, sort: TagSort) -> Result<Vec<CategoryTags>> {
        let mut grouped: BTreeMap<Option<TagCategoryId>, Vec<Tag>> = BTreeMap::new();
        for tag in self.get_all_tags(sort)? {
            grouped.entry(tag.category_id).or_default().push(tag);
        }

        let mut result = Vec::with_capacity(grouped.len());
        for category in CategoriesRepo::new(self.conn).list()? {
            if let Some(tags) = grouped.remove(&Some(category.id)) {
                result.push(CategoryTags {
                    category: Some(category),
                    tags,
                });
            }
        }
        if let Some(tags) = grouped.remove(&None) {
            result.push(CategoryTags {
                category: None,
                tags,
            });
        }
        Ok(result)
    }

    /// Canonical tags matching `name` as a key prefix: exact match first,
    /// then canonical prefix matches by popularity, then targets of matching
    /// aliases. At most `limit` tags, capped by `max_search_limit`.
    pub fn search_by_prefix(&self, name: &str, limit: usize) -> Result<Vec<Tag>> {
        let limit = limit.min(self.policy.max_search_limit);
        let Some(prefix) = self.policy.rules.normalize(name) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }
        let tags = self.tags();

        let mut result = Vec::new();
        let mut seen: HashSet<TagId> = HashSet::new();
        let mut push = |tag: Tag, result: &mut Vec<Tag>| {
            if !tag.is_blacklisted() && seen.insert(tag.id) {
                result.push(tag);
            }
        };

        if let Some(exact) = tags.get_by_iname(&prefix)? {
            push(follow_alias(&tags, &exact)?, &mut result);
        }
        for tag in tags.canonical_with_prefix(&prefix, limit)? {
            push(tag, &mut result);
        }
        for alias in tags.aliases_with_prefix(&prefix, limit)? {
            push(follow_alias(&tags, &alias)?, &mut result);
        }

        result.truncate(limit);
        debug!(prefix = %prefix, found = result.len(), "tag prefix search");
        Ok(result)
    }

    /// Aliases of each given tag keyed by the canonical id. Hidden aliases
    /// are included only when `hidden` is set.
    pub fn get_aliases_for(&self, tags: &[Tag], hidden: bool) -> Result<BTreeMap<TagId, Vec<Tag>>> {
        let ids: Vec<TagId> = tags.iter().map(|tag| tag.id).collect();
        let mut result: BTreeMap<TagId, Vec<Tag>> =
            ids.iter().map(|id| (*id, Vec::new())).collect();
        for alias in self.tags().aliases_of(&ids, hidden)? {
            if let Some(target) = alias.is_alias_for {
                result.entry(target).or_default().push(alias);
            }
        }
        Ok(result)
    }

    pub fn get_prepared_tags(&self, story_id: StoryId) -> Result<PreparedTags> {
        let tags = self.tags().list_for_story(story_id)?;
        Ok(prepare_story_tags(&tags, self.policy.primary_cap))
    }

    /// The most used canonical tags, served from `cache` when present.
    pub fn autocomplete_default(
        &self,
        cache: &dyn SuggestionCache,
        limit: usize,
    ) -> Result<Vec<Tag>> {
        let limit = limit.min(self.policy.max_search_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut tags: Vec<Tag> = match cache.get(AUTOCOMPLETE_CACHE_KEY)? {
            Some(cached) => serde_json::from_str(&cached)?,
            None => {
                let mut tags = self.get_all_tags(TagSort::Stories)?;
                tags.truncate(self.policy.max_search_limit);
                cache.set(AUTOCOMPLETE_CACHE_KEY, &serde_json::to_string(&tags)?)?;
                debug!(count = tags.len(), "autocomplete defaults cached");
                tags
            }
        };
        tags.truncate(limit);
        Ok(tags)
    }
}
