use crate::error::{invalid_input, not_found};
use anyhow::Result;
use chrono::{DateTime, Utc};
use fictag_core::domain::{StoryId, Tag, TagCategoryId, TagId};
use fictag_store::Store;
use std::str::FromStr;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn parse_story_id(raw: &str) -> Result<StoryId> {
    StoryId::from_str(raw).map_err(|_| invalid_input(format!("invalid story id: {raw}")))
}

/// Looks a category up by numeric id or by name.
pub fn find_category(store: &Store, raw: &str) -> Result<TagCategoryId> {
    let category = match TagCategoryId::from_str(raw) {
        Ok(id) => store.categories().get(id)?,
        Err(_) => store.categories().get_by_name(raw.trim())?,
    };
    category
        .map(|category| category.id)
        .ok_or_else(|| not_found(format!("category {raw}")))
}

/// Looks a tag up by numeric id or by any spelling of its name.
pub fn find_tag(store: &Store, normalize: impl Fn(&str) -> Option<String>, raw: &str) -> Result<Tag> {
    let tag = match TagId::from_str(raw) {
        Ok(id) => store.tags().get(id)?,
        Err(_) => match normalize(raw) {
            Some(iname) => store.tags().get_by_iname(&iname)?,
            None => None,
        },
    };
    tag.ok_or_else(|| not_found(format!("tag {raw}")))
}
