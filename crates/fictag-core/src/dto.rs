use crate::domain::{Tag, TagCategory};
use serde::Serialize;

/// One slot of a bulk resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLookup {
    Existing(Tag),
    Name(String),
}

impl From<Tag> for TagLookup {
    fn from(tag: Tag) -> Self {
        TagLookup::Existing(tag)
    }
}

impl From<&str> for TagLookup {
    fn from(name: &str) -> Self {
        TagLookup::Name(name.to_string())
    }
}

impl From<String> for TagLookup {
    fn from(name: String) -> Self {
        TagLookup::Name(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidTag {
    pub name: String,
    pub reason: String,
}

/// Outcome of bulk resolution. `tags` matches the request slot for slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagsResponse {
    pub success: bool,
    pub tags: Vec<Option<Tag>>,
    pub aliases: Vec<Tag>,
    pub blacklisted: Vec<Tag>,
    pub invalid: Vec<InvalidTag>,
    pub created: Vec<Tag>,
    pub nonexisting: Vec<String>,
}

impl TagsResponse {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            success: true,
            tags: Vec::with_capacity(len),
            aliases: Vec::new(),
            blacklisted: Vec::new(),
            invalid: Vec::new(),
            created: Vec::new(),
            nonexisting: Vec::new(),
        }
    }

    /// Resolved tags in request order, skipping failed slots.
    pub fn resolved(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().flatten()
    }
}

/// Canonical tags grouped under their category; `category` is `None` for the
/// uncategorized group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTags {
    pub category: Option<TagCategory>,
    pub tags: Vec<Tag>,
}
