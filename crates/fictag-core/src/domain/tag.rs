use crate::domain::ids::{TagCategoryId, TagId, UserId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub iname: String,
    pub category_id: Option<TagCategoryId>,
    pub description: String,
    pub is_spoiler: bool,
    pub is_extreme_tag: bool,
    /// Canonical tag this one redirects to. Exactly one hop: the target is
    /// never itself an alias.
    pub is_alias_for: Option<TagId>,
    pub is_hidden_alias: bool,
    /// Non-empty means blacklisted.
    pub reason_to_blacklist: String,
    pub stories_count: i64,
    pub published_stories_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<UserId>,
}

impl Tag {
    pub fn is_alias(&self) -> bool {
        self.is_alias_for.is_some()
    }

    pub fn is_blacklisted(&self) -> bool {
        !self.reason_to_blacklist.is_empty()
    }

    /// Only canonical tags may be attached to a story.
    pub fn is_canonical(&self) -> bool {
        !self.is_alias() && !self.is_blacklisted()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSort {
    #[default]
    Name,
    Date,
    Stories,
}

impl TagSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagSort::Name => "name",
            TagSort::Date => "date",
            TagSort::Stories => "stories",
        }
    }
}

impl FromStr for TagSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(TagSort::Name),
            "date" => Ok(TagSort::Date),
            "stories" => Ok(TagSort::Stories),
            other => Err(CoreError::InvalidTagSort(other.to_string())),
        }
    }
}
