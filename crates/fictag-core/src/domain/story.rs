use crate::domain::ids::{StoryId, StoryTagId, TagId, UserId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// The slice of a story the tag subsystem cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Join row between a story and a canonical tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTag {
    pub id: StoryTagId,
    pub story_id: StoryId,
    pub tag_id: TagId,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryTagAction {
    Addition,
    Deletion,
}

impl StoryTagAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryTagAction::Addition => "addition",
            StoryTagAction::Deletion => "deletion",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "addition" => Ok(StoryTagAction::Addition),
            "deletion" => Ok(StoryTagAction::Deletion),
            other => Err(CoreError::InvalidStoryTagAction(other.to_string())),
        }
    }
}

/// Append-only record of a tag being attached to or detached from a story.
/// `tag_name` is a snapshot so the entry stays readable after the tag is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTagLog {
    pub id: i64,
    pub story_id: StoryId,
    pub tag_id: TagId,
    pub tag_name: String,
    pub action: StoryTagAction,
    pub by_user: Option<UserId>,
    pub created_at: i64,
}
