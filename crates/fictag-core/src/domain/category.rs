use crate::domain::ids::TagCategoryId;
use serde::{Deserialize, Serialize};

/// Display grouping label. Tags reference a category; they do not own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    pub id: TagCategoryId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
}
