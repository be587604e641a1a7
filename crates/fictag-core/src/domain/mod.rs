pub mod category;
pub mod ids;
pub mod story;
pub mod tag;
pub mod user;

pub use category::TagCategory;
pub use ids::{StoryId, StoryTagId, TagCategoryId, TagId, UserId};
pub use story::{Story, StoryTag, StoryTagAction, StoryTagLog};
pub use tag::{Tag, TagSort};
pub use user::User;
