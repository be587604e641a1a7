pub mod admin_log;
pub mod cache;
pub mod categories;
pub mod stories;
pub mod story_tag_logs;
pub mod story_tags;
pub mod tags;
pub mod task_queue;
pub mod users;

pub use admin_log::{AdminAction, AdminLogEntry, AdminLogRepo};
pub use cache::CacheRepo;
pub use categories::CategoriesRepo;
pub use stories::StoriesRepo;
pub use story_tag_logs::StoryTagLogsRepo;
pub use story_tags::StoryTagsRepo;
pub use tags::{TagNewRow, TagsRepo};
pub use task_queue::{QueuedTask, TaskQueueRepo};
pub use users::UsersRepo;
