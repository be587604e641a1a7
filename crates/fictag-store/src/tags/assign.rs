use super::TagService;
use crate::error::Result;
use fictag_core::domain::{StoryId, StoryTagAction, TagId, User};
use fictag_core::{TagLookup, TagsResponse};
use std::collections::HashSet;
use tracing::info;

impl TagService<'_> {
    /// Replaces a story's tag set with the resolution of `items`, creating
    /// unknown names. When resolution fails the story is left untouched and
    /// the failed response is returned as is.
    pub fn set_story_tags(
        &self,
        story_id: StoryId,
        items: Vec<TagLookup>,
        user: &User,
    ) -> Result<TagsResponse> {
        let story = self.stories().require(story_id)?;
        let response = self.get_tags_objects(items, true, Some(user))?;
        if !response.success {
            return Ok(response);
        }

        let mut wanted = Vec::new();
        let mut wanted_ids: HashSet<TagId> = HashSet::new();
        for tag in response.resolved() {
            if wanted_ids.insert(tag.id) {
                wanted.push(tag.clone());
            }
        }

        let tags = self.tags();
        let story_tags = self.story_tags();
        let logs = self.logs();
        let published = i64::from(story.published);
        let current = tags.list_for_story(story.id)?;
        let current_ids: HashSet<TagId> = current.iter().map(|tag| tag.id).collect();

        let mut removed = 0;
        for tag in current.iter().filter(|tag| !wanted_ids.contains(&tag.id)) {
            if let Some(row) = story_tags.get(story.id, tag.id)? {
                story_tags.delete(row.id)?;
                logs.append(
                    self.now_utc,
                    story.id,
                    tag,
                    StoryTagAction::Deletion,
                    Some(user.id),
                )?;
                tags.adjust_counts(tag.id, -1, -published)?;
                removed += 1;
            }
        }

        let mut added = 0;
        for tag in wanted.iter().filter(|tag| !current_ids.contains(&tag.id)) {
            story_tags.insert(self.now_utc, story.id, tag.id)?;
            logs.append(
                self.now_utc,
                story.id,
                tag,
                StoryTagAction::Addition,
                Some(user.id),
            )?;
            tags.adjust_counts(tag.id, 1, published)?;
            added += 1;
        }

        if added + removed > 0 {
            self.reindex_story(story.id);
            info!(story_id = %story.id, added, removed, "story tags updated");
        }
        Ok(response)
    }
}
