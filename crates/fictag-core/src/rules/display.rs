use crate::domain::Tag;
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_PRIMARY_TAGS_CAP: usize = 5;

/// A story's tags partitioned for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreparedTags {
    pub primary: Vec<Tag>,
    pub secondary: Vec<Tag>,
    pub spoilers: Vec<Tag>,
    pub extreme: Vec<Tag>,
}

impl PreparedTags {
    pub fn visible_count(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }
}

/// Sorts by `(category, iname)` with uncategorized tags last, splits out
/// spoilers, collects extreme tags, and when more than `cap` visible tags
/// remain keeps one primary representative per category.
pub fn prepare_story_tags(tags: &[Tag], cap: usize) -> PreparedTags {
    let mut sorted: Vec<&Tag> = tags.iter().collect();
    sorted.sort_by(|a, b| {
        category_key(a)
            .cmp(&category_key(b))
            .then_with(|| a.iname.cmp(&b.iname))
    });

    let mut prepared = PreparedTags::default();
    let mut visible = Vec::new();
    for tag in sorted {
        if tag.is_extreme_tag {
            prepared.extreme.push(tag.clone());
        }
        if tag.is_spoiler {
            prepared.spoilers.push(tag.clone());
        } else {
            visible.push(tag);
        }
    }

    if visible.len() <= cap {
        prepared.primary = visible.into_iter().cloned().collect();
        return prepared;
    }

    let mut represented = HashSet::new();
    for tag in visible {
        if prepared.primary.len() < cap && represented.insert(category_key(tag)) {
            prepared.primary.push(tag.clone());
        } else {
            prepared.secondary.push(tag.clone());
        }
    }
    prepared
}

fn category_key(tag: &Tag) -> (bool, i64) {
    match tag.category_id {
        Some(id) => (false, id.get()),
        None => (true, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::{prepare_story_tags, DEFAULT_PRIMARY_TAGS_CAP};
    use crate::domain::{Tag, TagCategoryId, TagId};

    fn tag(id: i64, iname: &str, category: Option<i64>) -> Tag {
        Tag {
            id: TagId(id),
            name: iname.to_string(),
            iname: iname.to_string(),
            category_id: category.map(TagCategoryId),
            description: String::new(),
            is_spoiler: false,
            is_extreme_tag: false,
            is_alias_for: None,
            is_hidden_alias: false,
            reason_to_blacklist: String::new(),
            stories_count: 0,
            published_stories_count: 0,
            created_at: 0,
            updated_at: 0,
            created_by: None,
        }
    }

    fn inames(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|tag| tag.iname.as_str()).collect()
    }

    #[test]
    fn small_sets_are_all_primary() {
        let mut spoiler = tag(3, "twist", Some(1));
        spoiler.is_spoiler = true;
        let mut extreme = tag(4, "gore", None);
        extreme.is_extreme_tag = true;
        let tags = vec![tag(1, "romance", Some(2)), tag(2, "drama", Some(1)), spoiler, extreme];

        let prepared = prepare_story_tags(&tags, DEFAULT_PRIMARY_TAGS_CAP);
        assert_eq!(inames(&prepared.primary), vec!["drama", "romance", "gore"]);
        assert!(prepared.secondary.is_empty());
        assert_eq!(inames(&prepared.spoilers), vec!["twist"]);
        assert_eq!(inames(&prepared.extreme), vec!["gore"]);
    }

    #[test]
    fn large_sets_keep_one_tag_per_category() {
        let tags = vec![
            tag(1, "b1", Some(2)),
            tag(2, "a1", Some(1)),
            tag(3, "a2", Some(1)),
            tag(4, "a3", Some(1)),
            tag(5, "b2", Some(2)),
            tag(6, "free", None),
            tag(7, "c1", Some(3)),
        ];

        let prepared = prepare_story_tags(&tags, DEFAULT_PRIMARY_TAGS_CAP);
        assert_eq!(inames(&prepared.primary), vec!["a1", "b1", "c1", "free"]);
        assert_eq!(inames(&prepared.secondary), vec!["a2", "a3", "b2"]);
        assert_eq!(prepared.visible_count(), tags.len());
    }

    #[test]
    fn primary_never_exceeds_cap() {
        let tags: Vec<Tag> = (1..=8)
            .map(|id| tag(id, &format!("t{id}"), Some(id)))
            .collect();
        let prepared = prepare_story_tags(&tags, 3);
        assert_eq!(inames(&prepared.primary), vec!["t1", "t2", "t3"]);
        assert_eq!(prepared.secondary.len(), 5);
    }
}
