#![allow(dead_code)]

use fictag_core::domain::{StoryId, Tag, User};
use fictag_core::rules::TagPolicy;
use fictag_store::error::Result;
use fictag_store::repo::{AdminLogRepo, TagNewRow};
use fictag_store::{Store, TagService};

pub const NOW: i64 = 1_700_000_000;

pub struct Fixture {
    pub store: Store,
    pub staff: User,
    pub reader: User,
    pub policy: TagPolicy,
}

pub fn fixture() -> Fixture {
    let store = Store::open_in_memory().expect("open store");
    store.migrate().expect("migrate");
    let staff = store
        .users()
        .create(NOW, "moderator", true)
        .expect("create staff");
    let reader = store
        .users()
        .create(NOW, "reader", false)
        .expect("create reader");
    Fixture {
        store,
        staff,
        reader,
        policy: TagPolicy::default(),
    }
}

impl Fixture {
    /// Runs `f` in a unit of work and commits when it succeeds.
    pub fn run<T>(&self, f: impl FnOnce(&TagService<'_>) -> Result<T>) -> Result<T> {
        let uow = self.store.begin()?;
        let value = {
            let audit = AdminLogRepo::new(&uow, NOW);
            let service = TagService::new(&uow, &self.policy, &audit, NOW);
            f(&service)?
        };
        self.store.commit(uow, NOW)?;
        Ok(value)
    }

    pub fn tag(&self, name: &str) -> Tag {
        let iname = self.policy.rules.normalize(name).expect("valid name");
        self.store
            .tags()
            .insert(
                NOW,
                TagNewRow {
                    name: name.to_string(),
                    iname,
                    category_id: None,
                    description: String::new(),
                    is_spoiler: false,
                    is_extreme_tag: false,
                    created_by: Some(self.staff.id),
                },
            )
            .expect("insert tag")
    }

    pub fn reload(&self, tag: &Tag) -> Tag {
        self.store.tags().require(tag.id).expect("reload tag")
    }

    pub fn story(&self, title: &str, published: bool, tags: &[&Tag]) -> StoryId {
        let story = self
            .store
            .stories()
            .create(NOW, title, published)
            .expect("create story");
        for tag in tags {
            self.store
                .story_tags()
                .insert(NOW, story.id, tag.id)
                .expect("attach tag");
            self.store
                .tags()
                .adjust_counts(tag.id, 1, i64::from(published))
                .expect("adjust counts");
        }
        story.id
    }

    pub fn story_tag_names(&self, story_id: StoryId) -> Vec<String> {
        self.store
            .tags()
            .list_for_story(story_id)
            .expect("list story tags")
            .into_iter()
            .map(|tag| tag.iname)
            .collect()
    }
}
