mod common;

use common::{fixture, NOW};
use fictag_core::domain::StoryTagAction;
use fictag_core::TagLookup;
use fictag_store::repo::AdminLogRepo;
use fictag_store::uow::{SuggestionCache, AUTOCOMPLETE_CACHE_KEY, SEARCH_UPDATE_TASK};
use fictag_store::TagService;

#[test]
fn deferred_effects_run_only_after_commit() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    fx.story("Story", true, &[&a]);
    fx.store
        .cache(NOW)
        .set(AUTOCOMPLETE_CACHE_KEY, "[]")
        .expect("seed cache");

    let uow = fx.store.begin().expect("begin");
    {
        let audit = AdminLogRepo::new(&uow, NOW);
        let service = TagService::new(&uow, &fx.policy, &audit, NOW);
        service
            .make_alias_for(&a, &fx.staff, Some(&b), false)
            .expect("alias");
        service
            .get_tags_objects(vec!["brand new".into()], true, Some(&fx.staff))
            .expect("create");
    }
    assert!(!uow.outbox().is_empty());
    assert!(fx.store.task_queue(NOW).list().expect("queue").is_empty());

    let dispatched = fx.store.commit(uow, NOW).expect("commit");

    assert_eq!(dispatched, 2);
    let queued = fx.store.task_queue(NOW).list().expect("queue");
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].task.name, SEARCH_UPDATE_TASK);
    assert!(fx.store.cache(NOW).get(AUTOCOMPLETE_CACHE_KEY).expect("get").is_none());
}

#[test]
fn rollback_discards_writes_and_effects() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let story = fx.story("Story", true, &[&a]);

    let uow = fx.store.begin().expect("begin");
    {
        let audit = AdminLogRepo::new(&uow, NOW);
        let service = TagService::new(&uow, &fx.policy, &audit, NOW);
        service
            .make_alias_for(&a, &fx.staff, Some(&b), false)
            .expect("alias");
    }
    uow.rollback().expect("rollback");

    assert!(fx.reload(&a).is_canonical());
    assert_eq!(fx.story_tag_names(story), vec!["tag_a".to_string()]);
    assert!(fx.store.task_queue(NOW).list().expect("queue").is_empty());
    assert!(fx
        .store
        .admin_log(NOW)
        .list_for("tag", a.id.get())
        .expect("log")
        .is_empty());
}

#[test]
fn set_story_tags_diffs_and_logs() {
    let fx = fixture();
    let keep = fx.tag("Keep");
    let drop = fx.tag("Drop");
    let story = fx.story("Story", true, &[&keep, &drop]);

    let response = fx
        .run(|tags| {
            tags.set_story_tags(
                story,
                vec![
                    TagLookup::from(keep.clone()),
                    "New One".into(),
                    "new-one".into(),
                ],
                &fx.reader,
            )
        })
        .expect("assign");

    assert!(response.success);
    assert_eq!(response.created.len(), 1);
    assert_eq!(
        fx.story_tag_names(story),
        vec!["keep".to_string(), "new_one".to_string()]
    );
    assert_eq!(fx.reload(&drop).stories_count, 0);
    assert_eq!(fx.reload(&keep).stories_count, 1);
    assert_eq!(response.created[0].id, fx.store.tags().get_by_iname("new_one").unwrap().unwrap().id);
    assert_eq!(fx.reload(&response.created[0]).published_stories_count, 1);

    let logs = fx.store.story_tag_logs().list_for_story(story).expect("logs");
    assert_eq!(logs.len(), 2);
    assert!(logs
        .iter()
        .any(|log| log.tag_name == "Drop" && log.action == StoryTagAction::Deletion));
    assert!(logs
        .iter()
        .any(|log| log.tag_name == "New One" && log.action == StoryTagAction::Addition));
    assert_eq!(fx.store.task_queue(NOW).list().expect("queue").len(), 1);
}

#[test]
fn set_story_tags_leaves_story_alone_on_failure() {
    let fx = fixture();
    let keep = fx.tag("Keep");
    let story = fx.story("Story", false, &[&keep]);

    let response = fx
        .run(|tags| tags.set_story_tags(story, vec!["Fine".into(), "0000".into()], &fx.reader))
        .expect("assign");

    assert!(!response.success);
    assert_eq!(fx.story_tag_names(story), vec!["keep".to_string()]);
    assert!(fx.store.tags().get_by_iname("fine").unwrap().is_none());
    assert!(fx.store.task_queue(NOW).list().expect("queue").is_empty());
}

#[test]
fn publishing_moves_published_counts() {
    let fx = fixture();
    let tag = fx.tag("Drama");
    let story = fx.story("Story", false, &[&tag]);
    assert_eq!(fx.reload(&tag).published_stories_count, 0);

    fx.store
        .stories()
        .set_published(NOW, story, true)
        .expect("publish");
    assert_eq!(fx.reload(&tag).published_stories_count, 1);
    assert_eq!(fx.reload(&tag).stories_count, 1);

    fx.store
        .stories()
        .set_published(NOW, story, false)
        .expect("unpublish");
    assert_eq!(fx.reload(&tag).published_stories_count, 0);
}
