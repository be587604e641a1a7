mod common;

use common::fixture;
use fictag_core::domain::StoryTagAction;
use fictag_store::error::StoreErrorKind;
use fictag_store::repo::AdminAction;
use fictag_store::uow::SEARCH_UPDATE_TASK;

#[test]
fn alias_moves_stories_to_canonical() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let story = fx.story("Story", true, &[&a]);

    fx.run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), false))
        .expect("make alias");

    assert_eq!(fx.story_tag_names(story), vec!["tag_b".to_string()]);
    let a = fx.reload(&a);
    let b = fx.reload(&b);
    assert_eq!(a.is_alias_for, Some(b.id));
    assert_eq!(a.stories_count, 0);
    assert_eq!(a.published_stories_count, 0);
    assert_eq!(b.stories_count, 1);
    assert_eq!(b.published_stories_count, 1);

    let logs = fx.store.story_tag_logs().list_for_story(story).expect("logs");
    assert_eq!(logs.len(), 2);
    assert!(logs
        .iter()
        .any(|log| log.tag_id == a.id && log.action == StoryTagAction::Deletion));
    assert!(logs
        .iter()
        .any(|log| log.tag_id == b.id && log.action == StoryTagAction::Addition));
}

#[test]
fn alias_drops_duplicate_story_tag() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let story = fx.story("Story", false, &[&a, &b]);

    fx.run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), true))
        .expect("make alias");

    assert_eq!(fx.story_tag_names(story), vec!["tag_b".to_string()]);
    assert_eq!(fx.reload(&a).stories_count, 0);
    assert!(fx.reload(&a).is_hidden_alias);
    assert_eq!(fx.reload(&b).stories_count, 1);

    let logs = fx.store.story_tag_logs().list_for_story(story).expect("logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].tag_id, a.id);
    assert_eq!(logs[0].action, StoryTagAction::Deletion);
}

#[test]
fn self_alias_is_rejected() {
    let fx = fixture();
    let a = fx.tag("tag a");

    let err = fx
        .run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&a), false))
        .expect_err("self alias");

    assert_eq!(err.kind(), StoreErrorKind::Validation);
    assert!(err
        .field_errors()
        .is_some_and(|errors| !errors.get("is_alias_for").is_empty()));
}

#[test]
fn alias_through_own_alias_is_a_cycle() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    fx.run(|tags| tags.make_alias_for(&b, &fx.staff, Some(&a), false))
        .expect("b -> a");

    let err = fx
        .run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), false))
        .expect_err("cycle");

    assert_eq!(err.kind(), StoreErrorKind::Consistency);
    assert_eq!(fx.reload(&a).is_alias_for, None);
}

#[test]
fn aliases_of_new_alias_are_rehomed() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let c = fx.tag("tag c");
    fx.run(|tags| tags.make_alias_for(&c, &fx.staff, Some(&a), false))
        .expect("c -> a");

    fx.run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), false))
        .expect("a -> b");

    assert_eq!(fx.reload(&a).is_alias_for, Some(b.id));
    assert_eq!(fx.reload(&c).is_alias_for, Some(b.id));
    let all = fx.store.tags().list_all(Default::default()).expect("tags");
    for tag in &all {
        if let Some(target) = tag.is_alias_for {
            let target = all.iter().find(|t| t.id == target).expect("target");
            assert!(target.is_alias_for.is_none(), "{} is two hops", tag.iname);
        }
    }
}

#[test]
fn aliasing_to_an_alias_follows_it() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let c = fx.tag("tag c");
    fx.run(|tags| tags.make_alias_for(&b, &fx.staff, Some(&a), false))
        .expect("b -> a");

    fx.run(|tags| tags.make_alias_for(&c, &fx.staff, Some(&b), false))
        .expect("c -> b");

    assert_eq!(fx.reload(&c).is_alias_for, Some(a.id));
}

#[test]
fn clearing_alias_restores_canonical() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    fx.run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), true))
        .expect("a -> b");

    let a = fx
        .run(|tags| tags.make_alias_for(&a, &fx.staff, None, false))
        .expect("clear");

    assert!(a.is_canonical());
    assert!(!a.is_hidden_alias);
    let log = fx.store.admin_log(common::NOW).list_for("tag", a.id.get()).expect("log");
    assert!(log.iter().any(|e| e.message == "Tag is no longer an alias"));
}

#[test]
fn blacklist_detaches_stories_and_alias() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let story = fx.story("Story", true, &[&a]);
    fx.run(|tags| tags.make_alias_for(&b, &fx.staff, Some(&a), false))
        .expect("b -> a");

    let a = fx
        .run(|tags| tags.set_blacklist(&a, &fx.staff, "  spam  "))
        .expect("blacklist a");
    let b = fx
        .run(|tags| tags.set_blacklist(&b, &fx.staff, "dupe"))
        .expect("blacklist b");

    assert_eq!(a.reason_to_blacklist, "spam");
    assert_eq!(a.stories_count, 0);
    assert!(fx.story_tag_names(story).is_empty());
    assert!(b.is_alias_for.is_none());
    assert!(!b.is_hidden_alias);
}

fn audit_messages(fx: &common::Fixture, tag: &fictag_core::domain::Tag) -> Vec<String> {
    fx.store
        .admin_log(common::NOW)
        .list_for("tag", tag.id.get())
        .expect("log")
        .into_iter()
        .map(|entry| entry.message)
        .collect()
}

#[test]
fn blacklist_transitions_write_distinct_audit_messages() {
    let fx = fixture();
    let tag = fx.tag("tag a");

    fx.run(|tags| tags.set_blacklist(&tag, &fx.staff, "spam"))
        .expect("blacklist");
    fx.run(|tags| tags.set_blacklist(&tag, &fx.staff, "dupe"))
        .expect("change reason");
    let tag = fx
        .run(|tags| tags.set_blacklist(&tag, &fx.staff, ""))
        .expect("unblacklist");

    assert!(!tag.is_blacklisted());
    assert_eq!(
        audit_messages(&fx, &tag),
        vec![
            "Tag blacklisted: spam".to_string(),
            "Blacklist reason changed: dupe".to_string(),
            "Tag removed from blacklist".to_string(),
        ]
    );
}

#[test]
fn blacklist_with_current_reason_is_a_no_op() {
    let fx = fixture();
    let tag = fx.tag("tag a");
    fx.run(|tags| tags.set_blacklist(&tag, &fx.staff, "spam"))
        .expect("blacklist");
    let before = audit_messages(&fx, &tag).len();

    let tag = fx
        .run(|tags| tags.set_blacklist(&tag, &fx.staff, " spam "))
        .expect("same reason");

    assert_eq!(tag.reason_to_blacklist, "spam");
    assert_eq!(audit_messages(&fx, &tag).len(), before);
}

#[test]
fn unblacklisting_does_not_restore_stories() {
    let fx = fixture();
    let tag = fx.tag("tag a");
    let story = fx.story("Story", true, &[&tag]);
    fx.run(|tags| tags.set_blacklist(&tag, &fx.staff, "spam"))
        .expect("blacklist");

    let tag = fx
        .run(|tags| tags.set_blacklist(&tag, &fx.staff, ""))
        .expect("unblacklist");

    assert!(tag.is_canonical());
    assert_eq!(tag.stories_count, 0);
    assert!(fx.story_tag_names(story).is_empty());
}

#[test]
fn blacklist_logs_and_reindexes_each_detached_story() {
    let fx = fixture();
    let tag = fx.tag("tag a");
    let other = fx.tag("tag b");
    let first = fx.story("First", true, &[&tag]);
    let second = fx.story("Second", false, &[&tag, &other]);

    fx.run(|tags| tags.set_blacklist(&tag, &fx.staff, "spam"))
        .expect("blacklist");

    for story in [first, second] {
        let logs = fx.store.story_tag_logs().list_for_story(story).expect("logs");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].tag_id, tag.id);
        assert_eq!(logs[0].action, StoryTagAction::Deletion);
    }
    assert_eq!(fx.story_tag_names(second), vec!["tag_b".to_string()]);

    let queued = fx.store.task_queue(common::NOW).list().expect("queue");
    let reindexed: Vec<_> = queued
        .iter()
        .filter(|item| item.task.name == SEARCH_UPDATE_TASK)
        .map(|item| item.task.args[0].clone())
        .collect();
    assert_eq!(
        reindexed,
        vec![serde_json::json!(first.get()), serde_json::json!(second.get())]
    );
}

#[test]
fn hidden_flag_change_audits_only_that_field() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    fx.run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), false))
        .expect("a -> b");
    let before = audit_messages(&fx, &a).len();

    let a = fx
        .run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), true))
        .expect("hide");

    assert!(a.is_hidden_alias);
    let entries = fx
        .store
        .admin_log(common::NOW)
        .list_for("tag", a.id.get())
        .expect("log");
    assert_eq!(entries.len(), before + 1);
    let last = entries.last().expect("entry");
    assert_eq!(last.action, AdminAction::Change);
    let payload: serde_json::Value = serde_json::from_str(&last.message).expect("json");
    assert_eq!(
        payload,
        serde_json::json!({ "changed": { "fields": ["is_hidden_alias"] } })
    );
}

#[test]
fn blacklisted_target_is_rejected() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    fx.run(|tags| tags.set_blacklist(&b, &fx.staff, "spam"))
        .expect("blacklist");

    let err = fx
        .run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), false))
        .expect_err("blacklisted target");

    assert_eq!(err.kind(), StoreErrorKind::Validation);
}

#[test]
fn non_staff_cannot_alias() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");

    let err = fx
        .run(|tags| tags.make_alias_for(&a, &fx.reader, Some(&b), false))
        .expect_err("reader");

    assert_eq!(err.kind(), StoreErrorKind::PermissionDenied);
}

#[test]
fn corrupt_target_chain_is_rejected_before_migration() {
    let fx = fixture();
    let a = fx.tag("tag a");
    let b = fx.tag("tag b");
    let c = fx.tag("tag c");
    fx.story("Story", true, &[&a]);
    fx.store
        .connection()
        .execute(
            "UPDATE tags SET is_alias_for = ?1 WHERE id = ?2;",
            [c.id.get(), b.id.get()],
        )
        .expect("link b");
    fx.store
        .connection()
        .execute(
            "UPDATE tags SET is_alias_for = ?1 WHERE id = ?2;",
            [a.id.get(), c.id.get()],
        )
        .expect("link c");

    let err = fx
        .run(|tags| tags.make_alias_for(&a, &fx.staff, Some(&b), false))
        .expect_err("corrupt chain");

    assert_eq!(err.kind(), StoreErrorKind::Consistency);
    assert_eq!(fx.reload(&a).stories_count, 1);
}
