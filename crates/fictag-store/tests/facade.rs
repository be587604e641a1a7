mod common;

use common::{fixture, NOW};
use fictag_store::error::StoreErrorKind;
use fictag_store::repo::AdminAction;
use fictag_store::{TagNew, TagUpdate};

fn new_tag(name: &str) -> TagNew {
    TagNew {
        name: name.to_string(),
        ..TagNew::default()
    }
}

#[test]
fn create_persists_and_audits() {
    let fx = fixture();
    let category = fx
        .store
        .categories()
        .create(NOW, "Genre", "")
        .expect("category");

    let tag = fx
        .run(|tags| {
            tags.create(
                &fx.staff,
                TagNew {
                    name: "  Slice   of Life ".to_string(),
                    category_id: Some(category.id),
                    description: "Everyday things".to_string(),
                    ..TagNew::default()
                },
            )
        })
        .expect("create");

    assert_eq!(tag.name, "Slice of Life");
    assert_eq!(tag.iname, "slice_of_life");
    assert_eq!(tag.category_id, Some(category.id));
    assert_eq!(tag.created_by, Some(fx.staff.id));
    let log = fx.store.admin_log(NOW).list_for("tag", tag.id.get()).expect("log");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AdminAction::Addition);
}

#[test]
fn create_rejects_duplicates_and_bad_names() {
    let fx = fixture();
    fx.tag("Drama");

    let err = fx
        .run(|tags| tags.create(&fx.staff, new_tag("DRAMA")))
        .expect_err("duplicate");
    assert_eq!(err.kind(), StoreErrorKind::Validation);
    assert!(err.field_errors().is_some_and(|e| !e.get("name").is_empty()));

    let err = fx
        .run(|tags| tags.create(&fx.staff, new_tag("2024")))
        .expect_err("digits only");
    assert_eq!(err.kind(), StoreErrorKind::Validation);

    let err = fx
        .run(|tags| tags.create(&fx.staff, new_tag(&"x".repeat(65))))
        .expect_err("too long");
    assert_eq!(err.kind(), StoreErrorKind::Validation);
}

#[test]
fn create_requires_staff() {
    let fx = fixture();

    let err = fx
        .run(|tags| tags.create(&fx.reader, new_tag("Drama")))
        .expect_err("reader");

    assert_eq!(err.kind(), StoreErrorKind::PermissionDenied);
    assert!(fx.store.tags().list_all(Default::default()).unwrap().is_empty());
}

#[test]
fn create_as_alias_resolves_target() {
    let fx = fixture();
    let target = fx.tag("Romance");

    let tag = fx
        .run(|tags| {
            tags.create(
                &fx.staff,
                TagNew {
                    name: "Romantic".to_string(),
                    is_alias_for: Some("romance".to_string()),
                    is_hidden_alias: true,
                    ..TagNew::default()
                },
            )
        })
        .expect("create alias");

    assert_eq!(tag.is_alias_for, Some(target.id));
    assert!(tag.is_hidden_alias);
}

#[test]
fn create_rejects_missing_alias_target_and_conflicts() {
    let fx = fixture();
    fx.tag("Romance");

    let err = fx
        .run(|tags| {
            tags.create(
                &fx.staff,
                TagNew {
                    name: "Romantic".to_string(),
                    is_alias_for: Some("nowhere".to_string()),
                    ..TagNew::default()
                },
            )
        })
        .expect_err("missing target");
    assert!(err
        .field_errors()
        .is_some_and(|e| !e.get("is_alias_for").is_empty()));

    let err = fx
        .run(|tags| {
            tags.create(
                &fx.staff,
                TagNew {
                    name: "Romantic".to_string(),
                    is_alias_for: Some("romance".to_string()),
                    reason_to_blacklist: "spam".to_string(),
                    ..TagNew::default()
                },
            )
        })
        .expect_err("alias and blacklist");
    assert_eq!(err.kind(), StoreErrorKind::Validation);
    assert!(fx.store.tags().get_by_iname("romantic").unwrap().is_none());
}

#[test]
fn update_renames_and_reindexes_stories() {
    let fx = fixture();
    let tag = fx.tag("Drama");
    let story = fx.story("Story", true, &[&tag]);
    fx.store.task_queue(NOW).clear().expect("clear queue");

    let updated = fx
        .run(|tags| {
            tags.update(
                &tag,
                &fx.staff,
                TagUpdate {
                    name: Some("Melodrama".to_string()),
                    is_spoiler: Some(true),
                    ..TagUpdate::default()
                },
            )
        })
        .expect("update");

    assert_eq!(updated.iname, "melodrama");
    assert!(updated.is_spoiler);
    let queued = fx.store.task_queue(NOW).list().expect("queue");
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].task.args[0], serde_json::json!(story.get()));

    let log = fx.store.admin_log(NOW).list_for("tag", tag.id.get()).expect("log");
    assert_eq!(log.len(), 1);
    assert!(log[0].message.contains("is_spoiler"));
}

#[test]
fn update_allows_same_key_and_rejects_taken_key() {
    let fx = fixture();
    let drama = fx.tag("Drama");
    fx.tag("Comedy");

    let updated = fx
        .run(|tags| {
            tags.update(
                &drama,
                &fx.staff,
                TagUpdate {
                    name: Some("DRAMA".to_string()),
                    ..TagUpdate::default()
                },
            )
        })
        .expect("case change");
    assert_eq!(updated.name, "DRAMA");
    assert_eq!(updated.iname, "drama");

    let err = fx
        .run(|tags| {
            tags.update(
                &drama,
                &fx.staff,
                TagUpdate {
                    name: Some("comedy".to_string()),
                    ..TagUpdate::default()
                },
            )
        })
        .expect_err("taken");
    assert_eq!(err.kind(), StoreErrorKind::Validation);
}

#[test]
fn update_applies_alias_and_hidden_flag() {
    let fx = fixture();
    let tag = fx.tag("Romantic");
    let target = fx.tag("Romance");

    let updated = fx
        .run(|tags| {
            tags.update(
                &tag,
                &fx.staff,
                TagUpdate {
                    is_alias_for: Some(Some("romance".to_string())),
                    ..TagUpdate::default()
                },
            )
        })
        .expect("alias");
    assert_eq!(updated.is_alias_for, Some(target.id));
    assert!(!updated.is_hidden_alias);

    let updated = fx
        .run(|tags| {
            tags.update(
                &updated,
                &fx.staff,
                TagUpdate {
                    is_hidden_alias: Some(true),
                    ..TagUpdate::default()
                },
            )
        })
        .expect("hide");
    assert!(updated.is_hidden_alias);
    assert_eq!(updated.is_alias_for, Some(target.id));

    let updated = fx
        .run(|tags| {
            tags.update(
                &updated,
                &fx.staff,
                TagUpdate {
                    is_alias_for: Some(None),
                    ..TagUpdate::default()
                },
            )
        })
        .expect("unalias");
    assert!(updated.is_canonical());
}

#[test]
fn update_blacklists_an_alias() {
    let fx = fixture();
    let tag = fx.tag("Romantic");
    let target = fx.tag("Romance");
    fx.run(|tags| tags.make_alias_for(&tag, &fx.staff, Some(&target), false))
        .expect("alias");

    let updated = fx
        .run(|tags| {
            tags.update(
                &tag,
                &fx.staff,
                TagUpdate {
                    reason_to_blacklist: Some("spam".to_string()),
                    ..TagUpdate::default()
                },
            )
        })
        .expect("blacklist");

    assert!(updated.is_blacklisted());
    assert!(updated.is_alias_for.is_none());
}

#[test]
fn delete_detaches_stories_and_releases_aliases() {
    let fx = fixture();
    let tag = fx.tag("Drama");
    let alias = fx.tag("Dramatic");
    let story = fx.story("Story", true, &[&tag]);
    fx.run(|tags| tags.make_alias_for(&alias, &fx.staff, Some(&tag), false))
        .expect("alias");

    fx.run(|tags| tags.delete(&tag, &fx.staff)).expect("delete");

    assert!(fx.store.tags().get(tag.id).unwrap().is_none());
    assert!(fx.story_tag_names(story).is_empty());
    assert!(fx.reload(&alias).is_canonical());
    let log = fx.store.admin_log(NOW).list_for("tag", tag.id.get()).expect("log");
    assert!(log.iter().any(|e| e.action == AdminAction::Deletion));
}

#[test]
fn recount_repairs_drift() {
    let fx = fixture();
    let tag = fx.tag("Drama");
    fx.story("One", true, &[&tag]);
    fx.story("Two", false, &[&tag]);
    fx.store
        .connection()
        .execute(
            "UPDATE tags SET stories_count = 9, published_stories_count = 0;",
            [],
        )
        .expect("corrupt counts");

    let corrected = fx
        .run(|tags| tags.recount_stories(&fx.staff, None))
        .expect("recount");

    assert_eq!(corrected, 1);
    let tag = fx.reload(&tag);
    assert_eq!(tag.stories_count, 2);
    assert_eq!(tag.published_stories_count, 1);

    let err = fx
        .run(|tags| tags.recount_stories(&fx.reader, Some(&tag)))
        .expect_err("reader");
    assert_eq!(err.kind(), StoreErrorKind::PermissionDenied);
}
