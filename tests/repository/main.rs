//! Integration tests for RepoContext, Repo hydration, and population.

#[path = "../support/mod.rs"]
mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use entity_store::{
    FactoryError, FileSnapshotSource, Hydration, InMemoryPersistence, RepoConfig, RepoContext,
    StoreError,
};
use serde_json::json;
use support::records::{User, Widget};
use support::source::StaticSource;

fn context_with(source: StaticSource) -> (RepoContext, Arc<StaticSource>) {
    let source = Arc::new(source);
    let ctx = RepoContext::builder().shared_source(source.clone()).build();
    (ctx, source)
}

#[tokio::test]
async fn hydrates_empty_store_from_snapshot() {
    let (ctx, source) = context_with(StaticSource::new().with(
        "/generated/mocks/users.json",
        json!([
            { "id": "u-1", "name": "Ada", "role": "admin" },
            { "id": "u-2", "name": "Bob" }
        ]),
    ));

    let (users, hydration) = ctx.mount::<User>().await.unwrap();

    assert_eq!(hydration, Hydration::Seeded(2));
    assert!(users.is_initialized());
    assert_eq!(users.get_by_id("u-1").unwrap().role, "admin");
    assert_eq!(users.get_by_id("u-2").unwrap().role, "");
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn missing_snapshot_leaves_store_uninitialized() {
    let (ctx, source) = context_with(StaticSource::new());

    let users = ctx.repo::<User>().unwrap();
    let hydration = users.hydrate().await.unwrap();

    assert!(matches!(hydration, Hydration::Unavailable(reason) if reason.contains("404")));
    assert!(!users.is_initialized());
    assert!(users.get_all().is_empty());
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn hydration_skips_store_with_data() {
    let (ctx, source) = context_with(
        StaticSource::new().with("/generated/mocks/users.json", json!([{ "name": "Snapshot" }])),
    );
    let users = ctx.repo::<User>().unwrap();
    users.init(vec![User::with_id("live", "Live")]).unwrap();

    let hydration = users.hydrate().await.unwrap();

    assert_eq!(hydration, Hydration::AlreadyInitialized);
    assert_eq!(source.fetches(), 0);
    assert_eq!(users.get_all()[0].id, "live");
}

#[tokio::test]
async fn hydration_keeps_records_created_after_a_failed_attempt() {
    let (ctx, _source) = context_with(StaticSource::new().with(
        "/generated/mocks/people.json",
        json!([{ "id": "snap", "name": "Snapshot" }]),
    ));
    let users = ctx.repo::<User>().unwrap();
    assert!(matches!(users.hydrate().await.unwrap(), Hydration::Unavailable(_)));

    users.create(User::with_id("mine", "Mine")).unwrap();
    let hydration = users.hydrate_from("people").await.unwrap();

    assert_eq!(hydration, Hydration::AlreadyInitialized);
    let ids: Vec<String> = users.get_all().into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["mine".to_string()]);
}

#[tokio::test]
async fn hydration_refills_a_cleared_store() {
    let (ctx, _source) = context_with(
        StaticSource::new().with("/generated/mocks/users.json", json!([{ "name": "Snapshot" }])),
    );
    let users = ctx.repo::<User>().unwrap();
    users.init(vec![User::with_id("live", "Live")]).unwrap();
    users.delete_all().unwrap();

    assert_eq!(users.hydrate().await.unwrap(), Hydration::Seeded(1));
    assert_eq!(users.get_all()[0].name, "Snapshot");
}

#[tokio::test]
async fn non_array_snapshot_seeds_empty() {
    let (ctx, _source) = context_with(
        StaticSource::new().with("/generated/mocks/users.json", json!({ "users": [] })),
    );

    let (users, hydration) = ctx.mount::<User>().await.unwrap();

    assert_eq!(hydration, Hydration::Seeded(0));
    assert!(users.is_initialized());
    assert!(users.is_empty());
}

#[tokio::test]
async fn malformed_rows_are_skipped() {
    let (ctx, _source) = context_with(StaticSource::new().with(
        "/generated/mocks/users.json",
        json!([{ "name": "Ada" }, { "nickname": "no name" }, 42]),
    ));

    let (users, hydration) = ctx.mount::<User>().await.unwrap();

    assert_eq!(hydration, Hydration::Seeded(1));
    let all = users.get_all();
    assert_eq!(all[0].name, "Ada");
    assert!(!all[0].id.is_empty());
}

#[tokio::test]
async fn hydrate_from_uses_override_name() {
    let (ctx, _source) = context_with(
        StaticSource::new().with("/generated/mocks/people.json", json!([{ "name": "Ada" }])),
    );
    let users = ctx.repo::<User>().unwrap();

    assert!(matches!(users.hydrate().await.unwrap(), Hydration::Unavailable(_)));
    assert_eq!(users.hydrate_from("people").await.unwrap(), Hydration::Seeded(1));
}

#[tokio::test]
async fn mocks_path_comes_from_config() {
    let source = StaticSource::new().with("/fixtures/users.json", json!([{ "name": "Ada" }]));
    let ctx = RepoContext::builder()
        .config(RepoConfig::default().with_mocks_path("/fixtures"))
        .source(source)
        .build();

    let (_, hydration) = ctx.mount::<User>().await.unwrap();
    assert_eq!(hydration, Hydration::Seeded(1));
}

#[tokio::test]
async fn hydrates_from_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mocks = dir.path().join("generated/mocks");
    std::fs::create_dir_all(&mocks).unwrap();
    std::fs::write(mocks.join("users.json"), r#"[{"id":"u-1","name":"Ada"}]"#).unwrap();

    let ctx = RepoContext::builder()
        .source(FileSnapshotSource::new(dir.path()))
        .build();

    let (users, hydration) = ctx.mount::<User>().await.unwrap();
    assert_eq!(hydration, Hydration::Seeded(1));
    assert!(users.exists("u-1"));
}

#[tokio::test]
async fn no_source_is_unavailable() {
    let ctx = RepoContext::new();
    let (users, hydration) = ctx.mount::<User>().await.unwrap();

    assert!(matches!(hydration, Hydration::Unavailable(_)));
    assert!(!users.is_initialized());
}

#[test]
fn repo_for_same_name_shares_store() {
    let ctx = RepoContext::new();
    let a = ctx.repo::<User>().unwrap();
    let b = ctx.repo_named::<User>("users").unwrap();

    a.create(User::named("Ada")).unwrap();
    assert_eq!(b.count(), 1);
    assert!(Arc::ptr_eq(a.store(), b.store()));
}

#[test]
fn populate_without_factory_is_a_no_op() {
    let ctx = RepoContext::new();
    let widgets = ctx.repo::<Widget>().unwrap();
    widgets.create(Widget::new("bolt", 25)).unwrap();

    let created = widgets.populate(5, false).unwrap();

    assert!(created.is_empty());
    assert_eq!(widgets.count(), 1);
}

#[test]
fn populate_uses_registered_factory() {
    let ctx = RepoContext::new();
    let serial = AtomicU32::new(0);
    ctx.factories().register("widgets", move || {
        let n = serial.fetch_add(1, Ordering::Relaxed);
        Widget::new(&format!("widget-{}", n), 100 + n)
    });
    let widgets = ctx.repo::<Widget>().unwrap();
    widgets.create(Widget::new("existing", 1)).unwrap();

    let created = widgets.populate(3, false).unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(widgets.count(), 4);

    let replaced = widgets.populate(2, true).unwrap();
    assert_eq!(replaced.len(), 2);
    assert_eq!(widgets.get_all(), replaced);
    assert_eq!(replaced[0].label, "widget-3");
}

#[test]
fn populate_with_ad_hoc_factory() {
    let ctx = RepoContext::new();
    let users = ctx.repo::<User>().unwrap();
    let mut n = 0;

    let created = users
        .populate_with(
            4,
            || {
                n += 1;
                User::named(&format!("user {}", n))
            },
            false,
        )
        .unwrap();

    assert_eq!(created.len(), 4);
    assert_eq!(users.count(), 4);
    assert_eq!(created[3].name, "user 4");
}

#[test]
fn populate_with_mismatched_factory_is_an_error() {
    let ctx = RepoContext::new();
    ctx.factories()
        .register("users", || Widget::new("not a user", 0));
    let users = ctx.repo::<User>().unwrap();

    let err = users.populate(1, false).unwrap_err();
    assert!(matches!(err, StoreError::Factory(FactoryError::TypeMismatch { .. })));
    assert!(users.is_empty());
}

#[test]
fn direct_generation_without_factory_fails() {
    let ctx = RepoContext::new();
    let err = ctx.factories().generate::<User>("users", 2).unwrap_err();
    assert_eq!(err, FactoryError::Missing("users".into()));
}

#[test]
fn item_projection_is_bound_to_one_id() {
    let ctx = RepoContext::new();
    let users = ctx.repo::<User>().unwrap();
    users
        .reset(vec![User::with_id("a", "Ada"), User::with_id("b", "Bob")])
        .unwrap();

    let item = users.item(Some("a"));
    assert_eq!(item.id(), Some("a"));
    assert!(item.exists());
    assert_eq!(item.get().unwrap().name, "Ada");

    let updated = item.update(&json!({ "name": "Ada L." })).unwrap().unwrap();
    assert_eq!(updated.name, "Ada L.");
    assert_eq!(item.patch(&json!({ "role": "admin" })).unwrap().unwrap().role, "admin");

    assert!(item.delete().unwrap());
    assert!(!item.exists());
    assert!(item.get().is_none());
    assert_eq!(users.count(), 1);
}

#[test]
fn item_projection_without_id_does_nothing() {
    let ctx = RepoContext::new();
    let users = ctx.repo::<User>().unwrap();
    users.create(User::with_id("a", "Ada")).unwrap();

    let item = users.item(None);
    assert!(item.id().is_none());
    assert!(item.get().is_none());
    assert!(!item.exists());
    assert!(item.update(&json!({ "name": "x" })).unwrap().is_none());
    assert!(item.modify(|u| u.name.clear()).unwrap().is_none());
    assert!(!item.delete().unwrap());
    assert_eq!(users.get_by_id("a").unwrap().name, "Ada");
}

#[test]
fn clear_all_purges_every_collection() {
    let persistence = InMemoryPersistence::new();
    let ctx = RepoContext::builder()
        .persistence(persistence.clone())
        .config(RepoConfig::default().with_namespace("proto"))
        .build();

    ctx.repo::<User>().unwrap().create(User::named("Ada")).unwrap();
    ctx.repo::<Widget>().unwrap().create(Widget::new("bolt", 1)).unwrap();
    assert_eq!(
        persistence.keys().unwrap(),
        vec!["proto-users".to_string(), "proto-widgets".to_string()]
    );

    assert_eq!(ctx.clear_all().unwrap(), 2);
    assert!(persistence.keys().unwrap().is_empty());
    assert!(ctx.stores().names().is_empty());
    assert_eq!(ctx.repo::<User>().unwrap().count(), 0);
}

#[test]
fn context_reopens_persisted_collections() {
    let persistence = InMemoryPersistence::new();
    {
        let ctx = RepoContext::builder().persistence(persistence.clone()).build();
        let users = ctx.repo::<User>().unwrap();
        users.init(vec![User::with_id("a", "Ada")]).unwrap();
    }

    let ctx = RepoContext::builder().persistence(persistence).build();
    let users = ctx.repo::<User>().unwrap();
    assert!(users.is_initialized());
    assert_eq!(users.get_by_id("a").unwrap().name, "Ada");
}
