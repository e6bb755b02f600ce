//! Integration tests for repositories over the in-memory document store.

mod blog;

use blog::{Comment, Label, Post, User};
use chrono::{TimeZone, Utc};
use docmap::{
    Direction, DocumentStore, DocumentsExt, FilterOp, InMemoryDocumentStore, MappingError,
    MetadataStore, Path, PartialModel, Query, QueryError, Repository, StoreError, ToMany, ToOne,
};
use serde_json::json;

fn metadata() -> MetadataStore {
    let mut metadata = MetadataStore::new();
    // Post first: its relationships wait until the targets are registered.
    metadata.register::<Post>().unwrap();
    metadata.register::<Comment>().unwrap();
    metadata.register::<User>().unwrap();
    metadata.register::<Label>().unwrap();
    assert_eq!(metadata.pending_forward_refs(), 0);
    metadata
}

fn seed(store: &InMemoryDocumentStore, metadata: &MetadataStore) {
    let users = store.collection::<User>(metadata).unwrap();
    users.save(&User::new("ada", "Ada", 40)).unwrap();
    users.save(&User::new("grace", "Grace", 75)).unwrap();
    users.save(&User::new("linus", "Linus", 12)).unwrap();

    let labels = store.collection::<Label>(metadata).unwrap();
    for (id, text) in [("rust", "Rust"), ("db", "Databases")] {
        labels
            .save(&Label {
                id: id.into(),
                text: text.into(),
            })
            .unwrap();
    }

    let posts = store.collection::<Post>(metadata).unwrap();
    posts
        .save(&Post {
            id: "p1".into(),
            title: "Mapping documents".into(),
            created_on: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
            author: ToOne::with_id("ada"),
            labels: ToMany::new(["rust", "db", "gone"]),
            ..Post::default()
        })
        .unwrap();
}

#[test]
fn documents_land_at_collection_paths() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);

    assert_eq!(store.len().unwrap(), 6);
    let stored = store.get_document(&Path::from("users/ada")).unwrap().unwrap();
    assert_eq!(stored["displayName"], json!("Ada"));

    let post = store.get_document(&Path::from("posts/p1")).unwrap().unwrap();
    assert_eq!(post["author"], json!("ada"));
    assert_eq!(post["labels"], json!(["rust", "db", "gone"]));
    assert_eq!(post["created_on"], json!({ "seconds": 1_700_000_000i64, "nanoseconds": 0 }));
    assert!(!post.contains_key("comments"));
}

#[test]
fn get_with_includes_relationships() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);

    let posts = store.collection::<Post>(&metadata).unwrap();
    let post = posts.get_with("p1", &["author", "labels"]).unwrap().unwrap();

    assert_eq!(post.author.model(), Some(&User::new("ada", "Ada", 40)));

    // Ids and loaded models are tracked separately; a missing target only
    // leaves the model list shorter.
    assert_eq!(post.labels.ids().collect::<Vec<_>>(), vec!["rust", "db", "gone"]);
    let texts: Vec<_> = post.labels.models().iter().map(|label| label.text.as_str()).collect();
    assert_eq!(texts, vec!["Rust", "Databases"]);

    assert!(posts.get_with("missing", &["author"]).unwrap().is_none());
}

#[test]
fn include_on_a_plain_field_fails() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);

    let err = store
        .collection::<Post>(&metadata)
        .unwrap()
        .get_with("p1", &["title"])
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::NotARelationship {
            field: "title".into()
        }
    );
}

#[test]
fn sub_collections_nest_under_documents() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);

    let posts = store.collection::<Post>(&metadata).unwrap();
    let comments = posts.sub::<Comment>("p1", "comments").unwrap();
    assert_eq!(comments.path(), &Path::from("posts/p1/comments"));

    comments
        .save(&Comment {
            id: "c1".into(),
            body: "Great read".into(),
            by: ToOne::with_id("grace"),
        })
        .unwrap();
    assert!(store
        .get_document(&Path::from("posts/p1/comments/c1"))
        .unwrap()
        .is_some());

    // `~/users` resolves from the store root, not from the nested path.
    let comment = comments.get_with("c1", &["by"]).unwrap().unwrap();
    assert_eq!(comment.by.model().map(|user| user.name.as_str()), Some("Grace"));

    // Nested documents are not part of the parent collection.
    assert_eq!(posts.find(&Query::new()).unwrap().len(), 1);
}

#[test]
fn sub_checks_field_and_type() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    let posts = store.collection::<Post>(&metadata).unwrap();

    assert!(matches!(
        posts.sub::<Comment>("p1", "author"),
        Err(StoreError::NotARelationship { .. })
    ));
    assert!(matches!(
        posts.sub::<User>("p1", "comments"),
        Err(StoreError::Mapping(MappingError::TypeMismatch { .. }))
    ));
}

#[test]
fn find_filters_orders_and_limits() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);
    let users = store.collection::<User>(&metadata).unwrap();

    let names = |found: Vec<User>| found.into_iter().map(|user| user.name).collect::<Vec<_>>();

    let experienced = users
        .find(&Query::new().where_("karma", FilterOp::GreaterThanOrEqual, 40).order_by("karma", Direction::Desc))
        .unwrap();
    assert_eq!(names(experienced), vec!["Grace", "Ada"]);

    let by_name = users
        .find(&Query::new().order_by("name", Direction::Asc).start_after(["Ada"]).limit(1))
        .unwrap();
    assert_eq!(names(by_name), vec!["Grace"]);

    let chosen = users
        .find(&Query::new().where_("name", FilterOp::NotIn, json!(["Ada"])).order_by("name", Direction::Desc))
        .unwrap();
    assert_eq!(names(chosen), vec!["Linus", "Grace"]);
}

#[test]
fn oversized_disjunctions_are_rejected_before_the_store() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    let users = store.collection::<User>(&metadata).unwrap();

    let ids: Vec<String> = (0..31).map(|n| format!("u{n}")).collect();
    let err = users
        .find(&Query::new().where_("id", FilterOp::In, ids))
        .unwrap_err();
    assert!(matches!(err, StoreError::Query(QueryError::TooManyValues { count: 31, .. })));
}

#[test]
fn update_touches_only_given_fields() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);
    let users = store.collection::<User>(&metadata).unwrap();

    let partial = PartialModel::new().with_plain("name", &"Countess").unwrap();
    users.update("ada", partial).unwrap();

    let stored = store.get_document(&Path::from("users/ada")).unwrap().unwrap();
    assert_eq!(stored["displayName"], json!("Countess"));
    assert_eq!(stored["karma"], json!(40));

    let missing = users.update("nobody", PartialModel::new().with_plain("karma", &1).unwrap());
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));
}

#[test]
fn save_requires_an_id_and_delete_reports_existence() {
    let metadata = metadata();
    let store = InMemoryDocumentStore::new();
    seed(&store, &metadata);
    let users = store.collection::<User>(&metadata).unwrap();

    let err = users.save(&User::default()).unwrap_err();
    assert!(matches!(err, StoreError::Mapping(MappingError::MissingIdentifier { .. })));

    assert!(users.delete("linus").unwrap());
    assert!(!users.delete("linus").unwrap());
    assert!(users.get("linus").unwrap().is_none());
}

#[test]
fn repositories_without_collection_fail() {
    let metadata = MetadataStore::new();
    let store = InMemoryDocumentStore::new();
    let err = Repository::<_, User>::new(&store, &metadata).err().unwrap();
    assert!(matches!(err, StoreError::Mapping(MappingError::NotFoundMetadata { .. })));
}
