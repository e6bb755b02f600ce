//! Integration tests for derived models and document conversion.

mod models;

use chrono::{TimeZone, Utc};
use docmap::{
    default_document_key, Direction, Document, FilterOp, MappingError, MetadataStore, Model, Path,
    Query, RelationshipKind, ToMany, ToOne,
};
use models::{Article, Author, Comment, Money, Tag};
use serde_json::json;

fn registered() -> MetadataStore {
    let mut metadata = MetadataStore::new();
    metadata.register::<Author>().unwrap();
    metadata.register::<Tag>().unwrap();
    metadata.register::<Comment>().unwrap();
    metadata.register::<Article>().unwrap();
    metadata
}

fn article() -> Article {
    Article {
        id: "a1".into(),
        title: "Paths all the way down".into(),
        word_count: 1200,
        published_on: Some(Utc.timestamp_opt(1_700_000_000, 500).unwrap()),
        author: ToOne::with_id("ada"),
        tags: ToMany::new(["rust", "odm"]),
        price: Money { cents: 1250 },
        discounts: vec![Money { cents: 100 }, Money { cents: 5 }],
        ..Article::default()
    }
}

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap()
}

#[test]
fn derive_lists_every_field() {
    let article = Article::default();
    assert_eq!(
        article.field_names(),
        vec![
            "id",
            "title",
            "word_count",
            "published_on",
            "author",
            "tags",
            "comments",
            "price",
            "discounts"
        ]
    );
    assert!(article.has_field("comments"));
    assert!(article.field("comments").unwrap().is_none());
    assert_eq!(article.id(), None);
    assert_eq!(self::article().id(), Some("a1"));
}

#[test]
fn model_to_document_follows_declarations() {
    let metadata = registered();
    let document = metadata
        .get::<Article>()
        .unwrap()
        .convert_model_to_document(&article())
        .unwrap();

    assert_eq!(
        serde_json::Value::Object(document),
        json!({
            "id": "a1",
            "title": "Paths all the way down",
            "word_count": 1200,
            "published_on": { "seconds": 1_700_000_000i64, "nanoseconds": 500 },
            "author": "ada",
            "tags": ["rust", "odm"],
            "price": "12.50",
            "discounts": ["1.00", "0.05"],
        })
    );
}

#[test]
fn roundtrip_preserves_stored_fields() {
    let metadata = registered();
    let articles = metadata.get::<Article>().unwrap();

    let original = article();
    let document = articles.convert_model_to_document(&original).unwrap();
    let restored: Article = articles.convert_document_to_model(&document).unwrap();

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.title, original.title);
    assert_eq!(restored.word_count, original.word_count);
    assert_eq!(restored.published_on, original.published_on);
    assert_eq!(restored.author.id(), Some("ada"));
    assert_eq!(restored.tags.ids().collect::<Vec<_>>(), vec!["rust", "odm"]);
    assert_eq!(restored.price, original.price);
    assert_eq!(restored.discounts, original.discounts);
}

#[test]
fn ignored_fields_never_reach_documents() {
    let metadata = registered();
    let authors = metadata.get::<Author>().unwrap();

    let mut ada = Author::new("ada", "Ada Lovelace");
    ada.cached_score = 99;
    let document = authors.convert_model_to_document(&ada).unwrap();

    assert!(!document.contains_key("cached_score"));
    assert_eq!(document["fullName"], json!("Ada Lovelace"));
    assert!(!document.contains_key("full_name"));

    let mut stored = document.clone();
    stored.insert("cached_score".into(), json!(7));
    let restored: Author = authors.convert_document_to_model(&stored).unwrap();
    assert_eq!(restored.cached_score, 0);
    assert_eq!(restored, Author { cached_score: 0, ..ada });
}

#[test]
fn absent_keys_read_as_defaults() {
    let metadata = registered();
    let restored: Article = metadata
        .get::<Article>()
        .unwrap()
        .convert_document_to_model(&doc(json!({ "id": "a2" })))
        .unwrap();

    assert_eq!(restored.id, "a2");
    assert_eq!(restored.published_on, None);
    assert!(restored.author.id().is_none());
    assert!(restored.tags.is_empty());
    assert_eq!(restored.price, Money::default());
    assert!(restored.discounts.is_empty());
}

#[test]
fn converter_errors_name_the_field() {
    let metadata = registered();
    let err = metadata
        .get::<Article>()
        .unwrap()
        .convert_document_to_model::<Article>(&doc(json!({ "price": "free" })))
        .unwrap_err();

    match err {
        MappingError::Field { field, .. } => assert_eq!(field, "price"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn relationships_wait_for_their_targets() {
    let mut metadata = MetadataStore::new();
    metadata.register::<Article>().unwrap();
    assert_eq!(metadata.pending_forward_refs(), 3);

    metadata.register::<Author>().unwrap();
    metadata.register::<Tag>().unwrap();
    assert_eq!(metadata.pending_forward_refs(), 1);

    metadata.register::<Comment>().unwrap();
    assert_eq!(metadata.pending_forward_refs(), 0);

    let articles = metadata.get::<Article>().unwrap();
    let kinds: Vec<_> = ["author", "tags", "comments"]
        .iter()
        .map(|field| articles.property(field).unwrap().relationship().unwrap().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![RelationshipKind::ToOne, RelationshipKind::ToMany, RelationshipKind::Sub]
    );
    assert_eq!(
        articles.property("author").unwrap().relationship().unwrap().location(),
        &Path::from("../authors")
    );
}

#[test]
fn missing_collection_name_is_reported() {
    let metadata = registered();
    let err = metadata.get::<Comment>().unwrap().collection_name().unwrap_err();
    assert!(matches!(err, MappingError::MissingCollectionName { .. }));
    assert_eq!(metadata.get::<Article>().unwrap().collection_name().unwrap(), "articles");
}

#[test]
fn derived_id_field() {
    let comment = Comment {
        key: "c1".into(),
        body: "Nice".into(),
    };
    assert_eq!(comment.id(), Some("c1"));
    assert_eq!(Comment::default().id(), None);
}

#[test]
fn blueprint_serializes_for_tooling() {
    let metadata = registered();
    let blueprint = metadata.get::<Author>().unwrap().document_blueprint();
    let value = serde_json::to_value(&blueprint).unwrap();

    assert_eq!(value["full_name"]["document_key"], json!("fullName"));
    assert_eq!(value["full_name"]["default_document_key"], json!("full_name"));
    assert_eq!(value["cached_score"]["ignored"], json!(true));
    assert_eq!(value["email"]["custom_conversion"], json!(false));
}

#[test]
fn queries_use_document_keys() {
    let metadata = registered();
    let constraints = Query::new()
        .where_("full_name", FilterOp::In, json!(["Ada Lovelace", "Grace Hopper"]))
        .order_by("email", Direction::Desc)
        .limit(5)
        .to_constraints_for(metadata.get::<Author>().unwrap())
        .unwrap();

    assert_eq!(constraints.len(), 3);
    assert_eq!(constraints[0].field(), Some("fullName"));
    assert_eq!(
        serde_json::to_value(&constraints[2]).unwrap(),
        json!({ "type": "limit", "count": 5 })
    );
}

#[test]
fn key_derivation() {
    assert_eq!(default_document_key("createdOn"), "created_on");
    assert_eq!(default_document_key("id"), "id");
}
