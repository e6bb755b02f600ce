//! Models for a small publishing store.

use chrono::{DateTime, Utc};
use docmap::{Model, SubCollection, ToMany, ToOne};

#[derive(Clone, Debug, Default, PartialEq, Model)]
#[model(collection = "users")]
pub struct User {
    pub id: String,
    #[model(map_to = "displayName")]
    pub name: String,
    pub karma: i64,
}

impl User {
    pub fn new(id: &str, name: &str, karma: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            karma,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Model)]
#[model(collection = "labels")]
pub struct Label {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Model)]
#[model(collection = "comments")]
pub struct Comment {
    pub id: String,
    pub body: String,
    #[model(to_one = "~/users")]
    pub by: ToOne<User>,
}

#[derive(Clone, Debug, Default, Model)]
#[model(collection = "posts")]
pub struct Post {
    pub id: String,
    pub title: String,
    #[model(date)]
    pub created_on: Option<DateTime<Utc>>,
    #[model(to_one = "../users")]
    pub author: ToOne<User>,
    #[model(to_many = "~/labels")]
    pub labels: ToMany<Label>,
    #[model(sub = "comments")]
    pub comments: SubCollection<Comment>,
}
