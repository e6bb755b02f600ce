//! Blog models declared with the derive.

use chrono::{DateTime, Utc};
use docmap::{Model, SubCollection, ToMany, ToOne};

#[derive(Clone, Debug, Default, PartialEq, Model)]
#[model(collection = "authors")]
pub struct Author {
    pub id: String,
    #[model(map_to = "fullName")]
    pub full_name: String,
    pub email: Option<String>,
    #[model(ignore)]
    pub cached_score: u32,
}

impl Author {
    pub fn new(id: &str, full_name: &str) -> Self {
        Self {
            id: id.to_string(),
            full_name: full_name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Model)]
#[model(collection = "tags")]
pub struct Tag {
    pub id: String,
    pub label: String,
}

/// Only ever stored under an article, so it names no collection.
#[derive(Clone, Debug, Default, PartialEq, Model)]
pub struct Comment {
    #[model(id)]
    pub key: String,
    pub body: String,
}

#[derive(Clone, Debug, Default, Model)]
#[model(collection = "articles")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub word_count: u32,
    #[model(date)]
    pub published_on: Option<DateTime<Utc>>,
    #[model(to_one = "../authors")]
    pub author: ToOne<Author>,
    #[model(to_many = "~/tags")]
    pub tags: ToMany<Tag>,
    #[model(sub = "comments")]
    pub comments: SubCollection<Comment>,
    #[model(convert = "crate::models::money")]
    pub price: Money,
    #[model(convert_array = "crate::models::money")]
    pub discounts: Vec<Money>,
}

/// An amount in cents, stored as a `"12.50"` string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Money {
    pub cents: i64,
}

pub mod money {
    use docmap::MappingError;
    use serde_json::Value;

    use super::Money;

    pub fn to_model(value: Option<&Value>) -> Result<Money, MappingError> {
        let text = match value {
            None | Some(Value::Null) => return Ok(Money::default()),
            Some(Value::String(text)) => text,
            Some(other) => {
                return Err(MappingError::InvalidValue {
                    expected: "amount string",
                    found: other.to_string(),
                })
            }
        };
        let invalid = || MappingError::InvalidValue {
            expected: "amount like 12.50",
            found: text.clone(),
        };
        let (whole, fraction) = text.split_once('.').ok_or_else(invalid)?;
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = fraction.parse().map_err(|_| invalid())?;
        Ok(Money {
            cents: whole * 100 + fraction,
        })
    }

    pub fn to_document(money: &Money) -> Result<Value, MappingError> {
        Ok(Value::String(format!("{}.{:02}", money.cents / 100, money.cents % 100)))
    }
}
