//! Record types shared by the integration tests.

use entity_store::{Record, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record)]
#[record(collection = "users")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl User {
    pub fn named(name: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            role: "member".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_id(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::named(name)
        }
    }

    pub fn role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }
}

/// A record without timestamps and with a non-default id field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record)]
pub struct Widget {
    #[record(id)]
    #[serde(default)]
    pub sku: String,
    pub label: String,
    pub price_cents: u32,
}

impl Widget {
    pub fn new(label: &str, price_cents: u32) -> Self {
        Self {
            sku: String::new(),
            label: label.to_string(),
            price_cents,
        }
    }
}
