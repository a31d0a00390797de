use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, Value, DATE_ADDED, DESCRIPTION, PHOTO_URL, QUANTITY};
use crate::error::{InventoryError, Result};

/// One inventory entry, keyed by its name.
///
/// The name is the document key in the backing collection, so it is
/// case-sensitive and unique. A stored item always has `quantity >= 1`;
/// the adapter deletes the document rather than write a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            date_added: None,
            photo_url: None,
            description: None,
        }
    }

    /// Quantity with absent treated as zero.
    pub fn quantity(&self) -> i64 {
        self.quantity.unwrap_or(0)
    }

    /// Hydrate an item from a stored document and its key.
    pub fn from_document(key: &str, doc: &Document) -> Self {
        let date_added = doc.get(DATE_ADDED).and_then(Value::as_str).and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(item = key, value = raw, "ignoring unparsable dateAdded: {}", e);
                    None
                }
            }
        });

        Self {
            name: key.to_string(),
            quantity: doc.get(QUANTITY).and_then(Value::as_int),
            date_added,
            photo_url: doc.get(PHOTO_URL).and_then(Value::as_str).map(str::to_string),
            description: doc.get(DESCRIPTION).and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Stored fields of this item. The name is the key and is not included.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        if let Some(q) = self.quantity {
            doc.insert(QUANTITY.into(), Value::Int(q));
        }
        if let Some(dt) = self.date_added {
            doc.insert(DATE_ADDED.into(), Value::String(format_timestamp(dt)));
        }
        if let Some(url) = &self.photo_url {
            doc.insert(PHOTO_URL.into(), url.as_str().into());
        }
        if let Some(desc) = &self.description {
            doc.insert(DESCRIPTION.into(), desc.as_str().into());
        }
        doc
    }
}

/// Metadata stamped onto an item when it is first created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

impl NewItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Drop empty or whitespace-only fields; an empty form field means "not supplied".
    pub fn normalized(self) -> Self {
        fn keep(s: Option<String>) -> Option<String> {
            s.filter(|v| !v.trim().is_empty())
        }
        Self {
            description: keep(self.description),
            photo_url: keep(self.photo_url),
        }
    }
}

/// Reject names that cannot be used as a document key.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(InventoryError::InvalidName(name.to_string()));
    }
    Ok(())
}

pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
