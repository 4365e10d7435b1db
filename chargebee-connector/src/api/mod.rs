// Chargebee REST adapter

mod client;

pub use client::ChargebeeClient;

use axum::body::Bytes;
use futures::stream::BoxStream;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One Chargebee object as returned by the API. Entities are passed through
/// mostly untouched, so they stay untyped.
pub type Record = Map<String, Value>;

pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// One page of a list endpoint: `{"list": [{"<entity>": {..}}, ..], "next_offset": ".."}`
#[derive(Debug, Default, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub list: Vec<Record>,
    #[serde(default)]
    pub next_offset: Option<String>,
}

impl ListPage {
    /// Offset of the next page; empty means there is none.
    pub fn next_offset(&self) -> Option<String> {
        self.next_offset.clone().filter(|o| !o.is_empty())
    }

    /// The `key` object of every entry. Entries without it are dropped.
    pub fn entities(&self, key: &str) -> Vec<Record> {
        self.list
            .iter()
            .filter_map(|entry| entry.get(key).and_then(Value::as_object).cloned())
            .collect()
    }
}

/// Query of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub limit: u32,
    pub offset: Option<String>,
    /// `field[operator]` filters
    pub filters: Vec<(String, String)>,
}

impl ListRequest {
    pub fn new(limit: u32, offset: Option<String>) -> Self {
        Self {
            limit,
            offset,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, field: &str, operator: &str, value: impl Into<String>) -> Self {
        self.filters
            .push((format!("{}[{}]", field, operator), value.into()));
        self
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("limit".to_string(), self.limit.to_string())];
        if let Some(offset) = &self.offset {
            query.push(("offset".to_string(), offset.clone()));
        }
        query.extend(self.filters.iter().cloned());
        query
    }
}

/// Opened PDF download.
pub struct Download {
    pub content_length: Option<u64>,
    pub body: ByteStream,
}
