// Synchronizer protocol types shared by every connector

pub mod meta;

pub use meta::{
    Datalist, DatalistItem, FieldType, FilterMeta, Relation, SchemaField, SynchronizerConfig,
    TypeMeta, TypeSchema,
};

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a page belongs to a full resync or to a delta on top of a
/// previous synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynchronizationType {
    Full,
    Delta,
}

/// Pure function of the request: a non-empty `lastSynchronizedAt` means delta.
pub fn synchronization_type(last_synchronized_at: Option<&str>) -> SynchronizationType {
    match last_synchronized_at {
        Some(ts) if !ts.is_empty() => SynchronizationType::Delta,
        _ => SynchronizationType::Full,
    }
}

/// `{hasNext, nextPageConfig?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination<P> {
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_config: Option<P>,
}

impl<P> Pagination<P> {
    /// `hasNext` is derived from the cursor so the two can never disagree.
    pub fn from_next(next: Option<P>) -> Self {
        Self {
            has_next: next.is_some(),
            next_page_config: next,
        }
    }

    pub fn done() -> Self {
        Self::from_next(None)
    }
}

/// Result envelope of one `/data` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizerData<T, P> {
    pub items: Vec<T>,
    pub synchronization_type: SynchronizationType,
    pub pagination: Pagination<P>,
}

impl<T: Serialize, P: Serialize> SynchronizerData<T, P> {
    pub fn new(items: Vec<T>, synchronization_type: SynchronizationType, next: Option<P>) -> Self {
        Self {
            items,
            synchronization_type,
            pagination: Pagination::from_next(next),
        }
    }

    /// Erase item and cursor types so a dispatcher can return one shape for
    /// every entity type.
    pub fn into_json(self) -> Result<SynchronizerData<Value, Value>> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(anyhow::Error::from)?;
        let next = self
            .pagination
            .next_page_config
            .map(serde_json::to_value)
            .transpose()
            .map_err(anyhow::Error::from)?;
        Ok(SynchronizerData::new(items, self.synchronization_type, next))
    }
}

/// Body of `POST /api/v1/synchronizer/data`, before the account is typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub account: Option<Value>,
    pub requested_type: Option<String>,
    pub filter: Option<Value>,
    pub last_synchronized_at: Option<String>,
    /// Opaque cursor from the previous page
    pub pagination: Option<Value>,
    pub version: Option<Value>,
}

impl DataRequest {
    pub fn requested_type(&self) -> Result<&str> {
        self.requested_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::missing("requestedType"))
    }

    pub fn synchronization_type(&self) -> SynchronizationType {
        synchronization_type(self.last_synchronized_at.as_deref())
    }

    /// The cursor, treating `null` and `{}` as "first page".
    pub fn cursor(&self) -> Option<&Value> {
        match &self.pagination {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(value) => Some(value),
        }
    }
}

/// Data request with the account already deserialized for a connector.
#[derive(Debug, Clone)]
pub struct DataQuery<A> {
    pub account: A,
    pub requested_type: String,
    pub filter: Option<Value>,
    pub last_synchronized_at: Option<String>,
    pub pagination: Option<Value>,
    pub version: Option<Value>,
}

impl<A> DataQuery<A> {
    pub fn synchronization_type(&self) -> SynchronizationType {
        synchronization_type(self.last_synchronized_at.as_deref())
    }

    pub fn last_synchronized_at(&self) -> Option<&str> {
        self.last_synchronized_at
            .as_deref()
            .filter(|ts| !ts.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_synchronization_type_follows_last_synchronized_at() {
        assert_eq!(synchronization_type(None), SynchronizationType::Full);
        assert_eq!(synchronization_type(Some("")), SynchronizationType::Full);
        assert_eq!(
            synchronization_type(Some("2024-01-01T00:00:00Z")),
            SynchronizationType::Delta
        );
        assert_eq!(synchronization_type(Some(" ")), SynchronizationType::Delta);
    }

    #[test]
    fn test_blank_last_synchronized_at_is_kept() {
        let query = DataQuery {
            account: (),
            requested_type: "file".to_string(),
            filter: None,
            last_synchronized_at: Some(" ".to_string()),
            pagination: None,
            version: None,
        };
        assert_eq!(query.synchronization_type(), SynchronizationType::Delta);
        assert_eq!(query.last_synchronized_at(), Some(" "));

        let query = DataQuery {
            last_synchronized_at: Some(String::new()),
            ..query
        };
        assert_eq!(query.synchronization_type(), SynchronizationType::Full);
        assert_eq!(query.last_synchronized_at(), None);
    }

    #[test]
    fn test_done_page_has_no_cursor() {
        let data: SynchronizerData<Value, Value> =
            SynchronizerData::new(vec![json!({"id": "1"})], SynchronizationType::Full, None);
        let body = serde_json::to_value(&data).unwrap();
        assert_eq!(body["pagination"], json!({"hasNext": false}));
        assert_eq!(body["synchronizationType"], "full");
    }

    #[test]
    fn test_next_page_carries_cursor() {
        let data = SynchronizerData::new(
            Vec::<Value>::new(),
            SynchronizationType::Delta,
            Some(json!({"offset": "abc"})),
        );
        let body = serde_json::to_value(&data).unwrap();
        assert_eq!(body["pagination"]["hasNext"], true);
        assert_eq!(body["pagination"]["nextPageConfig"]["offset"], "abc");
    }

    #[test]
    fn test_into_json_keeps_envelope() {
        #[derive(Serialize)]
        struct Item {
            id: &'static str,
        }

        let data = SynchronizerData::new(
            vec![Item { id: "a" }],
            SynchronizationType::Full,
            Some(42u32),
        )
        .into_json()
        .unwrap();
        assert_eq!(data.items, vec![json!({"id": "a"})]);
        assert_eq!(data.pagination.next_page_config, Some(json!(42)));
        assert!(data.pagination.has_next);
    }

    #[test]
    fn test_empty_cursor_means_first_page() {
        let mut request = DataRequest {
            pagination: Some(json!({})),
            ..Default::default()
        };
        assert!(request.cursor().is_none());

        request.pagination = Some(Value::Null);
        assert!(request.cursor().is_none());

        request.pagination = Some(json!({"type": "drive"}));
        assert!(request.cursor().is_some());
    }

    #[test]
    fn test_missing_requested_type() {
        let request = DataRequest::default();
        let err = request.requested_type().unwrap_err();
        assert_eq!(err.to_string(), "\"requestedType\" is missing");
    }
}
