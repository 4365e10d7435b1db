// Static metadata: synchronizer config, schema fields, datalists

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One synchronizable entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    pub id: String,
    pub name: String,
    pub default: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_user: bool,
}

impl TypeMeta {
    pub fn new(id: impl Into<String>, name: impl Into<String>, default: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            default,
            is_user: false,
        }
    }

    pub fn user(mut self) -> Self {
        self.is_user = true;
        self
    }
}

/// A filter the user can set before synchronizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMeta {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub datalist: bool,
    pub optional: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynchronizerConfig {
    pub types: Vec<TypeMeta>,
    pub filters: Vec<FilterMeta>,
    pub version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "array[text]")]
    TextArray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// `many-to-one`, `many-to-many` or `one-to-one`
    pub cardinality: String,
    pub name: String,
    pub target_name: String,
    pub target_type: String,
    pub target_field_id: String,
}

/// Field of a type schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            sub_type: None,
            options: None,
            format: None,
            relation: None,
        }
    }

    pub fn id() -> Self {
        Self::new("Id", FieldType::Id)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn sub_type(mut self, sub_type: &str) -> Self {
        self.sub_type = Some(sub_type.to_string());
        self
    }

    pub fn select(mut self, options: &[&str]) -> Self {
        self.sub_type = Some("single-select".to_string());
        self.options = Some(
            options
                .iter()
                .map(|name| serde_json::json!({ "name": name }))
                .collect(),
        );
        self
    }

    pub fn relation(
        mut self,
        cardinality: &str,
        name: &str,
        target_name: &str,
        target_type: &str,
    ) -> Self {
        self.relation = Some(Relation {
            cardinality: cardinality.to_string(),
            name: name.to_string(),
            target_name: target_name.to_string(),
            target_type: target_type.to_string(),
            target_field_id: "id".to_string(),
        });
        self
    }
}

/// Field id -> field, for one entity type.
pub type TypeSchema = BTreeMap<String, SchemaField>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatalistItem {
    pub title: String,
    pub value: String,
}

impl DatalistItem {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datalist {
    pub items: Vec<DatalistItem>,
}
