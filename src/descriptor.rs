// Connector descriptor served on `GET /`

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub authentication: Vec<Authentication>,
    pub sources: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    pub responsible_for: ResponsibleFor,
}

#[derive(Debug, Clone, Serialize)]
pub struct Authentication {
    pub id: String,
    pub name: String,
    pub description: String,
    pub fields: Vec<AuthField>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuthField {
    /// `oauth`, `password` or `text` input
    Input {
        id: String,
        title: String,
        description: String,
        #[serde(rename = "type")]
        kind: String,
    },
    Link {
        id: String,
        name: String,
        description: String,
        value: String,
        #[serde(rename = "type")]
        kind: String,
    },
}

impl AuthField {
    pub fn input(id: &str, title: &str, description: &str, kind: &str) -> Self {
        AuthField::Input {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn link(id: &str, name: &str, description: &str, value: &str) -> Self {
        AuthField::Link {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            value: value.to_string(),
            kind: "link".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub action: String,
    pub name: String,
    pub description: String,
    pub args: Vec<ActionArg>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionArg {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text_template_supported: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsibleFor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_providing: Option<bool>,
    pub data_synchronization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_import: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automations: Option<bool>,
}
