use sync_connector::descriptor::{AuthField, Authentication, ConnectorDescriptor, ResponsibleFor};

pub fn descriptor() -> ConnectorDescriptor {
    ConnectorDescriptor {
        id: "chargebee-connector".to_string(),
        name: "Chargebee".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        kind: "crunch".to_string(),
        description: "Automatically sync Chargebee invoices to Fibery.".to_string(),
        authentication: vec![Authentication {
            id: "token".to_string(),
            name: "Token Authentication".to_string(),
            description: "Provide Chargebee API key".to_string(),
            fields: vec![
                AuthField::input(
                    "site",
                    "Site",
                    "Subdomain in Chargebee. Example of site: https://{site}.chargebee.com",
                    "text",
                ),
                AuthField::input("apiKey", "API Key", "Personal Chargebee API key", "password"),
                AuthField::link(
                    "token-link",
                    "Generate API key...",
                    "We need to have your API key to use Chargebee API for retrieving data.",
                    "https://www.chargebee.com/docs/2.0/api_keys.html",
                ),
            ],
            kind: None,
            provider: None,
        }],
        sources: vec![],
        actions: vec![],
        responsible_for: ResponsibleFor {
            user_authentication: Some(false),
            data_providing: Some(false),
            data_synchronization: true,
            data_import: Some(true),
            automations: None,
        },
    }
}
