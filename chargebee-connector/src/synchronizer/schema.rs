use super::providers::{CUSTOMERS, SUBSCRIPTIONS};
use super::transform::start_case;
use super::EntityType;
use crate::api::{ChargebeeClient, ListRequest};
use anyhow::Context;
use std::collections::BTreeMap;
use sync_connector::synchronizer::{SchemaField, TypeSchema};
use sync_connector::Result;
use tracing::warn;

const SCHEMA_JSON: &str = include_str!("../../assets/schema.json");

const CUSTOM_FIELD_PREFIX: &str = "cf_";

/// Built-in field schemas of every type.
pub fn static_schemas() -> Result<BTreeMap<String, TypeSchema>> {
    let schemas: BTreeMap<String, TypeSchema> =
        serde_json::from_str(SCHEMA_JSON).context("Invalid bundled schema")?;
    Ok(schemas)
}

/// Schemas of the requested types. With an account, subscriptions and
/// customers also get the site's custom fields.
pub async fn schemas(
    types: &[String],
    client: Option<&ChargebeeClient>,
) -> Result<BTreeMap<String, TypeSchema>> {
    let mut all = static_schemas()?;
    let mut result = BTreeMap::new();

    for name in types {
        let Ok(entity) = name.parse::<EntityType>() else {
            continue;
        };
        let Some(mut schema) = all.remove(entity.as_str()) else {
            continue;
        };
        if let (Some(client), true) = (client, entity.has_custom_fields()) {
            match custom_fields(client, entity).await {
                Ok(fields) => schema.extend(fields),
                Err(e) => warn!(
                    requested_type = %entity,
                    "Failed to load custom fields, using built-in schema: {}", e
                ),
            }
        }
        result.insert(name.clone(), schema);
    }
    Ok(result)
}

/// `cf_*` keys of the most recent record, as text fields.
async fn custom_fields(client: &ChargebeeClient, entity: EntityType) -> Result<TypeSchema> {
    let resource = match entity {
        EntityType::Subscription => SUBSCRIPTIONS,
        _ => CUSTOMERS,
    };
    let page = client.list(resource, &ListRequest::new(1, None)).await?;
    let fields: TypeSchema = page
        .entities(entity.as_str())
        .first()
        .map(|record| {
            record
                .keys()
                .filter_map(|key| {
                    let label = key.strip_prefix(CUSTOM_FIELD_PREFIX)?;
                    Some((key.clone(), SchemaField::text(start_case(label))))
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_connector::synchronizer::FieldType;

    #[test]
    fn test_bundled_schema_covers_every_type() {
        let schemas = static_schemas().unwrap();
        for entity in EntityType::ALL {
            let schema = &schemas[entity.as_str()];
            assert_eq!(schema["id"].kind, FieldType::Id, "{}", entity);
            assert!(schema.contains_key("name"), "{}", entity);
        }
    }

    #[test]
    fn test_invoice_relations() {
        let schemas = static_schemas().unwrap();
        let customer = schemas["invoice"]["customer_id"].relation.as_ref().unwrap();
        assert_eq!(customer.target_type, "customer");
        let invoice = schemas["invoice_line_item"]["invoice_id"].relation.as_ref().unwrap();
        assert_eq!(invoice.target_type, "invoice");
    }

    #[tokio::test]
    async fn test_unknown_types_are_skipped() {
        let types = vec!["invoice".to_string(), "refund".to_string()];
        let result = schemas(&types, None).await.unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["invoice"]);
    }
}
