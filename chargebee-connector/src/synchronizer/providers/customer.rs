use super::{list, page, CUSTOMERS, UPDATED_AT};
use crate::api::Record;
use crate::config::app_url;
use crate::synchronizer::transform::{
    convert_cents, convert_start_case, put, start_case_value, str_field,
};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;

/// `billing_address` keys copied onto the customer, and their target fields.
const BILLING_FIELDS: [(&str, &str); 11] = [
    ("email", "billing_email"),
    ("company", "billing_company"),
    ("phone", "billing_phone"),
    ("line1", "billing_address_line1"),
    ("line2", "billing_address_line2"),
    ("line3", "billing_address_line3"),
    ("city", "billing_city"),
    ("state_code", "billing_state_code"),
    ("state", "billing_state"),
    ("country", "billing_country"),
    ("zip", "billing_zip"),
];

pub async fn fetch(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let request = ctx.request(cursor.map(|c| c.offset), Some(UPDATED_AT));
    let list = list(ctx, CUSTOMERS, request).await?;
    let items = list
        .entities("customer")
        .into_iter()
        .map(|customer| transform(ctx.site, customer))
        .collect();
    Ok(page(items, &list))
}

pub fn transform(site: &str, mut customer: Record) -> Record {
    let id = str_field(&customer, "id").unwrap_or_default().to_string();
    let name = match (
        str_field(&customer, "first_name"),
        str_field(&customer, "last_name"),
    ) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        _ => str_field(&customer, "email").unwrap_or(id.as_str()).to_string(),
    };
    let auto_collection = str_field(&customer, "auto_collection") == Some("on");
    let billing = customer
        .get("billing_address")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    customer.insert("name".into(), Value::String(name));
    customer.insert("auto_collection".into(), Value::Bool(auto_collection));
    convert_cents(&mut customer, &["unbilled_charges", "excess_payments"]);
    convert_start_case(&mut customer, &["offline_payment_method"]);
    for (source, target) in BILLING_FIELDS {
        put(&mut customer, target, billing.get(source).cloned());
    }
    put(
        &mut customer,
        "billing_validation_status",
        start_case_value(billing.get("validation_status")),
    );
    customer.insert(
        "original_url".into(),
        Value::String(app_url(site, "customers", &id)),
    );
    customer
}
