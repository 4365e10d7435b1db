use super::{list, page, TRANSACTIONS, UPDATED_AT};
use crate::api::Record;
use crate::config::app_url;
use crate::synchronizer::transform::{
    convert_cents, convert_start_case, join_ids, put, str_field, IdFormat,
};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;

pub async fn fetch(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let request = ctx.request(cursor.map(|c| c.offset), Some(UPDATED_AT));
    let list = list(ctx, TRANSACTIONS, request).await?;
    let items = list
        .entities("transaction")
        .into_iter()
        .map(|txn| transform(ctx.site, ctx.ids, txn))
        .collect();
    Ok(page(items, &list))
}

pub fn transform(site: &str, ids: IdFormat, mut txn: Record) -> Record {
    let id = str_field(&txn, "id").unwrap_or_default().to_string();
    let card_brand = str_field(&txn, "payment_method_details").and_then(card_brand);
    let invoice_ids = join_ids(&txn, "linked_invoices", "invoice_id", |id| ids.wrap(id));
    let credit_note_ids = join_ids(&txn, "linked_credit_notes", "cn_id", |id| ids.wrap(id));

    txn.insert("name".into(), Value::String(id.clone()));
    convert_start_case(&mut txn, &["payment_method", "type", "gateway"]);
    put(&mut txn, "card_brand", card_brand);
    convert_cents(&mut txn, &["amount"]);
    put(&mut txn, "invoice_ids", invoice_ids.map(Value::String));
    put(&mut txn, "credit_note_ids", credit_note_ids.map(Value::String));
    txn.insert(
        "original_url".into(),
        Value::String(app_url(site, "transactions", &id)),
    );
    txn
}

/// `payment_method_details` is a JSON document serialized into a string.
fn card_brand(details: &str) -> Option<Value> {
    let details: Value = serde_json::from_str(details).ok()?;
    details.get("card")?.get("brand").cloned()
}
