use super::{list, page, CREDIT_NOTES, UPDATED_AT};
use crate::api::Record;
use crate::config::app_url;
use crate::synchronizer::transform::{
    cents_to_dollars, convert_cents, convert_seconds, convert_start_case, join_ids, put,
    str_field, IdFormat,
};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;

pub async fn fetch(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let request = ctx.request(cursor.map(|c| c.offset), Some(UPDATED_AT));
    let list = list(ctx, CREDIT_NOTES, request).await?;
    let items = list
        .entities("credit_note")
        .into_iter()
        .map(|note| transform(ctx.site, ctx.ids, note))
        .collect();
    Ok(page(items, &list))
}

pub fn transform(site: &str, ids: IdFormat, mut note: Record) -> Record {
    let raw_id = str_field(&note, "id").unwrap_or_default().to_string();
    let vat = note
        .get("taxes")
        .and_then(Value::as_array)
        .and_then(|taxes| {
            taxes
                .iter()
                .find(|tax| tax.get("name").and_then(Value::as_str) == Some("VAT"))
        })
        .and_then(|tax| cents_to_dollars(tax.get("amount")));
    let allocated = join_ids(&note, "allocations", "invoice_id", |id| ids.wrap(id));
    let refunded = join_ids(&note, "linked_refunds", "txn_id", str::to_string);
    let reference_invoice = ids.wrap_value(note.get("reference_invoice_id"));

    note.insert("id".into(), Value::String(ids.wrap(&raw_id)));
    note.insert("name".into(), Value::String(raw_id.clone()));
    put(&mut note, "reference_invoice_id", reference_invoice);
    convert_start_case(
        &mut note,
        &["type", "reason_code", "status", "price_type", "channel"],
    );
    put(&mut note, "vat", vat);
    convert_seconds(
        &mut note,
        &["date", "refunded_at", "voided_at", "updated_at", "generated_at"],
    );
    put(&mut note, "allocated_invoice_ids", allocated.map(Value::String));
    put(&mut note, "refunded_transactions", refunded.map(Value::String));
    convert_cents(
        &mut note,
        &[
            "total",
            "amount_allocated",
            "amount_refunded",
            "amount_available",
            "fractional_correction",
            "sub_total",
        ],
    );
    note.insert(
        "original_url".into(),
        Value::String(app_url(site, "credit_notes", &raw_id)),
    );
    note.insert(
        "pdf".into(),
        Value::String(format!("app://resource?type=credit_note&pdfId={}", raw_id)),
    );
    note
}
