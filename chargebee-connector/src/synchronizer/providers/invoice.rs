use super::{list, list_invoices, page, INVOICES, UPDATED_AT};
use crate::api::Record;
use crate::config::app_url;
use crate::synchronizer::transform::{
    convert_cents, convert_seconds, convert_start_case, put, str_field, IdFormat,
};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;

const INVOICE: &str = "invoice";

const COUPON_DISCOUNTS: [&str; 2] = ["item_level_coupon", "document_level_coupon"];

/// Only settled invoices get a downloadable PDF.
const PDF_STATUSES: [&str; 2] = ["paid", "voided"];

pub async fn fetch_invoices(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let list = list_invoices(ctx, cursor).await?;
    let items = list
        .entities(INVOICE)
        .into_iter()
        .map(|invoice| transform_invoice(ctx.site, ctx.ids, invoice))
        .collect();
    Ok(page(items, &list))
}

pub async fn fetch_line_items(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let list = list_invoices(ctx, cursor).await?;
    let items = list
        .entities(INVOICE)
        .iter()
        .flat_map(|invoice| line_items(ctx.ids, invoice))
        .collect();
    Ok(page(items, &list))
}

/// Promotional credits only exist as discounts of invoices.
pub async fn fetch_promotional_credits(
    ctx: &SyncContext<'_>,
    cursor: Option<OffsetCursor>,
) -> Result<Page> {
    let request = ctx.request(cursor.map(|c| c.offset), Some(UPDATED_AT));
    let list = list(ctx, INVOICES, request).await?;
    let items = list
        .entities(INVOICE)
        .iter()
        .flat_map(|invoice| promotional_credits(ctx.ids, invoice))
        .collect();
    Ok(page(items, &list))
}

pub fn transform_invoice(site: &str, ids: IdFormat, mut invoice: Record) -> Record {
    let raw_id = str_field(&invoice, "id").unwrap_or_default().to_string();
    let has_pdf = str_field(&invoice, "status").map_or(false, |s| PDF_STATUSES.contains(&s));

    let coupon_ids = invoice
        .get("line_item_discounts")
        .and_then(Value::as_array)
        .map(|discounts| {
            discounts
                .iter()
                .filter(|d| {
                    d.get("discount_type")
                        .and_then(Value::as_str)
                        .map_or(false, |t| COUPON_DISCOUNTS.contains(&t))
                })
                .filter_map(|d| d.get("entity_id").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(";")
        })
        .unwrap_or_default();

    invoice.insert("id".into(), Value::String(ids.wrap(&raw_id)));
    invoice.insert("name".into(), Value::String(raw_id.clone()));
    convert_seconds(
        &mut invoice,
        &[
            "date",
            "due_date",
            "paid_at",
            "next_retry_at",
            "voided_at",
            "updated_at",
            "generated_at",
            "expected_payment_date",
        ],
    );
    convert_start_case(&mut invoice, &["status", "price_type", "channel"]);
    convert_cents(
        &mut invoice,
        &[
            "total",
            "amount_paid",
            "amount_adjusted",
            "write_off_amount",
            "credits_applied",
            "amount_due",
            "sub_total",
            "tax",
            "amount_to_collect",
        ],
    );
    invoice.insert(
        "original_url".into(),
        Value::String(app_url(site, "invoices", &raw_id)),
    );
    invoice.insert("coupon_ids".into(), Value::String(coupon_ids));
    put(
        &mut invoice,
        "pdf",
        has_pdf.then(|| Value::String(format!("app://resource?type=invoice&pdfId={}", raw_id))),
    );
    invoice
}

fn line_items(ids: IdFormat, invoice: &Record) -> Vec<Record> {
    let invoice_id = invoice.get("id").cloned();
    let Some(items) = invoice.get("line_items").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| transform_line_item(ids, invoice_id.as_ref(), item.clone()))
        .collect()
}

pub fn transform_line_item(ids: IdFormat, invoice_id: Option<&Value>, mut item: Record) -> Record {
    let plan = match str_field(&item, "entity_type") {
        Some("plan_item_price") => item.get("entity_id").cloned(),
        _ => None,
    };
    let name = item.get("description").cloned();

    put(&mut item, "name", name);
    put(&mut item, "invoice_id", ids.wrap_value(invoice_id));
    convert_seconds(&mut item, &["date_from", "date_to"]);
    convert_start_case(&mut item, &["entity_type"]);
    convert_cents(
        &mut item,
        &["unit_amount", "amount", "tax_amount", "discount_amount"],
    );
    put(&mut item, "plan", plan);
    item
}

fn promotional_credits(ids: IdFormat, invoice: &Record) -> Vec<Record> {
    let invoice_id = str_field(invoice, "id").unwrap_or_default();
    let Some(discounts) = invoice.get("discounts").and_then(Value::as_array) else {
        return Vec::new();
    };
    discounts
        .iter()
        .filter(|d| d.get("entity_type").and_then(Value::as_str) == Some("promotional_credits"))
        .map(|d| transform_promotional_credit(ids, invoice_id, d))
        .collect()
}

/// Discounts carry no id of their own; invoice id and amount identify them.
pub fn transform_promotional_credit(ids: IdFormat, invoice_id: &str, discount: &Value) -> Record {
    let amount = discount.get("amount");
    let amount_label = match amount {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let mut credit = Record::new();
    credit.insert(
        "id".into(),
        Value::String(format!("{}-{}", invoice_id, amount_label)),
    );
    credit.insert(
        "name".into(),
        Value::String(format!("Promotional Credit for Invoice {}", invoice_id)),
    );
    put(&mut credit, "description", discount.get("description").cloned());
    put(&mut credit, "amount", amount.cloned());
    convert_cents(&mut credit, &["amount"]);
    credit.insert("invoice_id".into(), Value::String(ids.wrap(invoice_id)));
    credit
}
