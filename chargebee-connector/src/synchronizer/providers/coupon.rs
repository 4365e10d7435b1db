use super::{json_list, list, page, COUPONS, COUPON_CODES, COUPON_SETS, UPDATED_AT};
use crate::api::{ListPage, Record};
use crate::config::app_url;
use crate::synchronizer::transform::{convert_cents, convert_seconds, convert_start_case, str_field};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;
use tracing::debug;

pub async fn fetch_coupons(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let request = ctx.request(cursor.map(|c| c.offset), Some(UPDATED_AT));
    let list = list(ctx, COUPONS, request).await?;
    let items = list
        .entities("coupon")
        .into_iter()
        .map(|coupon| transform_coupon(ctx.site, coupon))
        .collect();
    Ok(page(items, &list))
}

pub async fn fetch_coupon_sets(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    fetch_by_coupon(ctx, cursor, COUPON_SETS, "coupon_set", |set| set).await
}

pub async fn fetch_coupon_codes(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    fetch_by_coupon(ctx, cursor, COUPON_CODES, "coupon_code", transform_coupon_code).await
}

/// Coupon sets and codes have no delta field of their own. They are listed
/// for the coupons changed since the last synchronization; the first page
/// collects those coupon ids and every later cursor carries them along.
async fn fetch_by_coupon(
    ctx: &SyncContext<'_>,
    cursor: Option<OffsetCursor>,
    resource: &str,
    key: &str,
    transform: impl Fn(Record) -> Record,
) -> Result<Page> {
    let (offset, coupon_ids) = match cursor {
        Some(OffsetCursor {
            offset,
            coupon_ids: Some(ids),
        }) if !ids.is_empty() => (Some(offset), ids),
        Some(cursor) => (Some(cursor.offset), collect_coupon_ids(ctx).await?),
        None => (None, collect_coupon_ids(ctx).await?),
    };

    if coupon_ids.is_empty() {
        debug!(resource, "No coupons to list");
        return Ok(Page {
            items: Vec::new(),
            next: None,
        });
    }

    let request = ctx
        .request(offset, None)
        .filter("coupon_id", "in", json_list(&coupon_ids));
    let list: ListPage = list(ctx, resource, request).await?;
    let items = list.entities(key).into_iter().map(transform).collect();

    let mut page = page(items, &list);
    if let Some(next) = page.next.as_mut() {
        next.coupon_ids = Some(coupon_ids);
    }
    Ok(page)
}

/// Ids of every coupon within the delta window, across all pages.
async fn collect_coupon_ids(ctx: &SyncContext<'_>) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut offset = None;
    loop {
        let request = ctx.request(offset, Some(UPDATED_AT));
        let list = list(ctx, COUPONS, request).await?;
        ids.extend(
            list.entities("coupon")
                .iter()
                .filter_map(|coupon| str_field(coupon, "id"))
                .map(str::to_string),
        );
        offset = list.next_offset();
        if offset.is_none() {
            break;
        }
    }
    debug!(count = ids.len(), "Collected coupon ids");
    Ok(ids)
}

pub fn transform_coupon(site: &str, mut coupon: Record) -> Record {
    let id = str_field(&coupon, "id").unwrap_or_default().to_string();
    convert_start_case(
        &mut coupon,
        &[
            "discount_type",
            "duration_type",
            "status",
            "apply_on",
            "period_unit",
        ],
    );
    convert_cents(&mut coupon, &["discount_percentage", "discount_amount"]);
    convert_seconds(
        &mut coupon,
        &["valid_till", "created_at", "archived_at", "updated_at"],
    );
    coupon.insert(
        "original_url".into(),
        Value::String(app_url(site, "coupons", &urlencoding::encode(&id))),
    );
    coupon
}

/// Codes are unique per coupon only.
pub fn transform_coupon_code(mut code: Record) -> Record {
    let coupon_id = str_field(&code, "coupon_id").unwrap_or_default().to_string();
    let value = str_field(&code, "code").unwrap_or_default().to_string();
    code.insert(
        "id".into(),
        Value::String(format!("{}-{}", coupon_id, value)),
    );
    code.insert("name".into(), Value::String(value));
    convert_start_case(&mut code, &["status"]);
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coupon_transform() {
        let coupon = json!({
            "id": "SAVE 10",
            "name": "Save ten",
            "discount_type": "fixed_amount",
            "discount_amount": 1000,
            "duration_type": "one_time",
            "status": "active",
            "created_at": 1700000000
        });

        let out = transform_coupon("acme", coupon.as_object().unwrap().clone());
        assert_eq!(out["name"], "Save ten");
        assert_eq!(out["discount_type"], "Fixed Amount");
        assert_eq!(out["discount_amount"], json!(10.0));
        assert_eq!(out["duration_type"], "One Time");
        assert_eq!(out["created_at"], json!(1700000000000i64));
        assert_eq!(
            out["original_url"],
            "https://acme.chargebee.com/d/coupons/SAVE%2010"
        );
    }

    #[test]
    fn test_coupon_code_transform() {
        let code = json!({"coupon_id": "SAVE10", "code": "ABC-123", "status": "not_redeemed"});
        let out = transform_coupon_code(code.as_object().unwrap().clone());
        assert_eq!(out["id"], "SAVE10-ABC-123");
        assert_eq!(out["name"], "ABC-123");
        assert_eq!(out["status"], "Not Redeemed");
    }
}
