pub mod comment;
pub mod coupon;
pub mod credit_note;
pub mod customer;
pub mod invoice;
pub mod subscription;
pub mod subscription_plan;
pub mod transaction;

use crate::api::{ListPage, ListRequest, Record};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use sync_connector::Result;

/// Chargebee list endpoint paths.
pub const INVOICES: &str = "invoices";
pub const CREDIT_NOTES: &str = "credit_notes";
pub const SUBSCRIPTIONS: &str = "subscriptions";
pub const CUSTOMERS: &str = "customers";
pub const TRANSACTIONS: &str = "transactions";
pub const COUPONS: &str = "coupons";
pub const COUPON_SETS: &str = "coupon_sets";
pub const COUPON_CODES: &str = "coupon_codes";
pub const ITEM_PRICES: &str = "item_prices";
pub const COMMENTS: &str = "comments";

/// Delta field of most endpoints.
pub const UPDATED_AT: &str = "updated_at";

pub async fn list(ctx: &SyncContext<'_>, resource: &str, request: ListRequest) -> Result<ListPage> {
    ctx.client.list(resource, &request).await
}

/// Invoice listing shared by invoices, their line items and promotional
/// credits: restricted to `filter.ids` and bounded by `updated_at`.
pub async fn list_invoices(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<ListPage> {
    let mut request = ctx.request(cursor.map(|c| c.offset), Some(UPDATED_AT));
    if !ctx.filter.ids.is_empty() {
        request = request.filter("id", "in", json_list(&ctx.filter.ids));
    }
    list(ctx, INVOICES, request).await
}

/// Page of already transformed items; the next cursor follows `next_offset`.
pub fn page(items: Vec<Record>, list: &ListPage) -> Page {
    Page {
        items,
        next: OffsetCursor::at(list.next_offset()),
    }
}

/// `["a","b"]`, the value format of Chargebee's `[in]` filters.
pub fn json_list(ids: &[String]) -> String {
    serde_json::Value::from(ids.to_vec()).to_string()
}
