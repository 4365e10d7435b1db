use super::{list, page, SUBSCRIPTIONS};
use crate::api::Record;
use crate::config::app_url;
use crate::synchronizer::transform::{
    convert_cents, convert_seconds, join_ids, put, start_case, str_field,
};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;
use tracing::warn;

/// Subscriptions are always listed in full.
pub async fn fetch(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    if let Some(since) = ctx.since {
        warn!(since, "Ignoring lastSynchronizedAt for subscriptions");
    }
    let request = ctx.request(cursor.map(|c| c.offset), None);
    let list = list(ctx, SUBSCRIPTIONS, request).await?;
    let items = list
        .list
        .iter()
        .filter_map(|entry| {
            let subscription = entry.get("subscription")?.as_object()?.clone();
            let customer = entry.get("customer").and_then(Value::as_object);
            Some(transform(ctx.site, subscription, customer))
        })
        .collect();
    Ok(page(items, &list))
}

pub fn transform(site: &str, mut subscription: Record, customer: Option<&Record>) -> Record {
    let id = str_field(&subscription, "id").unwrap_or_default().to_string();
    let auto_collection = str_field(&subscription, "auto_collection")
        .or_else(|| customer.and_then(|c| str_field(c, "auto_collection")))
        == Some("on");
    let plan = subscription
        .get("subscription_items")
        .and_then(Value::as_array)
        .and_then(|items| {
            items
                .iter()
                .find(|i| i.get("item_type").and_then(Value::as_str) == Some("plan"))
        })
        .cloned();
    let plan_price = plan
        .as_ref()
        .and_then(|p| p.get("item_price_id"))
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    let name = subscription_name(
        &id,
        plan_price.as_deref(),
        str_field(&subscription, "cf_workspace_name"),
    );
    let coupon_ids = join_ids(&subscription, "coupons", "coupon_id", str::to_string);

    subscription.insert("auto_collection".into(), Value::Bool(auto_collection));
    subscription.insert("ui_id".into(), Value::String(id.clone()));
    subscription.insert("name".into(), Value::String(name));
    convert_cents(&mut subscription, &["mrr", "total_dues"]);
    convert_seconds(
        &mut subscription,
        &[
            "started_at",
            "cancelled_at",
            "next_billing_at",
            "current_term_start",
            "current_term_end",
            "due_since",
        ],
    );
    put(
        &mut subscription,
        "quantity",
        plan.as_ref().and_then(|p| p.get("quantity")).cloned(),
    );
    subscription.insert(
        "coupon_ids".into(),
        Value::String(coupon_ids.unwrap_or_default()),
    );
    put(&mut subscription, "plan", plan_price.map(Value::String));
    subscription.insert(
        "original_url".into(),
        Value::String(app_url(site, "subscriptions", &id)),
    );
    subscription
}

/// Plan name, prefixed with the workspace the subscription was bought for.
/// `acme.fibery.io` names the `acme` workspace.
fn subscription_name(id: &str, plan_price: Option<&str>, workspace: Option<&str>) -> String {
    let default = plan_price.map_or_else(|| id.to_string(), start_case);
    match workspace {
        Some(workspace) => {
            let workspace = match workspace.rfind(".fibery.") {
                Some(end) if end > 0 => &workspace[..end],
                _ => workspace,
            };
            format!("{} - {}", workspace, default)
        }
        None => default,
    }
}
