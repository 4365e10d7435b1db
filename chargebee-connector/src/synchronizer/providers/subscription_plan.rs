use super::{list, page, ITEM_PRICES, UPDATED_AT};
use crate::api::Record;
use crate::config::app_url;
use crate::synchronizer::transform::{convert_cents, convert_start_case, str_field};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;

/// Plans are the item prices of `plan` items.
pub async fn fetch(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let request = ctx
        .request(cursor.map(|c| c.offset), Some(UPDATED_AT))
        .filter("item_type", "is", "plan");
    let list = list(ctx, ITEM_PRICES, request).await?;
    let items = list
        .entities("item_price")
        .into_iter()
        .map(|price| transform(ctx.site, price))
        .collect();
    Ok(page(items, &list))
}

pub fn transform(site: &str, mut price: Record) -> Record {
    let item_id = str_field(&price, "item_id").unwrap_or_default().to_string();
    convert_start_case(&mut price, &["period_unit", "pricing_model"]);
    convert_cents(&mut price, &["price"]);
    price.insert(
        "original_url".into(),
        Value::String(app_url(site, "plans", &item_id)),
    );
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_transform() {
        let price = json!({
            "id": "pro-USD-monthly",
            "item_id": "pro",
            "name": "Pro USD Monthly",
            "price": 4900,
            "period_unit": "month",
            "pricing_model": "per_unit"
        });

        let out = transform("acme", price.as_object().unwrap().clone());
        assert_eq!(out["name"], "Pro USD Monthly");
        assert_eq!(out["price"], json!(49.0));
        assert_eq!(out["period_unit"], "Month");
        assert_eq!(out["pricing_model"], "Per Unit");
        assert_eq!(out["original_url"], "https://acme.chargebee.com/d/plans/pro");
    }
}
