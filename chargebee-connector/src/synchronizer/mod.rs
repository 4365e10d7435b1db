// Chargebee synchronization: offset pagination over list endpoints

pub mod config;
pub mod providers;
pub mod schema;
pub mod transform;

use crate::api::{ChargebeeClient, ListRequest, Record};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use sync_connector::{AppError, DataQuery, Result, SynchronizerData};
use tracing::info;
use providers::{
    comment, coupon, credit_note, customer, invoice, subscription, subscription_plan, transaction,
};
use transform::{parse_version, IdFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Invoice,
    InvoiceLineItem,
    CreditNote,
    Subscription,
    Customer,
    Transaction,
    PromotionalCredit,
    Coupon,
    CouponSet,
    CouponCode,
    SubscriptionPlan,
    Comment,
}

impl EntityType {
    pub const ALL: [EntityType; 12] = [
        EntityType::Invoice,
        EntityType::InvoiceLineItem,
        EntityType::CreditNote,
        EntityType::Subscription,
        EntityType::Customer,
        EntityType::Transaction,
        EntityType::PromotionalCredit,
        EntityType::Coupon,
        EntityType::CouponSet,
        EntityType::CouponCode,
        EntityType::SubscriptionPlan,
        EntityType::Comment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Invoice => "invoice",
            EntityType::InvoiceLineItem => "invoice_line_item",
            EntityType::CreditNote => "credit_note",
            EntityType::Subscription => "subscription",
            EntityType::Customer => "customer",
            EntityType::Transaction => "transaction",
            EntityType::PromotionalCredit => "promotional_credit",
            EntityType::Coupon => "coupon",
            EntityType::CouponSet => "coupon_set",
            EntityType::CouponCode => "coupon_code",
            EntityType::SubscriptionPlan => "subscription_plan",
            EntityType::Comment => "comment",
        }
    }

    /// Types whose records carry site-specific `cf_*` fields.
    pub fn has_custom_fields(&self) -> bool {
        matches!(self, EntityType::Subscription | EntityType::Customer)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("invalid \"requestedType\" {}", s)))
    }
}

/// Cursor of every Chargebee type: the vendor's `next_offset`. Coupon sets
/// and coupon codes also carry the coupon ids collected on their first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetCursor {
    pub offset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_ids: Option<Vec<String>>,
}

impl OffsetCursor {
    pub fn at(offset: Option<String>) -> Option<Self> {
        offset.map(|offset| Self {
            offset,
            coupon_ids: None,
        })
    }

    pub fn parse(value: Option<&Value>) -> Result<Option<Self>> {
        value
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| AppError::validation(format!("Invalid pagination: {}", e)))
            })
            .transpose()
    }
}

/// `{"ids": [...]}` restricts invoices and their line items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargebeeFilter {
    #[serde(default)]
    pub ids: Vec<String>,
}

impl ChargebeeFilter {
    pub fn parse(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| AppError::validation(format!("Invalid filter: {}", e))),
        }
    }
}

/// `lastSynchronizedAt` as epoch seconds: an ISO-8601 timestamp, or epoch
/// milliseconds. Any other non-empty value, blanks included, is rejected.
pub fn delta_seconds(last_synchronized_at: Option<&str>) -> Result<Option<i64>> {
    let Some(value) = last_synchronized_at.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(timestamp.timestamp()));
    }
    value
        .parse::<i64>()
        .map(|millis| Some(millis / 1000))
        .map_err(|_| AppError::validation(format!("Invalid lastSynchronizedAt: {}", value)))
}

/// Everything a provider needs for one page.
pub struct SyncContext<'a> {
    pub client: &'a ChargebeeClient,
    pub site: &'a str,
    pub page_size: u32,
    pub ids: IdFormat,
    pub filter: ChargebeeFilter,
    /// Lower bound of a delta synchronization, epoch seconds
    pub since: Option<i64>,
}

impl SyncContext<'_> {
    /// First-page or follow-up request, bounded by `since` on `field`.
    pub fn request(&self, offset: Option<String>, delta_field: Option<&str>) -> ListRequest {
        let request = ListRequest::new(self.page_size, offset);
        match (delta_field, self.since) {
            (Some(field), Some(since)) => request.filter(field, "after", since.to_string()),
            _ => request,
        }
    }
}

pub struct Page {
    pub items: Vec<Record>,
    pub next: Option<OffsetCursor>,
}

/// Fetch one page of `query.requested_type`.
pub async fn fetch_data<A>(
    client: &ChargebeeClient,
    site: &str,
    page_size: u32,
    query: &DataQuery<A>,
) -> Result<SynchronizerData<Value, Value>> {
    let entity: EntityType = query.requested_type.parse()?;
    let cursor = OffsetCursor::parse(query.pagination.as_ref())?;
    let ctx = SyncContext {
        client,
        site,
        page_size,
        ids: IdFormat::new(parse_version(query.version.as_ref())),
        filter: ChargebeeFilter::parse(query.filter.as_ref())?,
        since: delta_seconds(query.last_synchronized_at())?,
    };

    info!(
        requested_type = %entity,
        offset = ?cursor.as_ref().map(|c| c.offset.as_str()),
        since = ?ctx.since,
        "Fetching data"
    );
    let started = Instant::now();

    let page = match entity {
        EntityType::Invoice => invoice::fetch_invoices(&ctx, cursor).await?,
        EntityType::InvoiceLineItem => invoice::fetch_line_items(&ctx, cursor).await?,
        EntityType::PromotionalCredit => invoice::fetch_promotional_credits(&ctx, cursor).await?,
        EntityType::CreditNote => credit_note::fetch(&ctx, cursor).await?,
        EntityType::Subscription => subscription::fetch(&ctx, cursor).await?,
        EntityType::Customer => customer::fetch(&ctx, cursor).await?,
        EntityType::Transaction => transaction::fetch(&ctx, cursor).await?,
        EntityType::Coupon => coupon::fetch_coupons(&ctx, cursor).await?,
        EntityType::CouponSet => coupon::fetch_coupon_sets(&ctx, cursor).await?,
        EntityType::CouponCode => coupon::fetch_coupon_codes(&ctx, cursor).await?,
        EntityType::SubscriptionPlan => subscription_plan::fetch(&ctx, cursor).await?,
        EntityType::Comment => comment::fetch(&ctx, cursor).await?,
    };

    info!(
        requested_type = %entity,
        items = page.items.len(),
        has_next = page.next.is_some(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Fetched data"
    );

    let items = page.items.into_iter().map(Value::Object).collect();
    SynchronizerData::new(items, query.synchronization_type(), page.next).into_json()
}
