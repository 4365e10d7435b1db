use super::EntityType;
use sync_connector::synchronizer::{SynchronizerConfig, TypeMeta};

/// Types in the order they are offered, with their display names.
const TYPES: [(EntityType, &str); 12] = [
    (EntityType::Invoice, "Invoice"),
    (EntityType::InvoiceLineItem, "Invoice Line Item"),
    (EntityType::SubscriptionPlan, "Subscription Plan"),
    (EntityType::Subscription, "Subscription"),
    (EntityType::Customer, "Customer"),
    (EntityType::Transaction, "Transaction"),
    (EntityType::PromotionalCredit, "Promotional Credit"),
    (EntityType::CreditNote, "Credit Note"),
    (EntityType::Comment, "Comment"),
    (EntityType::Coupon, "Coupon"),
    (EntityType::CouponSet, "Coupon Set"),
    (EntityType::CouponCode, "Coupon Code"),
];

pub fn synchronizer_config(api_version: u32) -> SynchronizerConfig {
    let types = TYPES
        .into_iter()
        // coupon codes are opt-in
        .map(|(entity, name)| TypeMeta::new(entity.as_str(), name, entity != EntityType::CouponCode))
        .collect();

    SynchronizerConfig {
        types,
        filters: Vec::new(),
        version: api_version,
    }
}
