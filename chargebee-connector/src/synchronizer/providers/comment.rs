use super::{list, page, COMMENTS};
use crate::api::Record;
use crate::synchronizer::transform::{convert_seconds, convert_start_case, str_field, IdFormat};
use crate::synchronizer::{OffsetCursor, Page, SyncContext};
use serde_json::Value;
use sync_connector::Result;

/// Entity types a comment can be attached to on the synchronized side.
pub const COMMENT_ENTITIES: [&str; 6] = [
    "subscription",
    "invoice",
    "credit_note",
    "coupon",
    "customer",
    "transaction",
];

pub async fn fetch(ctx: &SyncContext<'_>, cursor: Option<OffsetCursor>) -> Result<Page> {
    let request = ctx.request(cursor.map(|c| c.offset), Some("created_at"));
    let list = list(ctx, COMMENTS, request).await?;
    let items = list
        .entities("comment")
        .into_iter()
        .filter(|comment| {
            str_field(comment, "entity_type").map_or(false, |t| COMMENT_ENTITIES.contains(&t))
        })
        .map(|comment| transform(ctx.ids, comment))
        .collect();
    Ok(page(items, &list))
}

/// The comment points at its entity through a field named after the entity
/// type, e.g. `"invoice": "|inv-1|"`.
pub fn transform(ids: IdFormat, mut comment: Record) -> Record {
    let entity_type = str_field(&comment, "entity_type").unwrap_or_default().to_string();
    let entity_id = str_field(&comment, "entity_id").unwrap_or_default();
    let entity_id = match entity_type.as_str() {
        "invoice" | "credit_note" => ids.wrap(entity_id),
        _ => entity_id.to_string(),
    };
    let name = comment
        .get("added_by")
        .filter(|v| v.as_str().map_or(false, |s| !s.is_empty()))
        .or_else(|| comment.get("type"))
        .cloned()
        .unwrap_or(Value::Null);

    comment.insert("name".into(), name);
    convert_seconds(&mut comment, &["created_at"]);
    convert_start_case(&mut comment, &["type"]);
    comment.insert(entity_type, Value::String(entity_id));
    comment
}
