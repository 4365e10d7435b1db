use super::EntityType;
use sync_connector::synchronizer::{FilterMeta, SynchronizerConfig, TypeMeta};

pub const DRIVE_IDS_FILTER: &str = "driveIds";

fn type_name(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Drive => "Drive",
        EntityType::Folder => "Folder",
        EntityType::File => "File",
        EntityType::User => "User",
        EntityType::Permission => "Permission",
        EntityType::Role => "Role",
    }
}

pub fn synchronizer_config(api_version: u32) -> SynchronizerConfig {
    let types = EntityType::ALL
        .into_iter()
        .map(|entity| {
            let meta = TypeMeta::new(entity.as_str(), type_name(entity), true);
            if entity == EntityType::User {
                meta.user()
            } else {
                meta
            }
        })
        .collect();

    SynchronizerConfig {
        types,
        filters: vec![FilterMeta {
            id: DRIVE_IDS_FILTER.to_string(),
            title: "Drives to Sync".to_string(),
            datalist: true,
            optional: true,
            kind: "multidropdown".to_string(),
        }],
        version: api_version,
    }
}
