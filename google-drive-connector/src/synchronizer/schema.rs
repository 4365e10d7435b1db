use super::EntityType;
use std::collections::BTreeMap;
use sync_connector::synchronizer::{FieldType, SchemaField, TypeSchema};

const MANY_TO_ONE: &str = "many-to-one";

fn schema(fields: Vec<(&str, SchemaField)>) -> TypeSchema {
    fields
        .into_iter()
        .map(|(id, field)| (id.to_string(), field))
        .collect()
}

fn date(name: &str) -> SchemaField {
    SchemaField::new(name, FieldType::Date)
}

fn url(name: &str) -> SchemaField {
    SchemaField::text(name).sub_type("url")
}

fn drive_relation(name: &str, back_reference: &str) -> SchemaField {
    SchemaField::text(name).relation(MANY_TO_ONE, name, back_reference, "drive")
}

pub fn schema_for(entity: EntityType) -> TypeSchema {
    match entity {
        EntityType::Drive => schema(vec![
            ("id", SchemaField::id()),
            ("name", SchemaField::text("Name")),
            (
                "type",
                SchemaField::text("Type").select(&["Personal", "Shared With Me", "Shared"]),
            ),
            ("colorRgb", SchemaField::text("Color")),
            ("createdTime", date("Created")),
            ("webViewLink", url("Link")),
        ]),
        EntityType::Folder => schema(vec![
            ("id", SchemaField::id()),
            ("name", SchemaField::text("Name")),
            (
                "parentId",
                SchemaField::text("Parent Folder").relation(
                    MANY_TO_ONE,
                    "Parent Folder",
                    "Subfolders",
                    "folder",
                ),
            ),
            ("driveId", drive_relation("Drive", "Folders")),
            ("createdTime", date("Created")),
            ("modifiedTime", date("Modified")),
            ("webViewLink", url("Link")),
        ]),
        EntityType::File => schema(vec![
            ("id", SchemaField::id()),
            ("name", SchemaField::text("Name")),
            ("mimeType", SchemaField::text("MIME Type")),
            (
                "mimeTypeCategory",
                SchemaField::text("Category").select(&[
                    "Document",
                    "Spreadsheet",
                    "Presentation",
                    "Image",
                    "PDF",
                    "Video",
                    "Audio",
                    "Archive",
                    "Other",
                ]),
            ),
            ("description", SchemaField::text("Description")),
            ("size", SchemaField::new("Size (bytes)", FieldType::Number)),
            (
                "parentId",
                SchemaField::text("Folder").relation(MANY_TO_ONE, "Folder", "Files", "folder"),
            ),
            ("driveId", drive_relation("Drive", "Files")),
            (
                "ownerId",
                SchemaField::text("Owner").relation(MANY_TO_ONE, "Owner", "Owned Files", "user"),
            ),
            (
                "lastModifyingUserId",
                SchemaField::text("Last Modified By").relation(
                    MANY_TO_ONE,
                    "Last Modified By",
                    "Modified Files",
                    "user",
                ),
            ),
            ("createdTime", date("Created")),
            ("modifiedTime", date("Modified")),
            ("webViewLink", url("Link")),
            ("iconLink", url("Icon")),
            ("thumbnailLink", url("Thumbnail")),
            ("content", SchemaField::text("Content").sub_type("md")),
        ]),
        EntityType::User => schema(vec![
            ("id", SchemaField::id()),
            ("name", SchemaField::text("Name")),
            ("email", SchemaField::text("Email").sub_type("email")),
            ("photoUrl", url("Photo")),
        ]),
        EntityType::Permission => schema(vec![
            ("id", SchemaField::id()),
            ("name", SchemaField::text("Name")),
            ("resourceId", SchemaField::text("Resource Id")),
            (
                "resourceType",
                SchemaField::text("Resource Type").select(&["drive", "folder", "file"]),
            ),
            ("driveId", drive_relation("Drive", "Permissions")),
            (
                "folderId",
                SchemaField::text("Folder").relation(MANY_TO_ONE, "Folder", "Permissions", "folder"),
            ),
            (
                "fileId",
                SchemaField::text("File").relation(MANY_TO_ONE, "File", "Permissions", "file"),
            ),
            (
                "userId",
                SchemaField::text("User").relation(MANY_TO_ONE, "User", "Permissions", "user"),
            ),
            (
                "roleId",
                SchemaField::text("Role").relation(MANY_TO_ONE, "Role", "Permissions", "role"),
            ),
            (
                "type",
                SchemaField::text("Type").select(&["user", "group", "domain", "anyone"]),
            ),
            ("email", SchemaField::text("Email").sub_type("email")),
            ("inherited", SchemaField::text("Inherited")),
            ("permissionType", SchemaField::text("Permission Type")),
            ("inheritedFrom", SchemaField::text("Inherited From")),
            ("expirationTime", date("Expires")),
        ]),
        EntityType::Role => schema(vec![
            ("id", SchemaField::id()),
            ("name", SchemaField::text("Name")),
            ("description", SchemaField::text("Description")),
            ("level", SchemaField::new("Level", FieldType::Number)),
            ("canEdit", SchemaField::text("Can Edit")),
            ("canComment", SchemaField::text("Can Comment")),
            ("canShare", SchemaField::text("Can Share")),
        ]),
    }
}

/// Schemas of the requested types; unknown type ids are skipped.
pub fn schemas(types: &[String]) -> BTreeMap<String, TypeSchema> {
    types
        .iter()
        .filter_map(|id| {
            let entity = id.parse::<EntityType>().ok()?;
            Some((id.clone(), schema_for(entity)))
        })
        .collect()
}
