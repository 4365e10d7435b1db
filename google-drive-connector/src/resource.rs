use crate::api::DriveApi;
use axum::body::Body;
use serde::Deserialize;
use serde_json::Value;
use sync_connector::{AppError, ResourceStream, Result};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FileParams {
    file_id: Option<String>,
}

impl FileParams {
    fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            value => serde_json::from_value(value.clone())
                .map_err(|e| AppError::validation(format!("Invalid params: {}", e))),
        }
    }
}

/// Stream the binary content of `params.fileId`, named after the file.
pub async fn stream_file(api: &dyn DriveApi, params: &Value) -> Result<ResourceStream> {
    let params = FileParams::parse(params)?;
    let file_id = params
        .file_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::missing("fileId"))?;

    let metadata = api.get_file_metadata(&file_id).await?;
    let size = metadata.size.as_ref().map(|_| metadata.size_bytes());
    let filename = if metadata.name.is_empty() {
        file_id.clone()
    } else {
        metadata.name
    };
    let content_type = Some(metadata.mime_type).filter(|m| !m.is_empty());

    let stream = api.stream_file(&file_id).await?;

    Ok(ResourceStream {
        filename,
        content_type,
        content_length: size,
        body: Body::from_stream(stream),
    })
}
