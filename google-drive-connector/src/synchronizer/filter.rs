use serde::Deserialize;
use serde_json::Value;
use sync_connector::{AppError, Result};

/// Filter set by the user before synchronizing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DriveFilter {
    /// Selected drives: `root`, `shared_with_me` or shared drive ids
    #[serde(default)]
    pub drive_ids: Option<Vec<String>>,
}

impl DriveFilter {
    pub fn parse(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AppError::validation(format!("Invalid filter: {}", e))),
        }
    }

    pub fn drive_ids(&self) -> &[String] {
        self.drive_ids.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_filter_selects_nothing() {
        assert!(DriveFilter::parse(None).unwrap().drive_ids().is_empty());
        assert!(DriveFilter::parse(Some(&json!({}))).unwrap().drive_ids().is_empty());
        assert!(DriveFilter::parse(Some(&json!({"driveIds": null})))
            .unwrap()
            .drive_ids()
            .is_empty());
    }

    #[test]
    fn test_drive_ids() {
        let filter = DriveFilter::parse(Some(&json!({"driveIds": ["root", "d1"]}))).unwrap();
        assert_eq!(filter.drive_ids(), ["root", "d1"]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = DriveFilter::parse(Some(&json!({"folderIds": []}))).unwrap_err();
        assert!(err.to_string().starts_with("Invalid filter"));
    }
}
