use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_FAILURE_DETAILS_FIELD: &str = "FailureDetails";
pub const DEFAULT_EXTERNAL_DEFECT_ID_FIELD: &str = "ExternalDefectId";

/// Placeholder substituted with the external defect id.
pub const ISSUE_ID_PLACEHOLDER: &str = "{0}";

/// Settings shared by both tasks. Passed explicitly; never read from
/// process-wide state by the tasks themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskSettings {
    /// Custom field receiving the verbose log text.
    pub failure_details_field_name: String,
    /// Command template with a `{0}` placeholder for the tracker issue id.
    pub open_defect_command: String,
    /// Field holding the tracker issue id.
    pub external_defect_id_field_name: String,
    /// Drop a candidate whose base name was already queued in the same run.
    pub skip_queued_duplicates: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            failure_details_field_name: DEFAULT_FAILURE_DETAILS_FIELD.to_string(),
            open_defect_command: String::new(),
            external_defect_id_field_name: DEFAULT_EXTERNAL_DEFECT_ID_FIELD.to_string(),
            skip_queued_duplicates: false,
        }
    }
}

impl TaskSettings {
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::Config(format!("invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Applies overrides from the process environment.
    ///
    /// | Env Var                                  | Field                          |
    /// |------------------------------------------|--------------------------------|
    /// | `DEFECT_HELPER_FAILURE_DETAILS_FIELD`    | `failure_details_field_name`   |
    /// | `DEFECT_HELPER_OPEN_DEFECT_COMMAND`      | `open_defect_command`          |
    /// | `DEFECT_HELPER_EXTERNAL_DEFECT_ID_FIELD` | `external_defect_id_field_name`|
    /// | `DEFECT_HELPER_SKIP_QUEUED_DUPLICATES`   | `skip_queued_duplicates`       |
    pub fn with_env_overrides(self) -> CoreResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        if let Some(v) = lookup("DEFECT_HELPER_FAILURE_DETAILS_FIELD") {
            self.failure_details_field_name = v;
        }
        if let Some(v) = lookup("DEFECT_HELPER_OPEN_DEFECT_COMMAND") {
            self.open_defect_command = v;
        }
        if let Some(v) = lookup("DEFECT_HELPER_EXTERNAL_DEFECT_ID_FIELD") {
            self.external_defect_id_field_name = v;
        }
        if let Some(v) = lookup("DEFECT_HELPER_SKIP_QUEUED_DUPLICATES") {
            self.skip_queued_duplicates = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(CoreError::Config(format!(
                        "DEFECT_HELPER_SKIP_QUEUED_DUPLICATES must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }
        Ok(self)
    }

    /// Substitutes every placeholder in `open_defect_command` with `issue_id`.
    pub fn open_command_for(&self, issue_id: &str) -> String {
        self.open_defect_command.replace(ISSUE_ID_PLACEHOLDER, issue_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_leave_open_command_empty() {
        let s = TaskSettings::default();
        assert_eq!(s.failure_details_field_name, "FailureDetails");
        assert_eq!(s.external_defect_id_field_name, "ExternalDefectId");
        assert!(s.open_defect_command.is_empty());
        assert!(!s.skip_queued_duplicates);
    }

    #[test]
    fn json_file_uses_pascal_case_keys_and_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let body = r#"{
            "FailureDetailsFieldName": "Verbose",
            "OpenDefectCommand": "https://jira/browse/{0}"
        }"#;
        fs::write(&path, body).unwrap();
        let s = TaskSettings::from_json_file(&path).unwrap();
        assert_eq!(s.failure_details_field_name, "Verbose");
        assert_eq!(s.open_defect_command, "https://jira/browse/{0}");
        assert_eq!(s.external_defect_id_field_name, DEFAULT_EXTERNAL_DEFECT_ID_FIELD);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TaskSettings::from_json_file(&path),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn overrides_replace_fields_and_reject_bad_booleans() {
        let env: HashMap<&str, &str> = [
            ("DEFECT_HELPER_OPEN_DEFECT_COMMAND", "open {0}"),
            ("DEFECT_HELPER_SKIP_QUEUED_DUPLICATES", "true"),
        ]
        .into_iter()
        .collect();
        let s = TaskSettings::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(s.open_defect_command, "open {0}");
        assert!(s.skip_queued_duplicates);

        let bad = TaskSettings::default().with_overrides(|k| {
            (k == "DEFECT_HELPER_SKIP_QUEUED_DUPLICATES").then(|| "maybe".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn every_placeholder_is_substituted() {
        let s = TaskSettings {
            open_defect_command: "tracker {0} --focus {0}".to_string(),
            ..TaskSettings::default()
        };
        assert_eq!(s.open_command_for("BUG-7"), "tracker BUG-7 --focus BUG-7");
    }
}
