use crate::defect::reconcile::base_file_name;
use crate::error::{CoreError, CoreResult};
use crate::host::interface::{IssueHandle, IssueKind, RecordStore, DESCRIPTION_FIELD};
use crate::host::model::ExecutionLog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnedFile {
    pub name: String,
    pub source_path: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_log: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueRecord {
    pub kind: IssueKind,
    /// Writable attributes. `Description` is always writable; any other
    /// field must be declared here before it can be written.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<OwnedFile>,
    #[serde(default)]
    pub links: Vec<IssueLink>,
}

impl IssueRecord {
    pub fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
            attachments: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// JSON-backed host used by the CLI and the integration tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InMemoryHost {
    #[serde(default)]
    pub issues: BTreeMap<String, IssueRecord>,
    #[serde(default)]
    pub logs: BTreeMap<String, ExecutionLog>,
}

impl InMemoryHost {
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let bytes = fs::read(path.as_ref())?;
        let host: InMemoryHost = serde_json::from_slice(&bytes)?;
        for log in host.logs.values() {
            log.validate()?;
        }
        Ok(host)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn insert_issue(&mut self, record_id: &str, record: IssueRecord) {
        self.issues.insert(record_id.to_string(), record);
    }

    pub fn insert_log(&mut self, log_id: &str, log: ExecutionLog) {
        self.logs.insert(log_id.to_string(), log);
    }

    pub fn issue(&self, record_id: &str) -> Option<&IssueRecord> {
        self.issues.get(record_id)
    }

    fn record(&self, handle: &IssueHandle) -> CoreResult<&IssueRecord> {
        self.issues.get(&handle.record_id).ok_or_else(|| {
            CoreError::InvalidInput(format!("issue not found: {}", handle.record_id))
        })
    }

    fn record_mut(&mut self, handle: &IssueHandle) -> CoreResult<&mut IssueRecord> {
        self.issues.get_mut(&handle.record_id).ok_or_else(|| {
            CoreError::InvalidInput(format!("issue not found: {}", handle.record_id))
        })
    }
}

impl RecordStore for InMemoryHost {
    type Log = ExecutionLog;

    fn resolve(&self, record_id: &str) -> Option<IssueHandle> {
        self.issues.get(record_id).map(|r| IssueHandle {
            record_id: record_id.to_string(),
            kind: r.kind,
        })
    }

    fn links(&self, record: &IssueHandle) -> CoreResult<Vec<Option<&ExecutionLog>>> {
        let rec = self.record(record)?;
        Ok(rec
            .links
            .iter()
            .map(|l| l.execution_log.as_ref().and_then(|id| self.logs.get(id)))
            .collect())
    }

    fn attribute(&self, record: &IssueHandle, name: &str) -> CoreResult<String> {
        let rec = self.record(record)?;
        match rec.fields.get(name) {
            Some(v) => Ok(v.clone()),
            None if name == DESCRIPTION_FIELD => Ok(String::new()),
            None => Err(CoreError::InvalidInput(format!("unknown attribute '{}'", name))),
        }
    }

    fn write_field(&mut self, record: &IssueHandle, name: &str, text: &str) -> CoreResult<()> {
        let rec = self.record_mut(record)?;
        if name != DESCRIPTION_FIELD && !rec.fields.contains_key(name) {
            return Err(CoreError::FieldWrite {
                field: name.to_string(),
                message: "attribute does not exist on this issue".to_string(),
            });
        }
        rec.fields.insert(name.to_string(), text.to_string());
        Ok(())
    }

    fn attachment_names(&self, record: &IssueHandle) -> CoreResult<BTreeSet<String>> {
        let rec = self.record(record)?;
        Ok(rec.attachments.iter().map(|a| a.name.clone()).collect())
    }

    fn attach_file(&mut self, record: &IssueHandle, path: &str) -> CoreResult<()> {
        let meta = fs::metadata(path).map_err(|e| CoreError::Attachment {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        if !meta.is_file() {
            return Err(CoreError::Attachment {
                path: path.to_string(),
                message: "not a regular file".to_string(),
            });
        }
        let rec = self.record_mut(record)?;
        rec.attachments.push(OwnedFile {
            name: base_file_name(path).to_string(),
            source_path: path.to_string(),
            size_bytes: meta.len(),
        });
        Ok(())
    }
}
