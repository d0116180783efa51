use crate::error::CoreResult;
use crate::host::model::ExecutionResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Field that receives the short failure summary.
pub const DESCRIPTION_FIELD: &str = "Description";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssueKind {
    Defect,
    Requirement,
    Other,
}

/// A host object that passed the issue capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueHandle {
    pub record_id: String,
    pub kind: IssueKind,
}

impl IssueHandle {
    pub fn as_defect(&self) -> Option<DefectHandle> {
        match self.kind {
            IssueKind::Defect => Some(DefectHandle(self.clone())),
            _ => None,
        }
    }
}

/// An issue known to be of kind `Defect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectHandle(IssueHandle);

impl DefectHandle {
    pub fn issue(&self) -> &IssueHandle {
        &self.0
    }

    pub fn record_id(&self) -> &str {
        &self.0.record_id
    }
}

pub trait EntrySource {
    fn result(&self) -> ExecutionResult;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn log_info(&self) -> &str;
    fn detail(&self) -> Option<&str>;
}

pub trait LogSource {
    type Entry: EntrySource;

    fn display_name(&self) -> &str;
    fn log_info(&self) -> &str;
    fn aggregated_description(&self) -> &str;
    /// Every entry of the log, nested ones included, in traversal order.
    fn entries(&self) -> Vec<&Self::Entry>;
}

pub trait RecordStore {
    type Log: LogSource;

    /// Returns `None` when the object does not exist or is not an issue.
    fn resolve(&self, record_id: &str) -> Option<IssueHandle>;
    /// One slot per link; `None` for links that carry no execution log.
    fn links(&self, record: &IssueHandle) -> CoreResult<Vec<Option<&Self::Log>>>;
    fn attribute(&self, record: &IssueHandle, name: &str) -> CoreResult<String>;
    fn write_field(&mut self, record: &IssueHandle, name: &str, text: &str) -> CoreResult<()>;
    /// Base names of the files already owned by the record.
    fn attachment_names(&self, record: &IssueHandle) -> CoreResult<BTreeSet<String>>;
    fn attach_file(&mut self, record: &IssueHandle, path: &str) -> CoreResult<()>;
}

pub trait StatusReporter {
    fn show_status(&mut self, message: &str);
    fn show_error(&mut self, task_name: &str, message: &str);
}

pub trait Launcher {
    fn launch(&mut self, command: &str) -> CoreResult<()>;
}
