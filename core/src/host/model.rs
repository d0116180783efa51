use crate::error::{CoreError, CoreResult};
use crate::host::interface::{EntrySource, LogSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute holding the step name of a log entry.
pub const NAME_ATTRIBUTE: &str = "Name";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionResult {
    Passed,
    Failed,
    Error,
    Warning,
    #[default]
    NoResult,
}

impl ExecutionResult {
    pub fn is_failure(self) -> bool {
        matches!(self, ExecutionResult::Failed | ExecutionResult::Error)
    }
}

/// Position of an entry inside its log's arena.
pub type EntryId = usize;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub result: ExecutionResult,
    #[serde(default)]
    pub log_info: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Parent entry; `None` for top-level steps. Always lower than the entry's own id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntryId>,
}

impl LogEntry {
    pub fn new(result: ExecutionResult, name: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(NAME_ATTRIBUTE.to_string(), name.to_string());
        Self {
            result,
            attributes,
            ..Self::default()
        }
    }

    pub fn with_log_info(mut self, log_info: &str) -> Self {
        self.log_info = log_info.to_string();
        self
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

impl EntrySource for LogEntry {
    fn result(&self) -> ExecutionResult {
        self.result
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn log_info(&self) -> &str {
        &self.log_info
    }

    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// One test case log. Entries are kept in a flat arena in insertion order;
/// the tree shape is carried by each entry's `parent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionLog {
    pub display_name: String,
    #[serde(default)]
    pub log_info: String,
    #[serde(default)]
    pub aggregated_description: String,
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new(display_name: &str, log_info: &str, aggregated_description: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            log_info: log_info.to_string(),
            aggregated_description: aggregated_description.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn push_entry(
        &mut self,
        parent: Option<EntryId>,
        mut entry: LogEntry,
    ) -> CoreResult<EntryId> {
        let id = self.entries.len();
        if let Some(p) = parent {
            if p >= id {
                return Err(CoreError::InvalidInput(format!(
                    "log '{}': parent entry {} does not exist",
                    self.display_name, p
                )));
            }
        }
        entry.parent = parent;
        self.entries.push(entry);
        Ok(id)
    }

    pub fn validate(&self) -> CoreResult<()> {
        for (idx, e) in self.entries.iter().enumerate() {
            if let Some(p) = e.parent {
                if p >= idx {
                    return Err(CoreError::InvalidInput(format!(
                        "log '{}': entry {} references parent {} which does not precede it",
                        self.display_name, idx, p
                    )));
                }
            }
        }
        Ok(())
    }

    /// Pre-order walk over the whole entry tree, siblings in insertion order.
    /// Uses an explicit stack so deep logs cannot exhaust the call stack.
    pub fn walk(&self) -> Vec<&LogEntry> {
        let mut children: Vec<Vec<EntryId>> = vec![Vec::new(); self.entries.len()];
        let mut roots = Vec::new();
        for (idx, e) in self.entries.iter().enumerate() {
            match e.parent {
                Some(p) if p < idx => children[p].push(idx),
                // Entries with a forward parent are unreachable; validate() rejects them.
                Some(_) => {}
                None => roots.push(idx),
            }
        }

        let mut out = Vec::with_capacity(self.entries.len());
        let mut stack: Vec<EntryId> = roots.into_iter().rev().collect();
        while let Some(idx) = stack.pop() {
            out.push(&self.entries[idx]);
            stack.extend(children[idx].iter().rev().copied());
        }
        out
    }
}

impl LogSource for ExecutionLog {
    type Entry = LogEntry;

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn log_info(&self) -> &str {
        &self.log_info
    }

    fn aggregated_description(&self) -> &str {
        &self.aggregated_description
    }

    fn entries(&self) -> Vec<&LogEntry> {
        self.walk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(log: &ExecutionLog) -> Vec<String> {
        log.walk()
            .iter()
            .map(|e| e.attribute(NAME_ATTRIBUTE).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn walk_is_preorder_in_insertion_order() {
        let mut log = ExecutionLog::new("TC", "", "");
        let a = log.push_entry(None, LogEntry::new(ExecutionResult::Passed, "a")).unwrap();
        let b = log.push_entry(None, LogEntry::new(ExecutionResult::Passed, "b")).unwrap();
        log.push_entry(Some(a), LogEntry::new(ExecutionResult::Passed, "a1")).unwrap();
        let a2 = log.push_entry(Some(a), LogEntry::new(ExecutionResult::Passed, "a2")).unwrap();
        log.push_entry(Some(b), LogEntry::new(ExecutionResult::Passed, "b1")).unwrap();
        log.push_entry(Some(a2), LogEntry::new(ExecutionResult::Passed, "a2x")).unwrap();

        assert_eq!(names(&log), vec!["a", "a1", "a2", "a2x", "b", "b1"]);
    }

    #[test]
    fn deep_chain_is_walked_without_recursion() {
        let mut log = ExecutionLog::new("deep", "", "");
        let mut parent = None;
        for i in 0..20_000 {
            let id = log
                .push_entry(parent, LogEntry::new(ExecutionResult::Passed, &format!("s{}", i)))
                .unwrap();
            parent = Some(id);
        }
        let walked = log.walk();
        assert_eq!(walked.len(), 20_000);
        assert_eq!(walked[19_999].attribute(NAME_ATTRIBUTE), Some("s19999"));
    }

    #[test]
    fn forward_parent_is_rejected() {
        let mut log = ExecutionLog::new("TC", "", "");
        assert!(log
            .push_entry(Some(0), LogEntry::new(ExecutionResult::Passed, "x"))
            .is_err());

        let mut entry = LogEntry::new(ExecutionResult::Passed, "y");
        entry.parent = Some(3);
        log.entries.push(entry);
        assert!(log.validate().is_err());
        assert!(log.walk().is_empty());
    }

    #[test]
    fn only_failed_and_error_are_failures() {
        assert!(ExecutionResult::Failed.is_failure());
        assert!(ExecutionResult::Error.is_failure());
        assert!(!ExecutionResult::Passed.is_failure());
        assert!(!ExecutionResult::Warning.is_failure());
        assert!(!ExecutionResult::NoResult.is_failure());
    }
}
