use crate::error::CoreResult;
use crate::host::interface::{RecordStore, StatusReporter};
use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    COMPLETED,
    NOT_APPLICABLE,
    FAILED,
}

/// A task the host offers on an issue.
pub trait DefectTask<S: RecordStore> {
    type Output;

    fn name(&self) -> &'static str;
    fn requires_change_rights(&self) -> bool;
    fn is_possible(&self, store: &S, record_id: &str) -> bool;
    fn execute(
        &mut self,
        store: &mut S,
        reporter: &mut dyn StatusReporter,
        record_id: &str,
    ) -> CoreResult<Self::Output>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRun<T> {
    pub task: String,
    pub record_id: String,
    pub status: TaskStatus,
    pub output: Option<T>,
    pub error: Option<String>,
}

/// Runs `task` on one record. Every failure ends up as a status error
/// message; nothing propagates to the caller.
pub fn run_task<S, T>(
    task: &mut T,
    store: &mut S,
    reporter: &mut dyn StatusReporter,
    record_id: &str,
) -> TaskRun<T::Output>
where
    S: RecordStore,
    T: DefectTask<S>,
{
    let name = task.name();
    if !task.is_possible(store, record_id) {
        let msg = format!("'{}' is not applicable to '{}'", name, record_id);
        tracing::warn!(task = name, record_id, "not applicable");
        reporter.show_error(name, &msg);
        return TaskRun {
            task: name.to_string(),
            record_id: record_id.to_string(),
            status: TaskStatus::NOT_APPLICABLE,
            output: None,
            error: Some(msg),
        };
    }

    tracing::info!(task = name, record_id, "task started");
    match task.execute(store, reporter, record_id) {
        Ok(output) => {
            tracing::info!(task = name, record_id, "task completed");
            TaskRun {
                task: name.to_string(),
                record_id: record_id.to_string(),
                status: TaskStatus::COMPLETED,
                output: Some(output),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(task = name, record_id, error = %e, "task failed");
            reporter.show_error(name, &e.to_string());
            TaskRun {
                task: name.to_string(),
                record_id: record_id.to_string(),
                status: TaskStatus::FAILED,
                output: None,
                error: Some(e.to_string()),
            }
        }
    }
}
