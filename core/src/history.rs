use crate::error::CoreResult;
use crate::task::{TaskRun, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRunRecord {
    pub ts_utc: String,
    pub task: String,
    pub record_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub details: serde_json::Value,
}

impl TaskRunRecord {
    pub fn from_run<T: Serialize>(run: &TaskRun<T>) -> CoreResult<Self> {
        let details = match &run.output {
            Some(out) => serde_json::to_value(out)?,
            None => serde_json::json!({}),
        };
        Ok(Self {
            ts_utc: now_rfc3339_utc(),
            task: run.task.clone(),
            record_id: run.record_id.clone(),
            status: run.status,
            error: run.error.clone(),
            details,
        })
    }
}

/// Append-only NDJSON journal of task runs.
pub struct TaskHistory {
    path: PathBuf,
}

impl TaskHistory {
    pub fn open_or_create(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
        }
        Ok(Self { path })
    }

    pub fn append(&mut self, record: &TaskRunRecord) -> CoreResult<()> {
        let line = serde_json::to_string(record)?;
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }

    pub fn read_all(&self) -> CoreResult<Vec<TaskRunRecord>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            out.push(serde_json::from_str(&line)?);
        }
        Ok(out)
    }
}

fn now_rfc3339_utc() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc().unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_runs_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/history.ndjson");
        let mut history = TaskHistory::open_or_create(&path).unwrap();

        let ok: TaskRun<serde_json::Value> = TaskRun {
            task: "Collect Defect Information".to_string(),
            record_id: "d1".to_string(),
            status: TaskStatus::COMPLETED,
            output: Some(serde_json::json!({"attached": ["a.png"]})),
            error: None,
        };
        let failed: TaskRun<serde_json::Value> = TaskRun {
            task: "Open Defect".to_string(),
            record_id: "d2".to_string(),
            status: TaskStatus::FAILED,
            output: None,
            error: Some("launch error".to_string()),
        };
        history.append(&TaskRunRecord::from_run(&ok).unwrap()).unwrap();
        history.append(&TaskRunRecord::from_run(&failed).unwrap()).unwrap();

        let reopened = TaskHistory::open_or_create(&path).unwrap();
        let records = reopened.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].details["attached"][0], "a.png");
        assert_eq!(records[1].status, TaskStatus::FAILED);
        assert_eq!(records[1].error.as_deref(), Some("launch error"));
        assert!(records[0].ts_utc.ends_with('Z'));
    }
}
