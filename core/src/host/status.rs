use crate::host::interface::StatusReporter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusEvent {
    Status { message: String },
    Error { task: String, message: String },
}

/// Keeps every message in order so callers can replay or print them.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<StatusEvent>,
}

impl RecordingReporter {
    pub fn statuses(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StatusEvent::Status { message } => Some(message.as_str()),
                StatusEvent::Error { .. } => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StatusEvent::Error { message, .. } => Some(message.as_str()),
                StatusEvent::Status { .. } => None,
            })
            .collect()
    }
}

impl StatusReporter for RecordingReporter {
    fn show_status(&mut self, message: &str) {
        self.events.push(StatusEvent::Status {
            message: message.to_string(),
        });
    }

    fn show_error(&mut self, task_name: &str, message: &str) {
        self.events.push(StatusEvent::Error {
            task: task_name.to_string(),
            message: message.to_string(),
        });
    }
}
