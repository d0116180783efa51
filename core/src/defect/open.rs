use crate::error::{CoreError, CoreResult};
use crate::host::interface::{IssueHandle, Launcher, RecordStore, StatusReporter};
use crate::settings::TaskSettings;
use crate::task::DefectTask;
use serde::{Deserialize, Serialize};

pub const OPEN_TASK_NAME: &str = "Open Defect";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenOutcome {
    pub issue_id: String,
    /// `None` when the formatted command was blank and nothing was launched.
    pub command: Option<String>,
}

/// Opens the tracker entry linked to an issue through a [`Launcher`].
pub struct OpenDefectTask<L: Launcher> {
    settings: TaskSettings,
    launcher: L,
}

impl<L: Launcher> OpenDefectTask<L> {
    pub fn new(settings: TaskSettings, launcher: L) -> Self {
        Self { settings, launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    fn issue_id<S: RecordStore>(&self, store: &S, issue: &IssueHandle) -> CoreResult<String> {
        store.attribute(issue, &self.settings.external_defect_id_field_name)
    }
}

impl<S: RecordStore, L: Launcher> DefectTask<S> for OpenDefectTask<L> {
    type Output = OpenOutcome;

    fn name(&self) -> &'static str {
        OPEN_TASK_NAME
    }

    fn requires_change_rights(&self) -> bool {
        false
    }

    fn is_possible(&self, store: &S, record_id: &str) -> bool {
        let issue_id = store
            .resolve(record_id)
            .and_then(|issue| self.issue_id(store, &issue).ok())
            .unwrap_or_default();
        !(issue_id.trim().is_empty() || self.settings.open_defect_command.trim().is_empty())
    }

    fn execute(
        &mut self,
        store: &mut S,
        reporter: &mut dyn StatusReporter,
        record_id: &str,
    ) -> CoreResult<OpenOutcome> {
        let issue = store
            .resolve(record_id)
            .ok_or_else(|| CoreError::InvalidInput(format!("'{}' is not an issue", record_id)))?;
        let issue_id = self.issue_id(&*store, &issue)?;
        let command = self.settings.open_command_for(&issue_id);
        if command.trim().is_empty() {
            return Ok(OpenOutcome {
                issue_id,
                command: None,
            });
        }

        reporter.show_status(&format!("Opening defect {}", issue_id));
        self.launcher.launch(&command)?;
        Ok(OpenOutcome {
            issue_id,
            command: Some(command),
        })
    }
}
