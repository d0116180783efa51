use crate::defect::aggregate::{AggregationResult, FailureAggregator};
use crate::defect::reconcile::Reconciler;
use crate::error::{CoreError, CoreResult};
use crate::host::interface::{
    DefectHandle, LogSource, RecordStore, StatusReporter, DESCRIPTION_FIELD,
};
use crate::settings::TaskSettings;
use crate::task::DefectTask;
use serde::{Deserialize, Serialize};

pub const COLLECT_TASK_NAME: &str = "Collect Defect Information";
const STATUS_PREFIX: &str = "Collecting data";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CollectStage {
    CollectingLogs,
    WritingSummary,
    WritingVerbose,
    AttachingFiles,
    Done,
}

pub fn valid_transition(from: CollectStage, to: CollectStage) -> bool {
    matches!(
        (from, to),
        (CollectStage::CollectingLogs, CollectStage::WritingSummary)
            | (CollectStage::WritingSummary, CollectStage::WritingVerbose)
            | (CollectStage::WritingVerbose, CollectStage::AttachingFiles)
            | (CollectStage::AttachingFiles, CollectStage::Done)
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailedAttachment {
    pub path: String,
    pub message: String,
}

/// What the collect task did to the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectOutcome {
    pub stage: CollectStage,
    pub logs_collected: usize,
    pub summary_written: bool,
    pub verbose_written: bool,
    pub attached: Vec<String>,
    pub failed_attachments: Vec<FailedAttachment>,
    pub aggregation: AggregationResult,
}

impl CollectOutcome {
    fn advance(&mut self, next: CollectStage) -> CoreResult<()> {
        if !valid_transition(self.stage, next) {
            return Err(CoreError::WorkflowTransition(format!(
                "invalid transition {:?} -> {:?}",
                self.stage, next
            )));
        }
        tracing::debug!(from = ?self.stage, to = ?next, "collect stage");
        self.stage = next;
        Ok(())
    }
}

pub struct CollectDefectInformationTask {
    settings: TaskSettings,
}

impl CollectDefectInformationTask {
    pub fn new(settings: TaskSettings) -> Self {
        Self { settings }
    }

    fn resolve_defect<S: RecordStore>(store: &S, record_id: &str) -> CoreResult<DefectHandle> {
        store
            .resolve(record_id)
            .and_then(|h| h.as_defect())
            .ok_or_else(|| CoreError::InvalidInput(format!("'{}' is not a defect", record_id)))
    }

    /// Runs the whole collect sequence against a resolved defect.
    pub fn collect<S: RecordStore>(
        &self,
        store: &mut S,
        reporter: &mut dyn StatusReporter,
        defect: &DefectHandle,
    ) -> CoreResult<CollectOutcome> {
        let issue = defect.issue();
        reporter.show_status(STATUS_PREFIX);

        let (aggregation, logs_collected) = {
            let links = store.links(issue)?;
            let mut agg = FailureAggregator::new();
            let mut count = 0;
            for log in links.into_iter().flatten() {
                reporter.show_status(&format!("{}: {}", STATUS_PREFIX, log.display_name()));
                agg.add_log(log);
                count += 1;
            }
            (agg.finish(), count)
        };
        tracing::info!(
            record_id = defect.record_id(),
            logs = logs_collected,
            candidates = aggregation.attachment_paths.len(),
            "logs collected"
        );

        let mut outcome = CollectOutcome {
            stage: CollectStage::CollectingLogs,
            logs_collected,
            summary_written: false,
            verbose_written: false,
            attached: Vec::new(),
            failed_attachments: Vec::new(),
            aggregation,
        };

        outcome.advance(CollectStage::WritingSummary)?;
        if !outcome.aggregation.summary_text.is_empty() {
            reporter.show_status("Adding details");
            match store.write_field(issue, DESCRIPTION_FIELD, &outcome.aggregation.summary_text) {
                Ok(()) => outcome.summary_written = true,
                Err(e) => {
                    tracing::warn!(error = %e, "summary write failed");
                    reporter.show_error(COLLECT_TASK_NAME, &e.to_string());
                }
            }
        }

        outcome.advance(CollectStage::WritingVerbose)?;
        if !outcome.aggregation.verbose_text.is_empty() {
            reporter.show_status("Adding verbose details");
            let field = &self.settings.failure_details_field_name;
            match store.write_field(issue, field, &outcome.aggregation.verbose_text) {
                Ok(()) => outcome.verbose_written = true,
                // The details field is optional and may not exist on this host.
                Err(e) => {
                    tracing::debug!(field = field.as_str(), error = %e, "verbose write skipped")
                }
            }
        }

        outcome.advance(CollectStage::AttachingFiles)?;
        let existing = store.attachment_names(issue)?;
        let mut reconciler = Reconciler::new(&existing, self.settings.skip_queued_duplicates);
        let candidates = outcome.aggregation.attachment_paths.clone();
        for path in candidates {
            reporter.show_status(&format!("Adding file: '{}'", path));
            if !reconciler.admits(&path) {
                continue;
            }
            match store.attach_file(issue, &path) {
                Ok(()) => outcome.attached.push(path),
                Err(e) => {
                    let message = match &e {
                        CoreError::Attachment { message, .. } => message.clone(),
                        other => other.to_string(),
                    };
                    tracing::warn!(path = path.as_str(), error = %e, "attach failed");
                    reporter.show_error(
                        COLLECT_TASK_NAME,
                        &format!("Could not attach file '{}'\n{}", path, message),
                    );
                    outcome.failed_attachments.push(FailedAttachment { path, message });
                }
            }
        }

        outcome.advance(CollectStage::Done)?;
        Ok(outcome)
    }
}

impl<S: RecordStore> DefectTask<S> for CollectDefectInformationTask {
    type Output = CollectOutcome;

    fn name(&self) -> &'static str {
        COLLECT_TASK_NAME
    }

    fn requires_change_rights(&self) -> bool {
        true
    }

    fn is_possible(&self, store: &S, record_id: &str) -> bool {
        Self::resolve_defect(store, record_id).is_ok()
    }

    fn execute(
        &mut self,
        store: &mut S,
        reporter: &mut dyn StatusReporter,
        record_id: &str,
    ) -> CoreResult<CollectOutcome> {
        let defect = Self::resolve_defect(&*store, record_id)?;
        self.collect(store, reporter, &defect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_only_move_forward() {
        assert!(valid_transition(CollectStage::CollectingLogs, CollectStage::WritingSummary));
        assert!(valid_transition(CollectStage::AttachingFiles, CollectStage::Done));
        assert!(!valid_transition(CollectStage::CollectingLogs, CollectStage::Done));
        assert!(!valid_transition(CollectStage::Done, CollectStage::CollectingLogs));
        assert!(!valid_transition(CollectStage::WritingVerbose, CollectStage::WritingSummary));
    }
}
