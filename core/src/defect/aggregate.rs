use crate::host::interface::{EntrySource, LogSource};
use crate::host::model::NAME_ATTRIBUTE;
use serde::{Deserialize, Serialize};

pub const END_OF_LOG_MARKER: &str = "--- end test case log ---";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregationResult {
    /// `"{step}:\n{log info}\n\n"` per failed or errored step.
    pub summary_text: String,
    /// One formatted block per log, blocks separated by a blank line.
    pub verbose_text: String,
    /// Detail values in traversal order. Not deduplicated.
    pub attachment_paths: Vec<String>,
}

/// Accumulates failure details one log at a time.
#[derive(Debug, Default)]
pub struct FailureAggregator {
    result: AggregationResult,
}

impl FailureAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_log<L: LogSource>(&mut self, log: &L) {
        if !self.result.verbose_text.is_empty() {
            self.result.verbose_text.push('\n');
        }
        push_log_block(&mut self.result.verbose_text, log);

        for entry in log.entries() {
            if entry.result().is_failure() && !entry.log_info().trim().is_empty() {
                let step = entry.attribute(NAME_ATTRIBUTE).unwrap_or_default();
                tracing::debug!(step, "collecting failure info");
                self.result.summary_text.push_str(step);
                self.result.summary_text.push_str(":\n");
                self.result.summary_text.push_str(entry.log_info());
                self.result.summary_text.push_str("\n\n");
            }

            if let Some(detail) = entry.detail().filter(|d| !d.is_empty()) {
                self.result.attachment_paths.push(detail.to_string());
            }
        }
    }

    pub fn finish(self) -> AggregationResult {
        self.result
    }
}

fn push_log_block<L: LogSource>(out: &mut String, log: &L) {
    out.push_str(log.display_name());
    out.push('\n');
    out.push_str("Log Info: ");
    out.push_str(log.log_info());
    out.push('\n');
    out.push_str(log.aggregated_description());
    out.push('\n');
    out.push_str(END_OF_LOG_MARKER);
    out.push('\n');
}

/// Aggregates every present log; `None` links are skipped.
pub fn aggregate<'a, L, I>(links: I) -> AggregationResult
where
    L: LogSource + 'a,
    I: IntoIterator<Item = Option<&'a L>>,
{
    let mut agg = FailureAggregator::new();
    for log in links.into_iter().flatten() {
        agg.add_log(log);
    }
    agg.finish()
}
