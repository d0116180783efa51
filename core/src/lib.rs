//! Defect helper tasks for a test-management host.
//!
//! `Collect Defect Information` folds failing step details from the execution
//! logs linked to a defect into its description and a verbose details field,
//! then attaches the screenshots those steps produced. `Open Defect` launches
//! the configured tracker command for the issue's external id.
//!
//! The host is reached only through the traits in [`host::interface`].

pub mod defect;
pub mod error;
pub mod history;
pub mod host;
pub mod settings;
pub mod task;

pub use crate::defect::aggregate::{aggregate, AggregationResult, FailureAggregator};
pub use crate::defect::collect::{CollectDefectInformationTask, CollectOutcome, CollectStage};
pub use crate::defect::open::{OpenDefectTask, OpenOutcome};
pub use crate::defect::reconcile::{base_file_name, reconcile};
pub use crate::error::{CoreError, CoreResult};
pub use crate::settings::TaskSettings;
pub use crate::task::{run_task, DefectTask, TaskRun, TaskStatus};
