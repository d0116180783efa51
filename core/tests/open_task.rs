use defect_helper_core::defect::open::OpenDefectTask;
use defect_helper_core::error::{CoreError, CoreResult};
use defect_helper_core::host::interface::{IssueKind, Launcher};
use defect_helper_core::host::memory::{InMemoryHost, IssueRecord};
use defect_helper_core::host::status::RecordingReporter;
use defect_helper_core::settings::TaskSettings;
use defect_helper_core::task::{run_task, DefectTask, TaskStatus};

#[derive(Default)]
struct RecordingLauncher {
    launched: Vec<String>,
    fail: bool,
}

impl Launcher for RecordingLauncher {
    fn launch(&mut self, command: &str) -> CoreResult<()> {
        if self.fail {
            return Err(CoreError::Launch(format!("cannot start {}", command)));
        }
        self.launched.push(command.to_string());
        Ok(())
    }
}

fn settings(command: &str) -> TaskSettings {
    TaskSettings {
        open_defect_command: command.to_string(),
        ..TaskSettings::default()
    }
}

fn host_with_issue(kind: IssueKind, external_id: Option<&str>) -> InMemoryHost {
    let mut rec = IssueRecord::new(kind);
    if let Some(id) = external_id {
        rec.fields.insert("ExternalDefectId".to_string(), id.to_string());
    }
    let mut host = InMemoryHost::default();
    host.insert_issue("i1", rec);
    host
}

#[test]
fn launches_formatted_command_for_any_issue_kind() {
    let mut host = host_with_issue(IssueKind::Requirement, Some("BUG-42"));
    let mut task = OpenDefectTask::new(
        settings("https://tracker.local/browse/{0}"),
        RecordingLauncher::default(),
    );
    let mut reporter = RecordingReporter::default();

    let run = run_task(&mut task, &mut host, &mut reporter, "i1");
    assert_eq!(run.status, TaskStatus::COMPLETED);
    let out = run.output.unwrap();
    assert_eq!(out.issue_id, "BUG-42");
    assert_eq!(
        out.command.as_deref(),
        Some("https://tracker.local/browse/BUG-42")
    );
    assert_eq!(
        task.launcher().launched,
        vec!["https://tracker.local/browse/BUG-42".to_string()]
    );
    assert!(!DefectTask::<InMemoryHost>::requires_change_rights(&task));
}

#[test]
fn blank_id_unknown_field_or_blank_template_is_not_possible() {
    let task = OpenDefectTask::new(settings("open {0}"), RecordingLauncher::default());
    assert!(!task.is_possible(&host_with_issue(IssueKind::Defect, Some("  ")), "i1"));
    assert!(!task.is_possible(&host_with_issue(IssueKind::Defect, None), "i1"));
    assert!(!task.is_possible(&host_with_issue(IssueKind::Defect, Some("B-1")), "missing"));

    let no_cmd = OpenDefectTask::new(settings(" "), RecordingLauncher::default());
    assert!(!no_cmd.is_possible(&host_with_issue(IssueKind::Defect, Some("B-1")), "i1"));

    assert!(task.is_possible(&host_with_issue(IssueKind::Defect, Some("B-1")), "i1"));
}

#[test]
fn not_possible_run_launches_nothing() {
    let mut host = host_with_issue(IssueKind::Defect, Some(""));
    let mut task = OpenDefectTask::new(settings("open {0}"), RecordingLauncher::default());
    let mut reporter = RecordingReporter::default();
    let run = run_task(&mut task, &mut host, &mut reporter, "i1");
    assert_eq!(run.status, TaskStatus::NOT_APPLICABLE);
    assert!(task.launcher().launched.is_empty());
}

#[test]
fn launch_failure_is_reported_not_propagated() {
    let mut host = host_with_issue(IssueKind::Defect, Some("B-9"));
    let mut task = OpenDefectTask::new(
        settings("open {0}"),
        RecordingLauncher {
            fail: true,
            ..RecordingLauncher::default()
        },
    );
    let mut reporter = RecordingReporter::default();
    let run = run_task(&mut task, &mut host, &mut reporter, "i1");
    assert_eq!(run.status, TaskStatus::FAILED);
    assert_eq!(reporter.errors(), vec!["launch error: cannot start open B-9"]);
}
