use defect_helper_core::defect::collect::CollectDefectInformationTask;
use defect_helper_core::defect::open::OpenDefectTask;
use defect_helper_core::error::CoreResult;
use defect_helper_core::history::{TaskHistory, TaskRunRecord};
use defect_helper_core::host::launcher::ShellLauncher;
use defect_helper_core::host::memory::InMemoryHost;
use defect_helper_core::host::status::{RecordingReporter, StatusEvent};
use defect_helper_core::settings::TaskSettings;
use defect_helper_core::task::{run_task, TaskRun, TaskStatus};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: defect_helper <collect|open> <host.json> <record-id> \
     [--settings <settings.json>] [--history <history.ndjson>]";

struct Args {
    command: String,
    host_path: PathBuf,
    record_id: String,
    settings_path: Option<PathBuf>,
    history_path: Option<PathBuf>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    if raw.len() < 4 {
        return Err(USAGE.to_string());
    }
    let mut args = Args {
        command: raw[1].clone(),
        host_path: PathBuf::from(&raw[2]),
        record_id: raw[3].clone(),
        settings_path: None,
        history_path: None,
    };
    let mut rest = raw[4..].iter();
    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .ok_or_else(|| format!("missing value for {}", flag))?;
        match flag.as_str() {
            "--settings" => args.settings_path = Some(PathBuf::from(value)),
            "--history" => args.history_path = Some(PathBuf::from(value)),
            other => return Err(format!("unknown option: {}\n{}", other, USAGE)),
        }
    }
    Ok(args)
}

fn load_settings(path: Option<&PathBuf>) -> CoreResult<TaskSettings> {
    let base = match path {
        Some(p) => TaskSettings::from_json_file(p)?,
        None => TaskSettings::default(),
    };
    base.with_env_overrides()
}

fn print_events(reporter: &RecordingReporter) {
    for e in &reporter.events {
        match e {
            StatusEvent::Status { message } => eprintln!("STATUS {}", message),
            StatusEvent::Error { task, message } => eprintln!("ERROR [{}] {}", task, message),
        }
    }
}

fn finish<T: Serialize>(run: &TaskRun<T>, history: Option<&PathBuf>) -> CoreResult<()> {
    if let Some(path) = history {
        let mut h = TaskHistory::open_or_create(path)?;
        h.append(&TaskRunRecord::from_run(run)?)?;
    }
    println!("{}", serde_json::to_string_pretty(run)?);
    Ok(())
}

fn execute(args: &Args) -> CoreResult<TaskStatus> {
    let settings = load_settings(args.settings_path.as_ref())?;
    let mut host = InMemoryHost::load(&args.host_path)?;
    let mut reporter = RecordingReporter::default();

    let status = match args.command.as_str() {
        "collect" => {
            let mut task = CollectDefectInformationTask::new(settings);
            let run = run_task(&mut task, &mut host, &mut reporter, &args.record_id);
            print_events(&reporter);
            if run.status == TaskStatus::COMPLETED {
                host.save(&args.host_path)?;
            }
            finish(&run, args.history_path.as_ref())?;
            run.status
        }
        "open" => {
            let mut task = OpenDefectTask::new(settings, ShellLauncher::default());
            let run = run_task(&mut task, &mut host, &mut reporter, &args.record_id);
            print_events(&reporter);
            finish(&run, args.history_path.as_ref())?;
            run.status
        }
        other => {
            eprintln!("unknown command: {}\n{}", other, USAGE);
            std::process::exit(2);
        }
    };
    Ok(status)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "defect_helper_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let raw: Vec<String> = std::env::args().collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    match execute(&args) {
        Ok(TaskStatus::COMPLETED) => std::process::exit(0),
        Ok(status) => {
            tracing::warn!(?status, record_id = args.record_id.as_str(), "task did not complete");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("defect_helper error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_positional_and_optional_arguments() {
        let a = parse_args(&argv(&[
            "defect_helper",
            "collect",
            "host.json",
            "d1",
            "--settings",
            "s.json",
            "--history",
            "h.ndjson",
        ]))
        .unwrap();
        assert_eq!(a.command, "collect");
        assert_eq!(a.record_id, "d1");
        assert_eq!(a.settings_path, Some(PathBuf::from("s.json")));
        assert_eq!(a.history_path, Some(PathBuf::from("h.ndjson")));
    }

    #[test]
    fn rejects_short_argv_and_dangling_flags() {
        assert!(parse_args(&argv(&["defect_helper", "collect"])).is_err());
        let dangling = argv(&["defect_helper", "open", "h.json", "i1", "--settings"]);
        assert!(parse_args(&dangling).is_err());
        let unknown = argv(&["defect_helper", "open", "h.json", "i1", "--bogus", "x"]);
        assert!(parse_args(&unknown).is_err());
    }
}
