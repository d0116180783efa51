use crate::error::{CoreError, CoreResult};
use crate::host::interface::Launcher;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// How long to wait for an early exit before assuming the viewer started.
const DEFAULT_EXIT_GRACE: Duration = Duration::from_secs(2);

/// How a formatted open command is handed to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget<'a> {
    /// A URL or existing file, opened with the desktop's registered handler.
    Open(&'a str),
    /// Anything else runs as a command line through the platform shell.
    Shell(&'a str),
}

impl<'a> LaunchTarget<'a> {
    pub fn classify(command: &'a str) -> Self {
        let trimmed = command.trim();
        let single_token = !trimmed.contains(char::is_whitespace);
        let is_url = trimmed.contains("://") || trimmed.starts_with("mailto:");
        if single_token && (is_url || Path::new(trimmed).exists()) {
            LaunchTarget::Open(trimmed)
        } else {
            LaunchTarget::Shell(trimmed)
        }
    }

    fn command(self) -> Command {
        match self {
            // rundll32 receives the URL as one argument, so `&` in a query
            // string is never seen by cmd.
            LaunchTarget::Open(target) if cfg!(target_os = "windows") => {
                let mut cmd = Command::new("rundll32");
                cmd.args(["url.dll,FileProtocolHandler", target]);
                cmd
            }
            LaunchTarget::Open(target) if cfg!(target_os = "macos") => {
                let mut cmd = Command::new("open");
                cmd.arg(target);
                cmd
            }
            LaunchTarget::Open(target) => {
                let mut cmd = Command::new("xdg-open");
                cmd.arg(target);
                cmd
            }
            LaunchTarget::Shell(line) if cfg!(target_os = "windows") => {
                let mut cmd = Command::new("cmd");
                cmd.args(["/C", line]);
                cmd
            }
            LaunchTarget::Shell(line) => {
                let mut cmd = Command::new("sh");
                cmd.args(["-c", line]);
                cmd
            }
        }
    }
}

/// Opens tracker links with the desktop handler and runs other templates
/// through the shell. A process that exits non-zero within the grace period
/// is a launch failure; one still running afterwards is left alone.
#[derive(Debug)]
pub struct ShellLauncher {
    exit_grace: Duration,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self {
            exit_grace: DEFAULT_EXIT_GRACE,
        }
    }
}

impl ShellLauncher {
    pub fn with_exit_grace(exit_grace: Duration) -> Self {
        Self { exit_grace }
    }
}

impl Launcher for ShellLauncher {
    fn launch(&mut self, command: &str) -> CoreResult<()> {
        let target = LaunchTarget::classify(command);
        let mut child = target
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CoreError::Launch(format!("failed to start '{}': {}", command, e)))?;
        tracing::info!(pid = child.id(), ?target, "launched");

        let status = match child.wait_timeout(self.exit_grace)? {
            Some(status) => status,
            None => return Ok(()),
        };
        if status.success() {
            return Ok(());
        }

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        Err(CoreError::Launch(format!(
            "'{}' exited with {}: {}",
            command,
            status,
            stderr.trim()
        )))
    }
}
