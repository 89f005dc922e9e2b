//! Subprocess execution with shell-style piping.

use crate::domain::model::CommandOutput;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

pub const SYSTEM_PATH: &str = "/bin:/sbin:/usr/bin:/usr/sbin";
pub const HOMEBREW_PATH: &str =
    "/opt/homebrew/bin:/opt/homebrew/sbin:/usr/local/bin:/bin:/sbin:/usr/bin:/usr/sbin";

/// Runs each `|`-separated segment through `sh -c`, feeding the trimmed
/// stdout of one segment to the next. A segment that prints nothing leaves
/// the previous input in place.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    path: Option<String>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self { path: None }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn run_segment(&self, segment: &str, input: Option<&str>) -> Result<CommandOutput> {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(segment)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(path) = &self.path {
            command.env("PATH", path);
        }

        let mut child = command.spawn()?;
        let writer = child.stdin.take().map(|mut stdin| {
            let data = input.unwrap_or_default().as_bytes().to_vec();
            std::thread::spawn(move || {
                // The child may exit without reading its input
                let _ = stdin.write_all(&data);
            })
        });

        let output = child.wait_with_output()?;
        if let Some(handle) = writer {
            let _ = handle.join();
        }

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl CommandRunner for ShellRunner {
    fn run_with_input(&self, command: &str, input: Option<&str>) -> Result<CommandOutput> {
        let mut input = input.map(str::to_string);
        let mut last = CommandOutput::default();

        for segment in regex!(r"\s*\|\s*").split(command.trim()) {
            tracing::debug!("Executing: {}", segment);
            last = self.run_segment(segment, input.as_deref())?;
            if !last.stdout.is_empty() {
                input = Some(last.stdout.clone());
            }
        }

        if !last.success() {
            tracing::debug!(
                "Command `{}` exited with {}: {}",
                command,
                last.status,
                last.stderr
            );
        }
        Ok(last)
    }
}

pub fn binary_exists_in(binary: &str, search_path: &str) -> bool {
    let is_executable = |path: &Path| {
        path.metadata()
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    };

    if binary.contains('/') {
        return is_executable(Path::new(binary));
    }
    search_path
        .split(':')
        .filter(|dir| !dir.is_empty())
        .any(|dir| is_executable(&Path::new(dir).join(binary)))
}
