//! Test doubles for the ports, shared by unit and integration tests.

use crate::domain::model::CommandOutput;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers commands from a canned table. Unknown commands fail with
/// status 127, like a shell that cannot find the binary.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &str, status: i32, stdout: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            CommandOutput {
                status,
                stdout: stdout.trim().to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl CommandRunner for FakeRunner {
    fn run_with_input(&self, command: &str, _input: Option<&str>) -> Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }
        Ok(self
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandOutput {
                status: 127,
                stdout: String::new(),
                stderr: format!("sh: {}: command not found", command),
            }))
    }
}
