//! Scripted command runner for backend tests

use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Canned response keyed by the start of a rendered command line
struct Script {
    prefix: String,
    stdout: String,
    elapsed: Duration,
    fail: bool,
}

/// Records every invocation and answers from a script
///
/// The first script entry whose prefix matches the rendered command is used;
/// commands with no matching entry succeed with empty output.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    scripts: Mutex<Vec<Script>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, prefix: &str, stdout: &str) -> Self {
        self.respond_after(prefix, stdout, Duration::from_millis(10))
    }

    pub(crate) fn respond_after(self, prefix: &str, stdout: &str, elapsed: Duration) -> Self {
        self.scripts.lock().unwrap().push(Script {
            prefix: prefix.to_string(),
            stdout: stdout.to_string(),
            elapsed,
            fail: false,
        });
        self
    }

    pub(crate) fn fail_on(self, prefix: &str) -> Self {
        self.scripts.lock().unwrap().push(Script {
            prefix: prefix.to_string(),
            stdout: String::new(),
            elapsed: Duration::ZERO,
            fail: true,
        });
        self
    }

    /// Rendered command lines in invocation order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Index of the first call starting with `prefix`
    pub(crate) fn position(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let rendered = spec.to_string();
        self.calls.lock().unwrap().push(rendered.clone());

        let scripts = self.scripts.lock().unwrap();
        match scripts.iter().find(|s| rendered.starts_with(&s.prefix)) {
            Some(script) if script.fail => Err(AppError::command(format!("'{}' exited with status 1", rendered))),
            Some(script) => Ok(CommandOutput {
                stdout: script.stdout.clone(),
                stderr: String::new(),
                elapsed: script.elapsed,
            }),
            None => Ok(CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                elapsed: Duration::from_millis(1),
            }),
        }
    }
}
