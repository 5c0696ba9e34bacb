//! External command execution
//!
//! Transfer tools are invoked directly (no shell) with their stdout and
//! stderr captured into owned buffers. Each invocation is awaited to
//! completion before the caller continues, so the benchmark stays strictly
//! sequential.

#[cfg(test)]
pub(crate) mod testing;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Stdio;
use std::time::{Duration, Instant};

/// Program plus arguments for one external invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `arg` only when `condition` holds
    pub fn arg_if<S: Into<String>>(self, condition: bool, arg: S) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock time from spawn to exit
    pub elapsed: Duration,
}

impl CommandOutput {
    /// Stdout followed by stderr, for tools that report progress on either
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Runs external commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute `spec` and wait for it to exit
    ///
    /// A spawn failure or a non-zero exit status is an [`AppError::Command`].
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner {
    debug: bool,
}

impl SystemCommandRunner {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if self.debug {
            println!("$ {}", spec);
        }

        let started = Instant::now();
        let output = tokio::process::Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AppError::command(format!("Failed to start '{}': {}", spec.program, e)))?;
        let elapsed = started.elapsed();

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed,
        };

        if self.debug {
            for line in captured.stdout.lines() {
                println!("  | {}", line);
            }
        }

        if !output.status.success() {
            let detail = captured.stderr.trim();
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(AppError::command(if detail.is_empty() {
                format!("'{}' exited with status {}", spec, code)
            } else {
                format!("'{}' exited with status {}: {}", spec, code, detail)
            }));
        }

        Ok(captured)
    }
}
