//! Post-edit formatter dispatch.
//!
//! Looks up an edited file's extension in the format rule table and runs the
//! matching formatter once, synchronously. Spawn failures and non-zero exits
//! are returned to the caller as-is; nothing is retried.

use guidekit_core::{Config, FormatRule, FormatRules};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to run formatter `{command}` on {}: {source}", path.display())]
    Spawn {
        command: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("formatter `{command}` failed on {} (exit {exit_code})", path.display())]
    Failed {
        command: String,
        path: PathBuf,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
}

/// Captured result of one external process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, or -1 when terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Process-spawning seam for the dispatcher.
///
/// Arguments are OS strings so non-UTF-8 file names reach the formatter intact.
pub trait CommandRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runs commands as child processes, optionally from a fixed directory.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    working_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new(working_dir: Option<PathBuf>) -> Self {
        Self { working_dir }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<CommandOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output()?;
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// What happened for one edit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A formatter ran and exited 0.
    Formatted { command: String, duration_ms: u64 },
    /// No rule for the file's extension.
    NoRule,
    /// Formatting is turned off in config.
    Disabled,
}

#[derive(Debug)]
pub struct FormatDispatch<R = SystemRunner> {
    rules: FormatRules,
    enabled: bool,
    runner: R,
}

impl FormatDispatch<SystemRunner> {
    pub fn from_config(config: &Config, working_dir: Option<PathBuf>) -> Self {
        Self::new(
            config.format_rules.clone(),
            config.format_enabled,
            SystemRunner::new(working_dir),
        )
    }
}

impl<R: CommandRunner> FormatDispatch<R> {
    pub fn new(rules: FormatRules, enabled: bool, runner: R) -> Self {
        Self {
            rules,
            enabled,
            runner,
        }
    }

    pub fn rule_for(&self, path: &Path) -> Option<&FormatRule> {
        self.rules.lookup(path)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Handle one file-edit event.
    pub fn on_file_edited(&self, path: &Path) -> Result<DispatchOutcome, FormatError> {
        if !self.enabled {
            debug!(path = %path.display(), "formatting disabled");
            return Ok(DispatchOutcome::Disabled);
        }

        let Some(rule) = self.rules.lookup(path) else {
            debug!(path = %path.display(), "no format rule for extension");
            return Ok(DispatchOutcome::NoRule);
        };

        let command = rule.to_string();
        let args: Vec<OsString> = rule
            .args
            .iter()
            .map(OsString::from)
            .chain(std::iter::once(path.as_os_str().to_os_string()))
            .collect();

        debug!(command = %command, path = %path.display(), "running formatter");
        let start = Instant::now();

        let output = self
            .runner
            .run(OsStr::new(&rule.program), &args)
            .map_err(|source| FormatError::Spawn {
                command: command.clone(),
                path: path.to_path_buf(),
                source,
            })?;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if output.exit_code != 0 {
            warn!(
                command = %command,
                path = %path.display(),
                exit_code = output.exit_code,
                "formatter failed"
            );
            return Err(FormatError::Failed {
                command,
                path: path.to_path_buf(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        info!(command = %command, path = %path.display(), duration_ms, "formatted file");
        Ok(DispatchOutcome::Formatted {
            command,
            duration_ms,
        })
    }
}
