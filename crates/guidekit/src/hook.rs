//! Post-edit hook payloads delivered by the host tool on stdin.
//!
//! Only the edited file path matters here:
//! `{"tool_name": "Edit", "tool_input": {"file_path": "src/foo.py"}, "cwd": "/repo"}`.
//!
//! Exit codes: 0 when the file was formatted or needs no formatting, 2 when
//! the formatter failed (the host shows stderr to the assistant), 1 for a
//! payload that cannot be read.

use crate::formatter::{CommandRunner, DispatchOutcome, FormatDispatch, FormatError};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Exit status that tells the host to show stderr to the assistant.
pub const HOOK_BLOCKING_EXIT: u8 = 2;
/// Exit status for a hook that could not run at all.
pub const HOOK_ERROR_EXIT: u8 = 1;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to read hook payload: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hook payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl HookError {
    pub fn exit_code(&self) -> u8 {
        HOOK_ERROR_EXIT
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: ToolInput,
    /// Directory the host ran the tool from.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default, alias = "notebook_path")]
    pub file_path: Option<PathBuf>,
}

impl HookPayload {
    pub fn from_reader(mut reader: impl Read) -> Result<Self, HookError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// The edited file, resolved against `cwd` when relative.
    pub fn edited_path(&self) -> Option<PathBuf> {
        let path = self.tool_input.file_path.as_ref()?;
        match &self.cwd {
            Some(cwd) if path.is_relative() => Some(cwd.join(path)),
            _ => Some(path.clone()),
        }
    }
}

/// Result of handling one post-edit event.
#[derive(Debug)]
pub enum HookOutcome {
    /// The payload named no file.
    NoFile,
    Dispatched(DispatchOutcome),
    /// The formatter could not be spawned or exited non-zero.
    Blocked(FormatError),
}

impl HookOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NoFile | Self::Dispatched(_) => 0,
            Self::Blocked(_) => HOOK_BLOCKING_EXIT,
        }
    }

    /// Text for stderr: the error followed by the formatter's own output.
    pub fn diagnostics(&self) -> Option<String> {
        let Self::Blocked(error) = self else {
            return None;
        };
        let mut message = error.to_string();
        if let FormatError::Failed { stdout, stderr, .. } = error {
            for output in [stdout, stderr] {
                if !output.trim().is_empty() {
                    message.push('\n');
                    message.push_str(output.trim_end());
                }
            }
        }
        Some(message)
    }
}

/// Read a payload from `input` and format the file it names.
///
/// `dispatch_for` builds the dispatcher for the working directory: the
/// payload's `cwd`, or `workspace_root` when absent.
pub fn handle_post_edit<R, F>(
    input: impl Read,
    workspace_root: &Path,
    dispatch_for: F,
) -> Result<HookOutcome, HookError>
where
    R: CommandRunner,
    F: FnOnce(PathBuf) -> FormatDispatch<R>,
{
    let payload = HookPayload::from_reader(input)?;
    let Some(path) = payload.edited_path() else {
        debug!(tool = ?payload.tool_name, "hook payload names no file");
        return Ok(HookOutcome::NoFile);
    };

    let working_dir = payload
        .cwd
        .unwrap_or_else(|| workspace_root.to_path_buf());
    let dispatch = dispatch_for(working_dir);

    Ok(match dispatch.on_file_edited(&path) {
        Ok(outcome) => HookOutcome::Dispatched(outcome),
        Err(error) => HookOutcome::Blocked(error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::CommandOutput;
    use guidekit_core::FormatRules;
    use std::ffi::{OsStr, OsString};
    use std::io;

    /// Answers every call with a fixed exit code.
    struct FixedRunner {
        exit_code: i32,
    }

    impl CommandRunner for FixedRunner {
        fn run(&self, _program: &OsStr, _args: &[OsString]) -> io::Result<CommandOutput> {
            Ok(CommandOutput {
                exit_code: self.exit_code,
                stdout: String::new(),
                stderr: "error: cannot parse foo.py:3:1".to_string(),
            })
        }
    }

    /// Run the hook and report the working directory a dispatcher was built
    /// for, if one was built at all.
    fn run_hook(json: &str, exit_code: i32) -> (Result<HookOutcome, HookError>, Option<PathBuf>) {
        let mut seen_dir = None;
        let result = handle_post_edit(json.as_bytes(), Path::new("/workspace"), |dir| {
            seen_dir = Some(dir);
            FormatDispatch::new(FormatRules::default(), true, FixedRunner { exit_code })
        });
        (result, seen_dir)
    }

    #[test]
    fn formatted_file_exits_zero() {
        let (result, dir) = run_hook(r#"{"tool_input": {"file_path": "/repo/foo.py"}}"#, 0);
        let outcome = result.unwrap();
        assert!(matches!(
            outcome,
            HookOutcome::Dispatched(DispatchOutcome::Formatted { .. })
        ));
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.diagnostics().is_none());
        assert_eq!(dir, Some(PathBuf::from("/workspace")));
    }

    #[test]
    fn formatter_failure_blocks_with_output() {
        let (result, _) = run_hook(
            r#"{"tool_input": {"file_path": "foo.py"}, "cwd": "/repo"}"#,
            1,
        );
        let outcome = result.unwrap();
        assert_eq!(outcome.exit_code(), HOOK_BLOCKING_EXIT);
        let message = outcome.diagnostics().unwrap();
        assert!(message.contains("ruff format"), "{message}");
        assert!(message.contains("/repo/foo.py"), "{message}");
        assert!(message.ends_with("error: cannot parse foo.py:3:1"), "{message}");
    }

    #[test]
    fn payload_without_file_exits_zero_without_dispatch() {
        let (result, dir) = run_hook(r#"{"tool_name": "Bash"}"#, 1);
        let outcome = result.unwrap();
        assert!(matches!(outcome, HookOutcome::NoFile));
        assert_eq!(outcome.exit_code(), 0);
        assert!(dir.is_none());
    }

    #[test]
    fn unmapped_extension_exits_zero() {
        let (result, _) = run_hook(r#"{"tool_input": {"file_path": "/repo/foo.json"}}"#, 1);
        let outcome = result.unwrap();
        assert!(matches!(
            outcome,
            HookOutcome::Dispatched(DispatchOutcome::NoRule)
        ));
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn malformed_payload_exits_one() {
        let (result, dir) = run_hook("{not json", 0);
        let err = result.unwrap_err();
        assert!(matches!(err, HookError::Json(_)));
        assert_eq!(err.exit_code(), HOOK_ERROR_EXIT);
        assert!(dir.is_none());
    }

    #[test]
    fn parses_edit_payload() {
        let json = r#"{
            "session_id": "abc",
            "tool_name": "Edit",
            "tool_input": {"file_path": "/repo/src/foo.py", "old_string": "a", "new_string": "b"},
            "tool_response": {"success": true}
        }"#;
        let payload = HookPayload::from_reader(json.as_bytes()).unwrap();
        assert_eq!(payload.tool_name.as_deref(), Some("Edit"));
        assert_eq!(payload.edited_path(), Some(PathBuf::from("/repo/src/foo.py")));
    }

    #[test]
    fn resolves_relative_path_against_cwd() {
        let json = r#"{"tool_input": {"file_path": "docs/README.md"}, "cwd": "/repo"}"#;
        let payload = HookPayload::from_reader(json.as_bytes()).unwrap();
        assert_eq!(payload.edited_path(), Some(PathBuf::from("/repo/docs/README.md")));
    }

    #[test]
    fn accepts_notebook_path_alias() {
        let json = r#"{"tool_input": {"notebook_path": "/repo/a.ipynb"}}"#;
        let payload = HookPayload::from_reader(json.as_bytes()).unwrap();
        assert_eq!(payload.edited_path(), Some(PathBuf::from("/repo/a.ipynb")));
    }

    #[test]
    fn payload_without_file_has_no_path() {
        let payload = HookPayload::from_reader(r#"{"tool_name": "Bash"}"#.as_bytes()).unwrap();
        assert!(payload.edited_path().is_none());

        let empty = HookPayload::from_reader("  \n".as_bytes()).unwrap();
        assert!(empty.edited_path().is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = HookPayload::from_reader("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, HookError::Json(_)));
    }
}
