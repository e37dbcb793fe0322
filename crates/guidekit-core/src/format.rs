//! Post-edit format rules: file extension to formatter command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One extension-to-formatter mapping.
///
/// The edited file path is appended after `args` when the formatter runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRule {
    /// Lowercase extension without the leading dot.
    pub extension: String,
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl FormatRule {
    /// Build a rule from a whitespace-separated command line.
    ///
    /// Returns `None` when the command line is empty.
    pub fn parse(extension: &str, command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            extension: normalize_extension(extension),
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The format rule table. At most one rule per extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRules {
    rules: Vec<FormatRule>,
}

impl Default for FormatRules {
    fn default() -> Self {
        let mut table = Self::empty();
        for (ext, cmd) in [
            ("py", "ruff format"),
            ("ts", "prettier --write"),
            ("tsx", "prettier --write"),
            ("md", "prettier --write"),
        ] {
            table.set(ext, cmd);
        }
        table
    }
}

impl FormatRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Insert or replace the rule for `extension`. An empty command line
    /// removes the rule instead.
    pub fn set(&mut self, extension: &str, command_line: &str) {
        let Some(rule) = FormatRule::parse(extension, command_line) else {
            self.remove(extension);
            return;
        };
        if let Some(existing) = self
            .rules
            .iter_mut()
            .find(|r| r.extension == rule.extension)
        {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
    }

    pub fn remove(&mut self, extension: &str) {
        let extension = normalize_extension(extension);
        self.rules.retain(|r| r.extension != extension);
    }

    /// Find the rule for a path's extension (case-insensitive).
    pub fn lookup(&self, path: &Path) -> Option<&FormatRule> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.rules.iter().find(|r| r.extension == extension)
    }

    pub fn rules(&self) -> &[FormatRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
