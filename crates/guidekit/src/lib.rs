//! guidekit - skill matching and post-edit formatting for coding assistants.
//!
//! Loads a catalog of `SKILL.md` guidance documents once, matches free-text
//! intents against their triggers, and dispatches external formatters after
//! file edits.

pub mod catalog;
pub mod formatter;
pub mod hook;
pub mod matcher;
pub mod render;

pub use catalog::{Catalog, CatalogError};
pub use formatter::{CommandRunner, DispatchOutcome, FormatDispatch, FormatError, SystemRunner};
pub use hook::{handle_post_edit, HookError, HookOutcome, HookPayload};
pub use matcher::{select_skills, SelectionStrategy, SkillSelection};
