pub mod config;
pub mod format;
pub mod skills;

pub use config::Config;
pub use format::{FormatRule, FormatRules};
pub use skills::{SkillDescriptor, SkillError, SkillLocation};
