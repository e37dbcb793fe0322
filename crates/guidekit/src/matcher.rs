//! Skill matching: pick the skills relevant to a free-text intent.
//!
//! Two phases:
//! 1. `@skill-name` hints in the intent select those skills directly.
//! 2. Every other skill is scored by keyword overlap between the intent and
//!    the skill's name, triggers, and description. Any positive score matches.

use crate::catalog::Catalog;
use guidekit_core::SkillDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum length for description keywords.
const MIN_KEYWORD_LEN: usize = 3;
/// Names and declared triggers may be shorter (`py`, `ts`, `md`).
const MIN_TRIGGER_LEN: usize = 2;

/// Words too generic to signal a particular skill.
const STOPWORDS: &[&str] = &[
    "an", "as", "at", "be", "by", "do", "if", "in", "is", "it", "me", "my", "of", "on", "or",
    "so", "to", "up", "we", "about", "add", "all", "and", "any", "apply", "are", "best", "can", "code", "create", "does",
    "for", "from", "guidance", "guide", "help", "how", "into", "make", "need", "new", "our",
    "please", "practice", "should", "skill", "some", "style", "that", "the", "this", "use",
    "using", "want", "what", "when", "with", "work", "write", "writing", "you", "your",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// At least one skill came from an explicit `@skill-name` hint.
    Hint,
    /// All skills came from keyword matching.
    Match,
    /// Nothing matched.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSkill {
    pub name: String,
    /// Why it was picked (e.g., "hint: @python" or "keyword: python, function").
    pub reason: String,
    pub score: usize,
}

/// Outcome of matching one intent. An empty `skills` list is a normal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSelection {
    pub intent: String,
    pub skills: Vec<SelectedSkill>,
    pub strategy: SelectionStrategy,
    /// Hints that named no catalog skill.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SkillSelection {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look the selected skills up in the catalog they were matched against.
    pub fn descriptors<'a>(&self, catalog: &'a Catalog) -> Vec<&'a SkillDescriptor> {
        self.skills
            .iter()
            .filter_map(|s| catalog.get(&s.name))
            .collect()
    }
}

/// Match `intent` against the catalog.
///
/// `max_skills` caps the result; 0 means no cap. Hinted skills fill slots
/// first, keyword matches follow ordered by score then name.
pub fn select_skills(intent: &str, catalog: &Catalog, max_skills: usize) -> SkillSelection {
    let limit = if max_skills == 0 {
        usize::MAX
    } else {
        max_skills
    };
    let mut selected: Vec<SelectedSkill> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut used_names: HashSet<&str> = HashSet::new();

    for hint in parse_hints(intent) {
        if selected.len() >= limit {
            break;
        }
        match catalog.get(&hint) {
            Some(skill) => {
                if used_names.insert(skill.name.as_str()) {
                    selected.push(SelectedSkill {
                        name: skill.name.clone(),
                        reason: format!("hint: @{hint}"),
                        score: 0,
                    });
                }
            }
            None => errors.push(format!("hinted skill not found: @{hint}")),
        }
    }
    let hinted = !selected.is_empty();

    let remaining = limit.saturating_sub(selected.len());
    selected.extend(find_keyword_matches(
        intent,
        catalog.skills(),
        &used_names,
        remaining,
    ));

    let strategy = if selected.is_empty() {
        SelectionStrategy::None
    } else if hinted {
        SelectionStrategy::Hint
    } else {
        SelectionStrategy::Match
    };

    SkillSelection {
        intent: intent.to_string(),
        skills: selected,
        strategy,
        errors,
    }
}

/// Extract `@skill-name` tokens from the intent, in order, without duplicates.
pub fn parse_hints(intent: &str) -> Vec<String> {
    let mut hints: Vec<String> = Vec::new();
    for word in intent.split_whitespace() {
        let Some(rest) = word.strip_prefix('@') else {
            continue;
        };
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect();
        let name = name.trim_end_matches('-');
        if !name.is_empty() && !hints.iter().any(|h| h == name) {
            hints.push(name.to_string());
        }
    }
    hints
}

fn find_keyword_matches(
    intent: &str,
    skills: &[SkillDescriptor],
    exclude: &HashSet<&str>,
    limit: usize,
) -> Vec<SelectedSkill> {
    if limit == 0 {
        return Vec::new();
    }

    let intent_keywords = extract_keywords(intent, MIN_TRIGGER_LEN);
    if intent_keywords.is_empty() {
        return Vec::new();
    }
    // Deterministic reason strings.
    let mut intent_keywords: Vec<String> = intent_keywords.into_iter().collect();
    intent_keywords.sort();

    let mut scored: Vec<SelectedSkill> = Vec::new();

    for skill in skills {
        if exclude.contains(skill.name.as_str()) {
            continue;
        }

        // Name segments and declared triggers are the strong signal.
        let mut strong = extract_keywords(&skill.name, MIN_TRIGGER_LEN);
        for trigger in &skill.triggers {
            strong.extend(extract_keywords(trigger, MIN_TRIGGER_LEN));
        }
        let weak = extract_keywords(&skill.description, MIN_KEYWORD_LEN);

        let mut matches: Vec<&str> = Vec::new();
        let mut strong_count = 0;
        for kw in &intent_keywords {
            if strong.contains(kw) {
                strong_count += 1;
                matches.push(kw);
            } else if weak.contains(kw) {
                matches.push(kw);
            }
        }

        if !matches.is_empty() {
            let score = strong_count * 2 + matches.len();
            let reason_keywords: Vec<&str> = matches.iter().take(3).copied().collect();
            scored.push(SelectedSkill {
                name: skill.name.clone(),
                reason: format!("keyword: {}", reason_keywords.join(", ")),
                score,
            });
        }
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    scored.truncate(limit);
    scored
}

/// Lowercase alphanumeric words of at least `min_len` characters, with a
/// trailing plural `s` folded and stopwords removed.
fn extract_keywords(text: &str, min_len: usize) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|word| fold_plural(&word.to_lowercase()))
        .filter(|word| word.chars().count() >= min_len && !STOPWORDS.contains(&word.as_str()))
        .collect()
}

fn fold_plural(word: &str) -> String {
    match word.strip_suffix('s') {
        Some(stem) if stem.chars().count() >= 3 && !stem.ends_with('s') => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidekit_core::SkillLocation;
    use std::path::PathBuf;

    fn make_skill(name: &str, description: &str, triggers: &[&str]) -> SkillDescriptor {
        SkillDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            triggers: triggers.iter().map(ToString::to_string).collect(),
            body: format!("Body of {name}."),
            path: PathBuf::from(format!("/skills/{name}")),
            location: SkillLocation::Project,
        }
    }

    fn guidance_catalog() -> Catalog {
        Catalog::from_skills(vec![
            make_skill(
                "python",
                "Use when writing Python modules, functions, classes, or scripts.",
                &["pytest", "py"],
            ),
            make_skill(
                "api-design",
                "Use when designing REST or HTTP APIs: endpoints, resources, status codes.",
                &["rest", "http"],
            ),
            make_skill(
                "typescript",
                "Use when writing TypeScript or React components and types.",
                &["tsx", "react"],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn python_intent_matches_python_only() {
        let selection = select_skills("write a Python function", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["python"]);
        assert_eq!(selection.strategy, SelectionStrategy::Match);
        assert!(selection.skills[0].reason.contains("python"));
    }

    #[test]
    fn rest_intent_matches_api_design_only() {
        let selection = select_skills("design REST endpoints", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["api-design"]);
    }

    #[test]
    fn unrelated_intent_returns_empty_selection() {
        let selection = select_skills("bake a sourdough loaf", &guidance_catalog(), 0);
        assert!(selection.is_empty());
        assert_eq!(selection.strategy, SelectionStrategy::None);
        assert!(selection.errors.is_empty());
    }

    #[test]
    fn stopword_only_intent_returns_empty_selection() {
        let selection = select_skills("please write some code", &guidance_catalog(), 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_catalog_returns_empty_selection() {
        let selection = select_skills("write a Python function", &Catalog::default(), 0);
        assert!(selection.is_empty());
        assert_eq!(selection.strategy, SelectionStrategy::None);
    }

    #[test]
    fn selects_hinted_skills() {
        let selection = select_skills("tidy this up @typescript", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["typescript"]);
        assert_eq!(selection.skills[0].reason, "hint: @typescript");
        assert_eq!(selection.strategy, SelectionStrategy::Hint);
    }

    #[test]
    fn records_error_for_unknown_hint() {
        let selection = select_skills("do it @nonexistent", &guidance_catalog(), 0);
        assert!(selection.is_empty());
        assert_eq!(selection.errors, vec!["hinted skill not found: @nonexistent"]);
    }

    #[test]
    fn hints_and_keywords_combine_without_duplicates() {
        let selection = select_skills(
            "@python expose python functions as REST endpoints",
            &guidance_catalog(),
            0,
        );
        assert_eq!(selection.names(), vec!["python", "api-design"]);
        assert_eq!(selection.strategy, SelectionStrategy::Hint);
    }

    #[test]
    fn respects_max_skills_limit() {
        let selection = select_skills(
            "python REST endpoints in a react tsx app",
            &guidance_catalog(),
            1,
        );
        assert_eq!(selection.skills.len(), 1);

        let unlimited = select_skills(
            "python REST endpoints in a react tsx app",
            &guidance_catalog(),
            0,
        );
        assert_eq!(unlimited.skills.len(), 3);
    }

    #[test]
    fn orders_by_score_then_name() {
        // api-design: rest + http are strong hits; python only a weak "module".
        let selection = select_skills("a REST http module", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["api-design", "python"]);
        assert!(selection.skills[0].score > selection.skills[1].score);
    }

    #[test]
    fn triggers_count_as_strong_matches() {
        let selection = select_skills("fix the pytest fixtures", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["python"]);
        assert_eq!(selection.skills[0].score, 3);
    }

    #[test]
    fn two_letter_triggers_match() {
        let selection = select_skills("tidy up this py", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["python"]);
        assert_eq!(selection.skills[0].reason, "keyword: py");

        let selection = select_skills("is it in tsx", &guidance_catalog(), 0);
        assert_eq!(selection.names(), vec!["typescript"]);
    }

    #[test]
    fn short_words_never_match_descriptions() {
        let catalog = Catalog::from_skills(vec![make_skill(
            "shell",
            "Use for sh scripts run by CI.",
            &[],
        )])
        .unwrap();
        assert!(select_skills("fix the ci job", &catalog, 0).is_empty());
        assert_eq!(select_skills("fix the shell job", &catalog, 0).names(), vec!["shell"]);
    }

    #[test]
    fn descriptors_resolve_against_catalog() {
        let catalog = guidance_catalog();
        let selection = select_skills("write a Python function", &catalog, 0);
        let descriptors = selection.descriptors(&catalog);
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].body, "Body of python.");
    }

    #[test]
    fn parse_hints_extracts_names() {
        assert_eq!(
            parse_hints("use @python, then @api-design. @python again"),
            vec!["python", "api-design"]
        );
        assert!(parse_hints("email me at a@b.com or @ alone").is_empty());
    }

    #[test]
    fn extract_keywords_filters_and_folds() {
        let keywords = extract_keywords("Write the PDF endpoints to a class", MIN_KEYWORD_LEN);
        assert!(keywords.contains("pdf"));
        assert!(keywords.contains("endpoint"));
        assert!(keywords.contains("class"));
        assert!(!keywords.contains("write"));
        assert!(!keywords.contains("the"));
        assert!(!keywords.contains("to"));
    }

    #[test]
    fn selection_serializes_strategy() {
        let selection = select_skills("nothing relevant here", &Catalog::default(), 0);
        let json = serde_json::to_string(&selection).unwrap();
        assert!(json.contains("\"strategy\":\"none\""));
        assert!(!json.contains("errors"));
    }
}
