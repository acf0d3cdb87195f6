use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identity of a rule: its file relative to the rules directory plus its `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleKey {
    pub rule_path: String,
    pub id: String,
}

impl RuleKey {
    pub fn new(rule_path: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            rule_path: rule_path.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path='{}', id='{}'", self.rule_path, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub key: RuleKey,
    pub disabled: bool,
    pub lib: bool,
}

impl RuleDefinition {
    pub fn is_active(&self) -> bool {
        !self.disabled && !self.lib
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    pub rules: Vec<RuleDefinition>,
    pub problems: Vec<Problem>,
    pub warnings: Vec<Warning>,
    pub files_scanned: usize,
}

impl RuleCatalog {
    /// Active keys in first-seen order, each once.
    pub fn active_keys(&self) -> Vec<&RuleKey> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .filter(|rule| rule.is_active())
            .map(|rule| &rule.key)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// Every defined key, active or not.
    pub fn defined_keys(&self) -> HashSet<&RuleKey> {
        self.rules.iter().map(|rule| &rule.key).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Positive,
    Negative,
}

impl SampleKind {
    pub fn annotation(&self) -> &'static str {
        match self {
            SampleKind::Positive => "PositiveRuleSample",
            SampleKind::Negative => "NegativeRuleSample",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleAnnotation {
    pub kind: SampleKind,
    pub key: RuleKey,
    /// Relative to the tests directory.
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SampleIndex {
    pub annotations: Vec<SampleAnnotation>,
    pub problems: Vec<Problem>,
    pub files_scanned: usize,
}

impl SampleIndex {
    pub fn covered(&self) -> HashSet<&RuleKey> {
        self.annotations
            .iter()
            .filter(|a| a.kind == SampleKind::Positive)
            .map(|a| &a.key)
            .collect()
    }
}

/// Anything that fails the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    RulesDirMissing { path: String },
    TestsDirMissing { path: String },
    RootNotMap { rule_path: String },
    MissingRulesList { rule_path: String },
    RuleEntryNotMap { rule_path: String },
    BlankRuleId { rule_path: String },
    YamlParse { rule_path: String, message: String },
    UnreadableSample { file: String, message: String },
    Uncovered(RuleKey),
    Strict(Warning),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::RulesDirMissing { path } => write!(f, "Rules directory not found: {}", path),
            Problem::TestsDirMissing { path } => write!(f, "Tests directory not found: {}", path),
            Problem::RootNotMap { rule_path } => {
                write!(f, "INVALID YAML (root not a map): {}", rule_path)
            }
            Problem::MissingRulesList { rule_path } => {
                write!(f, "INVALID YAML (missing 'rules' list): {}", rule_path)
            }
            Problem::RuleEntryNotMap { rule_path } => {
                write!(f, "INVALID RULE ENTRY (not a map) in {}", rule_path)
            }
            Problem::BlankRuleId { rule_path } => {
                write!(f, "INVALID RULE ENTRY (missing/blank id) in {}", rule_path)
            }
            Problem::YamlParse { rule_path, message } => {
                write!(f, "INVALID YAML (parse error): {} - {}", rule_path, message)
            }
            Problem::UnreadableSample { file, message } => {
                write!(f, "UNREADABLE SAMPLE FILE: {} - {}", file, message)
            }
            Problem::Uncovered(key) => write!(f, "UNCOVERED RULE: {}", key),
            Problem::Strict(warning) => write!(f, "STRICT: {}", warning),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    DuplicateRule(RuleKey),
    UnknownRuleReference {
        kind: SampleKind,
        key: RuleKey,
        file: String,
        line: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateRule(key) => write!(f, "DUPLICATE RULE ID: {}", key),
            Warning::UnknownRuleReference {
                kind,
                key,
                file,
                line,
            } => write!(
                f,
                "UNKNOWN RULE REFERENCE: {}:{} @{}(value='{}', id='{}')",
                file,
                line,
                kind.annotation(),
                key.rule_path,
                key.id
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub generated_at: DateTime<Utc>,
    pub rule_files: usize,
    pub sample_files: usize,
    pub active_rules: usize,
    pub covered_rules: usize,
    pub problems: Vec<Problem>,
    pub warnings: Vec<Warning>,
}

impl CoverageReport {
    /// Report for a run that stopped before scanning.
    pub fn aborted(problems: Vec<Problem>) -> Self {
        Self {
            generated_at: Utc::now(),
            rule_files: 0,
            sample_files: 0,
            active_rules: 0,
            covered_rules: 0,
            problems,
            warnings: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn uncovered(&self) -> impl Iterator<Item = &RuleKey> {
        self.problems.iter().filter_map(|p| match p {
            Problem::Uncovered(key) => Some(key),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(path: &str, id: &str, disabled: bool, lib: bool) -> RuleDefinition {
        RuleDefinition {
            key: RuleKey::new(path, id),
            disabled,
            lib,
        }
    }

    #[test]
    fn test_active_keys_skip_inactive_and_duplicates() {
        let catalog = RuleCatalog {
            rules: vec![
                rule("java/security/sqli.yaml", "b", false, false),
                rule("java/security/sqli.yaml", "a", true, false),
                rule("java/lib/sources.yaml", "src", false, true),
                rule("java/security/sqli.yaml", "b", false, false),
                rule("java/security/xss.yaml", "c", false, false),
            ],
            ..Default::default()
        };

        let keys: Vec<String> = catalog.active_keys().iter().map(|k| k.id.clone()).collect();
        assert_eq!(keys, vec!["b", "c"]);

        let defined = catalog.defined_keys();
        assert_eq!(defined.len(), 4);
        assert!(defined.contains(&RuleKey::new("java/security/sqli.yaml", "a")));
        assert!(!defined.contains(&RuleKey::new("java/security/xss.yaml", "a")));
    }

    #[test]
    fn test_problem_messages() {
        let key = RuleKey::new("java/security/xss.yaml", "xss-in-servlet-app");
        assert_eq!(
            Problem::Uncovered(key.clone()).to_string(),
            "UNCOVERED RULE: path='java/security/xss.yaml', id='xss-in-servlet-app'"
        );
        assert_eq!(
            Problem::YamlParse {
                rule_path: "bad.yaml".to_string(),
                message: "oops".to_string()
            }
            .to_string(),
            "INVALID YAML (parse error): bad.yaml - oops"
        );
        assert_eq!(
            Problem::Strict(Warning::DuplicateRule(key)).to_string(),
            "STRICT: DUPLICATE RULE ID: path='java/security/xss.yaml', id='xss-in-servlet-app'"
        );
    }

    #[test]
    fn test_unknown_reference_message() {
        let warning = Warning::UnknownRuleReference {
            kind: SampleKind::Negative,
            key: RuleKey::new("java/security/gone.yaml", "gone"),
            file: "sqli/Samples.java".to_string(),
            line: 12,
        };
        assert_eq!(
            warning.to_string(),
            "UNKNOWN RULE REFERENCE: sqli/Samples.java:12 @NegativeRuleSample(value='java/security/gone.yaml', id='gone')"
        );
    }
}
